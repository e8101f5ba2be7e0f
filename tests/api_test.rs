//! REST surface through the axum router, no network

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chain_sherlock::api::{create_router, AppState};
use chain_sherlock::core::{Investigator, ReputationAggregator};
use chain_sherlock::models::{AppResult, ClassificationTables, TokenTransfer, Transaction};
use chain_sherlock::providers::ChainDataSource;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct QuietChain;

#[async_trait]
impl ChainDataSource for QuietChain {
    fn name(&self) -> &str {
        "quiet"
    }

    async fn list_transactions(&self, _address: &str) -> AppResult<Vec<Transaction>> {
        Ok(Vec::new())
    }

    async fn list_token_transfers(&self, _address: &str) -> AppResult<Vec<TokenTransfer>> {
        Ok(Vec::new())
    }

    async fn get_balance(&self, _address: &str) -> AppResult<String> {
        Ok("0".to_string())
    }
}

fn router() -> axum::Router {
    let investigator = Investigator::new(
        Arc::new(QuietChain),
        ReputationAggregator::new(Vec::new(), Duration::from_secs(1)),
        Arc::new(ClassificationTables::default()),
        "Ethereum",
        Duration::from_secs(1),
    );
    create_router(Arc::new(AppState::new(Arc::new(investigator))))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn investigate_request(address: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/investigate")
        .header("content-type", "application/json")
        .header("x-api-key", "api-test")
        .body(Body::from(json!({ "wallet_address": address }).to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    for uri in ["/health", "/v1/health"] {
        let response = router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "healthy");
        assert_eq!(body["data"]["chain"], "Ethereum");
    }
}

#[tokio::test]
async fn test_investigate_returns_court_case() {
    let response = router()
        .oneshot(investigate_request(
            "0x742d35Cc6634C0532925a3b844Bc454e4438f44e",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-ratelimit-remaining"));

    let body = body_json(response).await;
    let case = &body["data"];
    assert_eq!(case["wallet"], "0x742d35cc6634c0532925a3b844bc454e4438f44e");
    assert_eq!(case["verdict"]["verdict"], "Likely Clean");
    assert!(case["caseId"].is_string());
    assert!(case["prosecution"]["narrative"]
        .as_str()
        .unwrap()
        .starts_with("THE PROSECUTION'S CASE"));
}

#[tokio::test]
async fn test_invalid_address_is_bad_request() {
    let response = router().oneshot(investigate_request("0xnothex")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INVALID_ADDRESS");
}

#[tokio::test]
async fn test_malformed_body_gets_json_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/investigate")
        .header("content-type", "application/json")
        .header("x-api-key", "api-test")
        .body(Body::from("{\"wallet_address\": "))
        .unwrap();
    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "API_BAD_REQUEST");
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_stats_reflect_investigations() {
    let app = router();
    app.clone()
        .oneshot(investigate_request(
            "0x8ba1f109551bd432803012645ac136ddd64dba72",
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/stats")
                .header("x-api-key", "api-test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["total_investigations"], 1);
    assert_eq!(body["data"]["likely_clean"], 1);
    assert_eq!(body["data"]["fraud_rate"], 0.0);
}
