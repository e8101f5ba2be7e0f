//! Etherscan client against a local mock server

use chain_sherlock::core::{Investigator, ReputationAggregator};
use chain_sherlock::models::{ClassificationTables, InvestigatorConfig};
use chain_sherlock::providers::{ChainDataSource, EtherscanClient};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WALLET: &str = "0x742d35cc6634c0532925a3b844bc454e4438f44e";

fn client(server: &MockServer, max_retries: u32) -> EtherscanClient {
    let config = InvestigatorConfig {
        etherscan_api_key: "test-key".to_string(),
        etherscan_api_url: server.uri(),
        max_retries,
        fetch_timeout: Duration::from_secs(5),
        ..Default::default()
    };
    EtherscanClient::new(&config)
        .unwrap()
        .with_retry_base(Duration::from_millis(1))
}

#[tokio::test]
async fn test_txlist_maps_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("module", "account"))
        .and(query_param("action", "txlist"))
        .and(query_param("address", WALLET))
        .and(query_param("chainid", "1"))
        .and(query_param("sort", "asc"))
        .and(query_param("apikey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "message": "OK",
            "result": [
                {
                    "hash": "0xaa",
                    "from": "0x8ba1f109551bd432803012645ac136ddd64dba72",
                    "to": WALLET,
                    "value": "1500000000000000000",
                    "timeStamp": "1700000000",
                    "input": "0x",
                    "isError": "0",
                    "contractAddress": ""
                },
                {
                    "hash": "0xbb",
                    "from": WALLET,
                    "to": "",
                    "value": "0",
                    "timeStamp": "1700000100",
                    "input": "0x60806040",
                    "isError": "1",
                    "contractAddress": "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984"
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let txs = client(&server, 0).list_transactions(WALLET).await.unwrap();

    assert_eq!(txs.len(), 2);
    assert_eq!(txs[0].value_eth(), 1.5);
    assert_eq!(txs[0].timestamp, 1_700_000_000);
    assert!(!txs[0].is_error);
    assert_eq!(txs[1].to, "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984");
    assert!(txs[1].is_error);
}

#[tokio::test]
async fn test_no_transactions_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "0",
            "message": "No transactions found",
            "result": []
        })))
        .mount(&server)
        .await;

    let client = client(&server, 0);
    assert!(client.list_transactions(WALLET).await.unwrap().is_empty());
    assert!(client.list_token_transfers(WALLET).await.unwrap().is_empty());
    assert_eq!(client.get_balance(WALLET).await.unwrap(), "0");
}

#[tokio::test]
async fn test_balance() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "balance"))
        .and(query_param("tag", "latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "message": "OK",
            "result": "40891626854930000000000"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let balance = client(&server, 0).get_balance(WALLET).await.unwrap();
    assert_eq!(balance, "40891626854930000000000");
}

#[tokio::test]
async fn test_tokentx_maps_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "tokentx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "message": "OK",
            "result": [{
                "hash": "0xcc",
                "from": WALLET,
                "to": "0x8ba1f109551bd432803012645ac136ddd64dba72",
                "value": "1000000",
                "tokenName": "Tether USD",
                "tokenSymbol": "USDT",
                "contractAddress": "0xdac17f958d2ee523a2206206994597c13d831ec7",
                "timeStamp": "not-a-number"
            }]
        })))
        .mount(&server)
        .await;

    let transfers = client(&server, 0).list_token_transfers(WALLET).await.unwrap();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].token_symbol, "USDT");
    assert_eq!(transfers[0].timestamp, 0);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "message": "OK",
            "result": "7"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let balance = client(&server, 2).get_balance(WALLET).await.unwrap();
    assert_eq!(balance, "7");
}

#[tokio::test]
async fn test_retries_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&server)
        .await;

    let err = client(&server, 1).list_transactions(WALLET).await.unwrap_err();
    assert_eq!(err.code_str(), "FETCH_HTTP_ERROR");
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, 3).list_transactions(WALLET).await.unwrap_err();
    assert_eq!(err.code_str(), "FETCH_INVALID_RESPONSE");
}

#[tokio::test]
async fn test_slow_failure_then_retry_reaches_the_case() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "txlist"))
        .respond_with(ResponseTemplate::new(503).set_delay(Duration::from_millis(700)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("action", "txlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "message": "OK",
            "result": [{
                "hash": "0xaa",
                "from": "0x8ba1f109551bd432803012645ac136ddd64dba72",
                "to": WALLET,
                "value": "1000000000000000000",
                "timeStamp": "1700000000",
                "input": "0x",
                "isError": "0",
                "contractAddress": ""
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "0",
            "message": "No transactions found",
            "result": []
        })))
        .mount(&server)
        .await;

    // Real backoff: 700ms + ~500ms runs past a single 1s attempt timeout
    let config = InvestigatorConfig {
        etherscan_api_key: "test-key".to_string(),
        etherscan_api_url: server.uri(),
        max_retries: 2,
        fetch_timeout: Duration::from_secs(1),
        ..Default::default()
    };
    let source = EtherscanClient::new(&config).unwrap();
    let investigator = Investigator::new(
        Arc::new(source),
        ReputationAggregator::new(Vec::new(), Duration::from_millis(50)),
        Arc::new(ClassificationTables::default()),
        "Ethereum",
        config.fetch_timeout,
    )
    .without_notifier();

    let case = investigator.investigate(WALLET).await.unwrap();
    assert_eq!(case.evidence.tx_count, 1);
}
