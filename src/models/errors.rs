//! Centralized Error Handling Module
//!
//! Every failure carries a unique code so degraded fetches and rejected
//! investigations can be told apart in the logs.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - FETCH_xxx: chain data source errors
//! - REPUTATION_xxx: reputation source errors
//! - CFG_xxx: configuration errors
//! - API_xxx: API errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Chain Data Fetch Errors
    // ============================================
    /// Could not reach the data source
    FetchConnectionFailed,
    /// Request exceeded its time budget
    FetchTimeout,
    /// Data source rate limited us (HTTP 429)
    FetchRateLimited,
    /// Non-success HTTP status
    FetchHttpError,
    /// Response body could not be decoded
    FetchInvalidResponse,

    // ============================================
    // Reputation Errors
    // ============================================
    /// A reputation source could not be queried
    ReputationUnavailable,

    // ============================================
    // Investigation Errors
    // ============================================
    /// Target is not a 0x-prefixed 20-byte address
    InvalidAddress,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Missing API key
    ConfigMissingApiKey,
    /// Invalid configuration value
    ConfigInvalidValue,
    /// Classification tables file missing or malformed
    ConfigTablesUnreadable,

    // ============================================
    // Notification Errors
    // ============================================
    /// Alert delivery failed
    NotifyFailed,

    // ============================================
    // API Errors
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Internal server error
    ApiInternalError,

    // ============================================
    // Generic Errors
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchConnectionFailed => "FETCH_CONNECTION_FAILED",
            Self::FetchTimeout => "FETCH_TIMEOUT",
            Self::FetchRateLimited => "FETCH_RATE_LIMITED",
            Self::FetchHttpError => "FETCH_HTTP_ERROR",
            Self::FetchInvalidResponse => "FETCH_INVALID_RESPONSE",

            Self::ReputationUnavailable => "REPUTATION_UNAVAILABLE",

            Self::InvalidAddress => "INVALID_ADDRESS",

            Self::ConfigMissingApiKey => "CFG_MISSING_API_KEY",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::ConfigTablesUnreadable => "CFG_TABLES_UNREADABLE",

            Self::NotifyFailed => "NOTIFY_FAILED",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiBadRequest | Self::InvalidAddress | Self::ConfigInvalidValue => 400,
            Self::ConfigMissingApiKey => 401,
            Self::ApiRateLimited | Self::FetchRateLimited => 429,
            Self::FetchTimeout => 504,
            _ => 500,
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::FetchTimeout
                | Self::FetchRateLimited
                | Self::FetchConnectionFailed
                | Self::FetchHttpError
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::FetchConnectionFailed, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::FetchTimeout, msg)
    }

    pub fn rate_limited() -> Self {
        Self::new(ErrorCode::FetchRateLimited, "Rate limited (HTTP 429)")
    }

    pub fn http_error(status: u16) -> Self {
        Self::new(ErrorCode::FetchHttpError, format!("HTTP error: {}", status))
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::FetchInvalidResponse, msg)
    }

    pub fn reputation_unavailable(source: &str, msg: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ReputationUnavailable,
            format!("{}: {}", source, msg.into()),
        )
    }

    /// Invalid wallet address
    pub fn invalid_address(address: &str) -> Self {
        Self::new(
            ErrorCode::InvalidAddress,
            format!("Invalid wallet address: '{}'", address),
        )
    }

    /// Missing API key
    pub fn missing_api_key(key_name: &str) -> Self {
        Self::new(
            ErrorCode::ConfigMissingApiKey,
            format!("Missing API key: {}", key_name),
        )
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }

    pub fn notify_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotifyFailed, msg)
    }

    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// API internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::FetchTimeout, "Request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::FetchConnectionFailed, "Connection failed")
        } else if err.is_decode() {
            Self::with_source(ErrorCode::FetchInvalidResponse, "Failed to decode response", err)
        } else if let Some(status) = err.status() {
            Self::http_error(status.as_u16())
        } else {
            Self::new(ErrorCode::Unknown, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::FetchInvalidResponse, "JSON parse error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::timeout("etherscan txlist timed out");
        assert_eq!(err.code, ErrorCode::FetchTimeout);
        assert_eq!(err.code_str(), "FETCH_TIMEOUT");
        assert_eq!(err.to_string(), "[FETCH_TIMEOUT] etherscan txlist timed out");
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::FetchTimeout.is_retryable());
        assert!(ErrorCode::FetchRateLimited.is_retryable());
        assert!(AppError::http_error(502).is_retryable());
        assert!(!ErrorCode::InvalidAddress.is_retryable());
        assert!(!ErrorCode::FetchInvalidResponse.is_retryable());
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::InvalidAddress.http_status(), 400);
        assert_eq!(ErrorCode::ApiRateLimited.http_status(), 429);
        assert_eq!(ErrorCode::ApiInternalError.http_status(), 500);
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_err = serde_json::from_str::<u64>("not json").unwrap_err();
        let err: AppError = parse_err.into();
        assert_eq!(err.code, ErrorCode::FetchInvalidResponse);
        assert!(std::error::Error::source(&err).is_some());
    }
}
