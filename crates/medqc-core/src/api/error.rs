use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP 401. The pipeline has already cleared the session and redirected
    /// to login by the time a caller sees this.
    #[error("Unauthorized - session expired")]
    AuthExpired,

    #[error("HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid request: {0}")]
    RequestConfig(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Classify a non-success status
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            ApiError::AuthExpired
        } else {
            ApiError::Http {
                status,
                body: Self::truncate_body(body),
            }
        }
    }

    /// Classify a transport failure by cause
    pub fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(timeout)
        } else if err.is_builder() {
            ApiError::RequestConfig(err.to_string())
        } else {
            ApiError::Network(err)
        }
    }

    /// Status code for HTTP-level failures
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::AuthExpired => Some(StatusCode::UNAUTHORIZED),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when no response was received. Timeouts count as network failures.
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Timeout(_))
    }

    /// Backend error detail, when the body is FastAPI's `{"detail": "..."}`
    pub fn detail(&self) -> Option<String> {
        let ApiError::Http { body, .. } = self else {
            return None;
        };
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        value.get("detail")?.as_str().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classifies_401() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, "nope"),
            ApiError::AuthExpired
        ));
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!err.is_network());
    }

    #[test]
    fn test_truncate_long_body() {
        let body = "x".repeat(MAX_ERROR_BODY_LENGTH + 10);
        let ApiError::Http { body, .. } = ApiError::from_status(StatusCode::BAD_REQUEST, &body)
        else {
            panic!("expected Http");
        };
        assert!(body.contains("truncated"));
        assert!(body.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        // 3-byte characters; 500 is not a multiple of 3
        let body = "出".repeat(200);
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, &body);
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_detail_extraction() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"detail":"用户名或密码错误"}"#);
        assert_eq!(err.detail().as_deref(), Some("用户名或密码错误"));

        let plain = ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>");
        assert_eq!(plain.detail(), None);
    }

    #[test]
    fn test_timeout_is_network_class() {
        assert!(ApiError::Timeout(Duration::from_secs(30)).is_network());
        assert!(!ApiError::RequestConfig("bad".into()).is_network());
    }
}
