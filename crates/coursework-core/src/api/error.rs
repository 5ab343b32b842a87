use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Login failed: {0}")]
    InvalidCredentials(String),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("No authentication token found")]
    NotLoggedIn,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::UnexpectedResponse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
            format!("{}... (truncated, {} total bytes)", cut, body.len())
        }
    }

    /// Pull a human readable `message` or `error` field out of a JSON error body.
    pub fn server_message(body: &str) -> Option<String> {
        let value: Value = serde_json::from_str(body).ok()?;
        ["message", "error"]
            .iter()
            .filter_map(|field| value.get(*field))
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Map a failed response from an authenticated endpoint.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = Self::server_message(body).unwrap_or_else(|| Self::truncate_body(body));
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            500..=599 => ApiError::ServerError(detail),
            _ => ApiError::UnexpectedResponse(format!("Status {}: {}", status, detail)),
        }
    }

    /// Map a failed response from the login endpoint, where any client error
    /// means the credentials were rejected.
    pub fn from_login_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::InvalidCredentials("Invalid email or password.".to_string()),
            422 => ApiError::InvalidCredentials("Invalid input format.".to_string()),
            400..=499 => ApiError::InvalidCredentials(
                Self::server_message(body)
                    .unwrap_or_else(|| "Please check your credentials.".to_string()),
            ),
            _ => Self::from_status(status, body),
        }
    }

    /// Authentication failures end the session; callers clear stored tokens.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::NotLoggedIn)
    }

    /// Whether repeating the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Network(_)
                | ApiError::Timeout
                | ApiError::ServerError(_)
                | ApiError::UnexpectedResponse(_)
        )
    }

    /// Text shown to the user in the status line or form.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::InvalidCredentials(msg) => format!("Login failed. {}", msg),
            ApiError::Unauthorized => "Session expired. Please login again.".to_string(),
            ApiError::NotLoggedIn => {
                "No authentication token found. Please login again.".to_string()
            }
            ApiError::Network(_) => "Network error. Please try again.".to_string(),
            ApiError::Timeout => "Request timeout. Please try again.".to_string(),
            ApiError::ServerError(_) => "Server error. Please try again later.".to_string(),
            ApiError::UnexpectedResponse(_) => {
                "Unexpected response from server. Please try again.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_login_status_mapping() {
        assert!(matches!(
            ApiError::from_login_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::InvalidCredentials(ref m) if m == "Invalid email or password."
        ));
        assert!(matches!(
            ApiError::from_login_status(StatusCode::BAD_REQUEST, r#"{"message":"Email not verified"}"#),
            ApiError::InvalidCredentials(ref m) if m == "Email not verified"
        ));
        assert!(matches!(
            ApiError::from_login_status(StatusCode::UNPROCESSABLE_ENTITY, ""),
            ApiError::InvalidCredentials(_)
        ));
        assert!(matches!(
            ApiError::from_login_status(StatusCode::BAD_GATEWAY, ""),
            ApiError::ServerError(_)
        ));
    }

    #[test]
    fn test_from_status() {
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, "").is_auth_failure());
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "nope"),
            ApiError::UnexpectedResponse(_)
        ));
        assert!(ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "").is_retryable());
    }

    #[test]
    fn test_server_message_prefers_message_over_error() {
        assert_eq!(
            ApiError::server_message(r#"{"error":"bad","message":"worse"}"#).as_deref(),
            Some("worse")
        );
        assert_eq!(ApiError::server_message(r#"{"error":"bad"}"#).as_deref(), Some("bad"));
        assert_eq!(ApiError::server_message("not json"), None);
        assert_eq!(ApiError::server_message(r#"{"message":"  "}"#), None);
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(600);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(500)));
        assert!(truncated.ends_with("(truncated, 600 total bytes)"));
        assert_eq!(ApiError::truncate_body("short"), "short");
    }

    #[test]
    fn test_unauthorized_is_not_retryable() {
        assert!(!ApiError::Unauthorized.is_retryable());
        assert!(!ApiError::Validation("x".into()).is_retryable());
        assert!(ApiError::Timeout.is_retryable());
    }
}
