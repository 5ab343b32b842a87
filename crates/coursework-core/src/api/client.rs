//! API client for the auth service and the quiz endpoint.
//!
//! This module provides the `ApiClient` struct for logging in, reading and
//! updating the user profile, logging out, and loading quiz questions.

use std::time::Duration;

use reqwest::{header, Client, Response};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::Credentials;
use crate::config::Config;
use crate::models::{ProfileUpdate, Question, UserProfile};

use super::token::TokenFieldStrategy;
use super::{ApiError, ApiResult};

// ============================================================================
// Constants
// ============================================================================

/// Base URL of the auth service.
pub const DEFAULT_API_BASE_URL: &str = "https://auth.dnjs.lk";

/// Quiz questions endpoint.
pub const DEFAULT_QUIZ_URL: &str = "https://apis.dnjs.lk/objects/quiz.php";

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// API client for the auth service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    quiz_url: String,
    token_fields: TokenFieldStrategy,
}

impl ApiClient {
    /// Create a client against explicit endpoints (used by tests and config)
    pub fn with_endpoints(base_url: &str, quiz_url: &str, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            quiz_url: quiz_url.to_string(),
            token_fields: TokenFieldStrategy::default(),
        })
    }

    /// Create a client from the loaded configuration
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        let client = Self::with_endpoints(
            &config.api_base_url(),
            &config.quiz_url(),
            config.request_timeout(),
        )?;
        Ok(client.with_token_fields(TokenFieldStrategy::from_config(
            config.token_fields.as_deref(),
        )))
    }

    /// Replace the strategy used to find the token in login responses
    pub fn with_token_fields(mut self, token_fields: TokenFieldStrategy) -> Self {
        self.token_fields = token_fields;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if response is successful, mapping the status to an error if not.
    async fn check_response(response: Response) -> ApiResult<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json(response: Response, what: &str) -> ApiResult<Value> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::UnexpectedResponse(format!("Failed to parse {}: {}", what, e)))
    }

    // ===== Authentication =====

    /// Exchange credentials for a bearer token.
    ///
    /// Empty fields are rejected before any request is sent.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<String> {
        let credentials = Credentials::new(email, password);
        credentials.validate()?;

        debug!(email = %credentials.email(), "Sending login request");

        let response = self
            .client
            .post(self.url("/api/login"))
            .header(header::ACCEPT, "application/json")
            .json(&credentials.to_body())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Login rejected");
            return Err(ApiError::from_login_status(status, &body));
        }

        let body = Self::parse_json(response, "login response").await?;
        match self.token_fields.resolve(&body) {
            Some(token) => Ok(token),
            None => {
                let keys: Vec<&str> = body
                    .as_object()
                    .map(|o| o.keys().map(String::as_str).collect())
                    .unwrap_or_default();
                warn!(?keys, "Login response missing token");
                Err(ApiError::UnexpectedResponse(
                    "Login response missing token".to_string(),
                ))
            }
        }
    }

    /// Fetch the profile of the user owning `token`
    pub async fn fetch_profile(&self, token: &str) -> ApiResult<UserProfile> {
        let response = self
            .client
            .get(self.url("/api/user"))
            .bearer_auth(token)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let body = Self::parse_json(response, "user response").await?;

        UserProfile::from_value(unwrap_envelope(body))
            .ok_or_else(|| ApiError::UnexpectedResponse("User response is not an object".into()))
    }

    /// Update the profile, then re-read it so the caller sees the stored values
    pub async fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> ApiResult<UserProfile> {
        update.validate().map_err(ApiError::Validation)?;

        let response = self
            .client
            .put(self.url("/api/profile"))
            .bearer_auth(token)
            .json(update)
            .send()
            .await?;

        Self::check_response(response).await?;
        debug!("Profile updated");

        self.fetch_profile(token).await
    }

    /// Tell the service the token is no longer in use. The body is ignored.
    pub async fn logout(&self, token: &str) -> ApiResult<()> {
        let response = self
            .client
            .post(self.url("/api/logout"))
            .bearer_auth(token)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Quiz =====

    /// Fetch the quiz questions. Unplayable entries are dropped.
    pub async fn fetch_questions(&self) -> ApiResult<Vec<Question>> {
        let response = self.client.get(&self.quiz_url).send().await?;
        let response = Self::check_response(response).await?;
        let body = Self::parse_json(response, "quiz response").await?;

        let questions: Vec<Question> = serde_json::from_value(body)
            .map_err(|e| ApiError::UnexpectedResponse(format!("Invalid quiz payload: {}", e)))?;

        let total = questions.len();
        let playable: Vec<Question> = questions.into_iter().filter(Question::is_playable).collect();
        if playable.len() != total {
            warn!(dropped = total - playable.len(), "Dropped unplayable quiz questions");
        }
        Ok(playable)
    }
}

/// Some deployments wrap the user in a lone `user` or `data` object.
fn unwrap_envelope(body: Value) -> Value {
    let is_envelope = body.as_object().is_some_and(|map| {
        map.len() == 1
            && ["user", "data"]
                .iter()
                .any(|key| map.get(*key).is_some_and(Value::is_object))
    });
    match body {
        Value::Object(map) if is_envelope => {
            map.into_iter().next().map(|(_, inner)| inner).unwrap_or_default()
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_envelope() {
        assert_eq!(
            unwrap_envelope(json!({"user": {"name": "Ada"}})),
            json!({"name": "Ada"})
        );
        assert_eq!(
            unwrap_envelope(json!({"data": {"name": "Ada"}})),
            json!({"name": "Ada"})
        );
        // Flat profiles and non-object envelopes are left alone
        assert_eq!(
            unwrap_envelope(json!({"name": "Ada", "id": 1})),
            json!({"name": "Ada", "id": 1})
        );
        assert_eq!(unwrap_envelope(json!({"user": "ada"})), json!({"user": "ada"}));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::with_endpoints(
            "http://localhost:9000/",
            DEFAULT_QUIZ_URL,
            Duration::from_secs(1),
        )
        .expect("client");
        assert_eq!(client.base_url(), "http://localhost:9000");
        assert_eq!(client.url("/api/login"), "http://localhost:9000/api/login");
    }

    #[tokio::test]
    async fn test_login_validation_happens_before_request() {
        // Port 9 (discard) would fail to connect; validation must short-circuit first.
        let client = ApiClient::with_endpoints(
            "http://127.0.0.1:9",
            DEFAULT_QUIZ_URL,
            Duration::from_millis(200),
        )
        .expect("client");
        let err = client.login("", "secret").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        let err = client.login("a@b.com", "").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
