//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::time::Duration;

use coursework_core::auth::{AuthFlow, MemoryStorage, SessionStore, TOKEN_KEY, TokenStorage};
use coursework_core::{ApiClient, LoginFeatures};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Auth flow against a mock server, with handles on both stores.
pub struct Harness {
    pub flow: AuthFlow,
    pub persistent: MemoryStorage,
    pub ephemeral: MemoryStorage,
}

impl Harness {
    pub fn persistent_token(&self) -> Option<String> {
        self.persistent.get(TOKEN_KEY).unwrap()
    }

    pub fn ephemeral_token(&self) -> Option<String> {
        self.ephemeral.get(TOKEN_KEY).unwrap()
    }
}

pub fn client(server: &MockServer) -> ApiClient {
    client_at(&server.uri(), Duration::from_secs(2))
}

pub fn client_at(base_url: &str, timeout: Duration) -> ApiClient {
    ApiClient::with_endpoints(base_url, &format!("{}/objects/quiz.php", base_url), timeout)
        .unwrap()
}

pub fn harness(server: &MockServer) -> Harness {
    harness_with(server, LoginFeatures::default())
}

pub fn harness_with(server: &MockServer, features: LoginFeatures) -> Harness {
    harness_for(client(server), features)
}

pub fn harness_for(client: ApiClient, features: LoginFeatures) -> Harness {
    let persistent = MemoryStorage::new();
    let ephemeral = MemoryStorage::new();
    let session = SessionStore::new(Box::new(persistent.clone()), Box::new(ephemeral.clone()));
    Harness {
        flow: AuthFlow::new(client, session, features),
        persistent,
        ephemeral,
    }
}

pub fn profile_json() -> Value {
    json!({
        "name": "Ada",
        "email": "a@b.com",
        "bio": "Likes engines",
        "profile_picture": "https://example.com/ada.png"
    })
}

pub async fn mount_login(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_profile(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json()))
        .mount(server)
        .await;
}
