//! Core library for coursework: the auth client and session store behind the
//! account view, and the state machines for each exercise.

pub mod api;
pub mod auth;
pub mod config;
pub mod exercises;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, ApiResult};
pub use auth::{AuthFlow, Credentials, SessionStore, StorageKind};
pub use config::{Config, LoginFeatures};
