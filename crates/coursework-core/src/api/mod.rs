//! REST API client module for the auth service.
//!
//! This module provides the `ApiClient` for logging in, reading and updating
//! the user profile, and logging out. Authenticated requests carry the bearer
//! token obtained from `POST /api/login`.

pub mod client;
pub mod error;
pub mod token;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use token::TokenFieldStrategy;
