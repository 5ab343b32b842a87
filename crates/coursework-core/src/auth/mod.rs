//! Authentication module for managing the bearer token session.
//!
//! This module provides:
//! - `SessionStore`: token storage across a persistent and an ephemeral store
//! - `TokenStorage`: the key-value backends (`MemoryStorage`, `FileStorage`, `KeyringStorage`)
//! - `AuthFlow`: login, profile, and logout built on the API client and session store
//! - `Credentials`: validated login form input
//!
//! The persistent store is only written when the user asks to stay logged in.

pub mod credentials;
pub mod flow;
pub mod session;
pub mod storage;

pub use credentials::Credentials;
pub use flow::{session_store_for, AuthFlow, LoginOutcome, RestoreOutcome};
pub use session::{ActiveToken, SessionStore, StorageKind, TOKEN_KEY};
pub use storage::{FileStorage, KeyringStorage, MemoryStorage, TokenStorage};
