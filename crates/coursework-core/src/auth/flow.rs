//! The login/profile/logout lifecycle shared by every account view.

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::config::{Config, LoginFeatures, PersistentBackend, APP_NAME};
use crate::models::{ProfileUpdate, UserProfile};

use super::credentials::Credentials;
use super::session::{ActiveToken, SessionStore, StorageKind};
use super::storage::{FileStorage, KeyringStorage, MemoryStorage, TokenStorage};

/// Result of trying to pick up a session left by an earlier run.
#[derive(Debug)]
pub enum RestoreOutcome {
    /// No token in either store
    NoSession,
    /// Token accepted by the service
    Restored {
        profile: UserProfile,
        token: ActiveToken,
    },
    /// Token rejected; both stores have been cleared
    Expired,
    /// Token kept, but the profile could not be loaded
    Failed(ApiError),
}

/// A successful login.
#[derive(Debug)]
pub struct LoginOutcome {
    pub profile: UserProfile,
    pub storage: StorageKind,
}

pub struct AuthFlow {
    api: ApiClient,
    session: SessionStore,
    features: LoginFeatures,
}

impl AuthFlow {
    pub fn new(api: ApiClient, session: SessionStore, features: LoginFeatures) -> Self {
        Self {
            api,
            session,
            features,
        }
    }

    /// Wire up the client and stores described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = ApiClient::from_config(config)?;
        let session = session_store_for(config)?;
        Ok(Self::new(api, session, config.features))
    }

    pub fn features(&self) -> LoginFeatures {
        self.features
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Load the profile for a stored token, if there is one
    pub async fn restore(&self) -> RestoreOutcome {
        let Some(active) = self.session.read() else {
            debug!("No stored token");
            return RestoreOutcome::NoSession;
        };

        match self.api.fetch_profile(&active.token).await {
            Ok(profile) => {
                info!(storage = %active.kind, "Session restored");
                RestoreOutcome::Restored {
                    profile,
                    token: active,
                }
            }
            Err(e) if e.is_auth_failure() => {
                info!("Stored token rejected, clearing session");
                self.clear_session();
                RestoreOutcome::Expired
            }
            Err(e) => {
                warn!(error = %e, "Failed to restore session");
                RestoreOutcome::Failed(e)
            }
        }
    }

    /// Log in, store the token, and load the profile.
    ///
    /// `keep_logged_in` is ignored when the remember-me feature is off.
    pub async fn login(
        &self,
        credentials: &Credentials,
        keep_logged_in: bool,
    ) -> ApiResult<LoginOutcome> {
        credentials.validate()?;

        let token = self.api.login(credentials.email(), credentials.password()).await?;
        let persistent = keep_logged_in && self.features.remember_me;
        let storage = self.save_token(&token, persistent);

        match self.api.fetch_profile(&token).await {
            Ok(profile) => {
                info!(storage = %storage, "Login successful");
                Ok(LoginOutcome { profile, storage })
            }
            Err(e) => {
                if e.is_auth_failure() {
                    self.clear_session();
                }
                Err(e)
            }
        }
    }

    /// Save the token, falling back to the ephemeral store when the
    /// persistent one fails
    fn save_token(&self, token: &str, persistent: bool) -> StorageKind {
        match self.session.save(token, persistent) {
            Ok(kind) => kind,
            Err(e) if persistent => {
                warn!(error = %e, "Failed to save token persistently, using session storage");
                match self.session.save(token, false) {
                    Ok(kind) => kind,
                    Err(e) => {
                        warn!(error = %e, "Failed to save token");
                        StorageKind::Ephemeral
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to save token");
                StorageKind::Ephemeral
            }
        }
    }

    /// Re-read the profile for the active token
    pub async fn refresh_profile(&self) -> ApiResult<UserProfile> {
        let token = self.session.token().ok_or(ApiError::NotLoggedIn)?;
        let result = self.api.fetch_profile(&token).await;
        if matches!(result, Err(ref e) if e.is_auth_failure()) {
            self.clear_session();
        }
        result
    }

    /// Update name and bio. Failures other than an expired session leave the
    /// session intact so the user can retry.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<UserProfile> {
        if !self.features.profile_editing {
            return Err(ApiError::Validation(
                "Profile editing is disabled".to_string(),
            ));
        }
        update.validate().map_err(ApiError::Validation)?;
        let token = self.session.token().ok_or(ApiError::NotLoggedIn)?;

        match self.api.update_profile(&token, update).await {
            Ok(profile) => {
                info!("Profile updated");
                Ok(profile)
            }
            Err(e) => {
                if e.is_auth_failure() {
                    self.clear_session();
                } else {
                    warn!(error = %e, "Profile update failed");
                }
                Err(e)
            }
        }
    }

    /// Best-effort remote logout, then clear both stores regardless of the
    /// remote outcome
    pub async fn logout(&self) {
        if self.features.remote_logout {
            if let Some(token) = self.session.token() {
                if let Err(e) = self.api.logout(&token).await {
                    warn!(error = %e, "Logout request failed, clearing session anyway");
                }
            }
        }
        self.clear_session();
        info!("Logged out");
    }

    fn clear_session(&self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session");
        }
    }
}

/// Build the session store for the configured persistent backend. The
/// ephemeral side is always in memory.
pub fn session_store_for(config: &Config) -> Result<SessionStore> {
    let persistent: Box<dyn TokenStorage> = match config.persistent_backend {
        PersistentBackend::File => Box::new(FileStorage::new(&config.data_dir()?)),
        PersistentBackend::Keyring => Box::new(KeyringStorage::new(APP_NAME)),
    };
    Ok(SessionStore::new(persistent, Box::new(MemoryStorage::new())))
}
