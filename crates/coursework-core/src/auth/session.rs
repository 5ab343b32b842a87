use std::fmt;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::storage::TokenStorage;

/// Key the bearer token is stored under in both namespaces
pub const TOKEN_KEY: &str = "access_token";

/// Which namespace a token lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Survives restarts
    Persistent,
    /// Gone when the process exits
    Ephemeral,
}

impl StorageKind {
    pub fn from_keep_logged_in(keep_logged_in: bool) -> Self {
        if keep_logged_in {
            StorageKind::Persistent
        } else {
            StorageKind::Ephemeral
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StorageKind::Persistent => "persistent storage",
            StorageKind::Ephemeral => "session storage",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The token currently considered active and where it was found.
#[derive(Clone, PartialEq, Eq)]
pub struct ActiveToken {
    pub token: String,
    pub kind: StorageKind,
    pub stored_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for ActiveToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveToken")
            .field("token", &"***")
            .field("kind", &self.kind)
            .field("stored_at", &self.stored_at)
            .finish()
    }
}

/// Reads and writes the bearer token across a persistent and an ephemeral store.
///
/// Saving never touches the other store, so a stale token can linger there.
/// Reading prefers the persistent store. Clearing always hits both.
pub struct SessionStore {
    persistent: Box<dyn TokenStorage>,
    ephemeral: Box<dyn TokenStorage>,
}

impl SessionStore {
    pub fn new(persistent: Box<dyn TokenStorage>, ephemeral: Box<dyn TokenStorage>) -> Self {
        Self {
            persistent,
            ephemeral,
        }
    }

    fn store(&self, kind: StorageKind) -> &dyn TokenStorage {
        match kind {
            StorageKind::Persistent => self.persistent.as_ref(),
            StorageKind::Ephemeral => self.ephemeral.as_ref(),
        }
    }

    /// Write the token to the persistent store when `persistent`, otherwise
    /// to the ephemeral one
    pub fn save(&self, token: &str, persistent: bool) -> Result<StorageKind> {
        let kind = StorageKind::from_keep_logged_in(persistent);
        self.store(kind).set(TOKEN_KEY, token)?;
        debug!(storage = %kind, "Token saved");
        Ok(kind)
    }

    /// First non-empty token, persistent store first.
    ///
    /// A store that fails to read is treated as empty.
    pub fn read(&self) -> Option<ActiveToken> {
        [StorageKind::Persistent, StorageKind::Ephemeral]
            .into_iter()
            .find_map(|kind| {
                let store = self.store(kind);
                match store.get(TOKEN_KEY) {
                    Ok(Some(token)) if !token.trim().is_empty() => Some(ActiveToken {
                        token,
                        kind,
                        stored_at: store.stored_at(TOKEN_KEY),
                    }),
                    Ok(_) => None,
                    Err(e) => {
                        warn!(storage = %kind, error = %e, "Failed to read token");
                        None
                    }
                }
            })
    }

    /// Just the token string of `read()`
    pub fn token(&self) -> Option<String> {
        self.read().map(|active| active.token)
    }

    /// Remove the token from both stores. Both are attempted even if the
    /// first fails; the first error is returned.
    pub fn clear(&self) -> Result<()> {
        let persistent = self.persistent.remove(TOKEN_KEY);
        let ephemeral = self.ephemeral.remove(TOKEN_KEY);
        if let Err(ref e) = persistent {
            warn!(storage = %StorageKind::Persistent, error = %e, "Failed to clear token");
        }
        if let Err(ref e) = ephemeral {
            warn!(storage = %StorageKind::Ephemeral, error = %e, "Failed to clear token");
        }
        debug!("Session cleared");
        persistent.and(ephemeral)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::storage::MemoryStorage;

    fn store() -> (SessionStore, MemoryStorage, MemoryStorage) {
        let persistent = MemoryStorage::new();
        let ephemeral = MemoryStorage::new();
        let session = SessionStore::new(
            Box::new(persistent.clone()),
            Box::new(ephemeral.clone()),
        );
        (session, persistent, ephemeral)
    }

    #[test]
    fn test_save_ephemeral_leaves_persistent_untouched() {
        let (session, persistent, ephemeral) = store();
        assert_eq!(session.save("T1", false).unwrap(), StorageKind::Ephemeral);
        assert_eq!(persistent.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(ephemeral.get(TOKEN_KEY).unwrap().as_deref(), Some("T1"));
    }

    #[test]
    fn test_save_persistent_leaves_ephemeral_untouched() {
        let (session, persistent, ephemeral) = store();
        assert_eq!(session.save("T1", true).unwrap(), StorageKind::Persistent);
        assert_eq!(persistent.get(TOKEN_KEY).unwrap().as_deref(), Some("T1"));
        assert_eq!(ephemeral.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_save_does_not_clear_other_store() {
        let (session, persistent, ephemeral) = store();
        session.save("OLD", true).unwrap();
        session.save("NEW", false).unwrap();
        assert_eq!(persistent.get(TOKEN_KEY).unwrap().as_deref(), Some("OLD"));
        assert_eq!(ephemeral.get(TOKEN_KEY).unwrap().as_deref(), Some("NEW"));
    }

    #[test]
    fn test_read_prefers_persistent() {
        let (session, persistent, ephemeral) = store();
        ephemeral.set(TOKEN_KEY, "E").unwrap();
        persistent.set(TOKEN_KEY, "P").unwrap();
        let active = session.read().unwrap();
        assert_eq!(active.token, "P");
        assert_eq!(active.kind, StorageKind::Persistent);
    }

    #[test]
    fn test_read_falls_back_to_ephemeral_and_skips_empty() {
        let (session, persistent, ephemeral) = store();
        assert!(session.read().is_none());
        persistent.set(TOKEN_KEY, "").unwrap();
        ephemeral.set(TOKEN_KEY, "E").unwrap();
        let active = session.read().unwrap();
        assert_eq!(active.token, "E");
        assert_eq!(active.kind, StorageKind::Ephemeral);
    }

    #[test]
    fn test_clear_removes_both() {
        let (session, persistent, ephemeral) = store();
        persistent.set(TOKEN_KEY, "P").unwrap();
        ephemeral.set(TOKEN_KEY, "E").unwrap();
        session.clear().unwrap();
        assert_eq!(persistent.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(ephemeral.get(TOKEN_KEY).unwrap(), None);
        assert!(session.token().is_none());
    }

    struct BrokenStorage;

    impl TokenStorage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(anyhow::anyhow!("disk on fire"))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow::anyhow!("disk on fire"))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(anyhow::anyhow!("disk on fire"))
        }
    }

    #[test]
    fn test_broken_persistent_store_does_not_block_ephemeral() {
        let ephemeral = MemoryStorage::new();
        let session = SessionStore::new(Box::new(BrokenStorage), Box::new(ephemeral.clone()));
        ephemeral.set(TOKEN_KEY, "E").unwrap();
        assert_eq!(session.token().as_deref(), Some("E"));
        assert!(session.clear().is_err());
        assert_eq!(ephemeral.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_active_token_debug_masks_token() {
        let active = ActiveToken {
            token: "secret".to_string(),
            kind: StorageKind::Ephemeral,
            stored_at: None,
        };
        assert!(!format!("{:?}", active).contains("secret"));
    }
}
