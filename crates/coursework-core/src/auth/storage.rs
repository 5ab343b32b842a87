//! Key-value backends the session store writes tokens into.
//!
//! - `MemoryStorage`: lives as long as the process (the ephemeral store)
//! - `FileStorage`: JSON file in the data directory (the default persistent store)
//! - `KeyringStorage`: OS keychain (opt-in persistent store)

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A string key-value namespace.
pub trait TokenStorage: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// When the value under `key` was written, if the backend records it
    fn stored_at(&self, _key: &str) -> Option<DateTime<Utc>> {
        None
    }
}

// ============================================================================
// Memory
// ============================================================================

/// In-memory storage. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory storage lock poisoned"))
    }
}

impl TokenStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// ============================================================================
// File
// ============================================================================

/// Token file name in the data directory
pub const TOKEN_FILE: &str = "tokens.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredValue {
    value: String,
    stored_at: DateTime<Utc>,
}

/// JSON file storage, surviving restarts.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(TOKEN_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, StoredValue>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents =
            std::fs::read_to_string(&self.path).context("Failed to read token file")?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).context("Failed to parse token file")
    }

    fn write(&self, entries: &BTreeMap<String, StoredValue>) -> Result<()> {
        if entries.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).context("Failed to remove token file")?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents).context("Failed to write token file")?;
        restrict_permissions(&self.path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .context("Failed to restrict token file permissions")
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

impl TokenStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key).map(|stored| stored.value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.load().unwrap_or_default();
        entries.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                stored_at: Utc::now(),
            },
        );
        self.write(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        // A corrupt file cannot hold a usable token; drop it entirely
        let mut entries = self.load().unwrap_or_default();
        entries.remove(key);
        self.write(&entries)
    }

    fn stored_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.load().ok()?.get(key).map(|stored| stored.stored_at)
    }
}

// ============================================================================
// Keyring
// ============================================================================

/// OS keychain storage. Each key is a separate keychain entry under `service`.
#[derive(Debug, Clone)]
pub struct KeyringStorage {
    service: String,
}

impl KeyringStorage {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).context("Failed to create keyring entry")
    }
}

impl TokenStorage for KeyringStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read token from keychain"),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .context("Failed to store token in keychain")
    }

    fn remove(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => {
                debug!(error = %e, "Keychain delete failed");
                Err(e).context("Failed to delete token from keychain")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip_and_shared_clones() {
        let storage = MemoryStorage::new();
        let handle = storage.clone();
        storage.set("access_token", "T1").unwrap();
        assert_eq!(handle.get("access_token").unwrap().as_deref(), Some("T1"));
        handle.remove("access_token").unwrap();
        assert_eq!(storage.get("access_token").unwrap(), None);
        // Removing a missing key is fine
        storage.remove("access_token").unwrap();
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.set("access_token", "T1").unwrap();
        assert!(storage.stored_at("access_token").is_some());

        let reopened = FileStorage::new(dir.path());
        assert_eq!(reopened.get("access_token").unwrap().as_deref(), Some("T1"));

        reopened.remove("access_token").unwrap();
        assert_eq!(storage.get("access_token").unwrap(), None);
        // Last key removed deletes the file
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_file_storage_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();
        storage.remove("a").unwrap();
        assert_eq!(storage.get("b").unwrap().as_deref(), Some("2"));
        assert!(storage.path().exists());
    }

    #[test]
    fn test_file_storage_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        std::fs::write(storage.path(), "{not json").unwrap();
        assert!(storage.get("access_token").is_err());
        // Remove recovers by rewriting
        storage.remove("access_token").unwrap();
        assert_eq!(storage.get("access_token").unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.set("access_token", "T1").unwrap();
        let mode = std::fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
