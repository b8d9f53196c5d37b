use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Token file name in the cache directory
const TOKENS_FILE: &str = "tokens.json";

/// The persisted credential pair. Absence of an access token means
/// "unauthenticated"; the refresh token is only ever used to mint a new
/// access token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredTokens {
    access: Option<String>,
    refresh: Option<String>,
}

/// Single source of truth for the current bearer credential.
///
/// Holds at most one access-token entry and one refresh-token entry,
/// persisted across runs, cleared on logout or irrecoverable refresh
/// failure. All mutations go through this store so the header attached
/// to a request can never be stale after a refresh.
pub struct TokenStore {
    cache_dir: PathBuf,
    tokens: StoredTokens,
}

impl TokenStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            tokens: StoredTokens::default(),
        }
    }

    /// Load any persisted token pair from disk. Idempotent; safe to call
    /// more than once. Returns whether an access token was found.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.tokens_path();
        if path.exists() {
            let contents =
                std::fs::read_to_string(&path).context("Failed to read token file")?;
            self.tokens =
                serde_json::from_str(&contents).context("Failed to parse token file")?;
            debug!(has_access = self.tokens.access.is_some(), "Tokens loaded");
        }
        Ok(self.tokens.access.is_some())
    }

    /// Store new token values persistently. Passing `None` for either slot
    /// keeps the previously stored value, so a silent refresh can replace
    /// just the access token.
    pub fn set_tokens(
        &mut self,
        access: Option<String>,
        refresh: Option<String>,
    ) -> Result<()> {
        if let Some(access) = access {
            self.tokens.access = Some(access);
        }
        if let Some(refresh) = refresh {
            self.tokens.refresh = Some(refresh);
        }
        self.save()
    }

    /// Remove both persisted values. Idempotent regardless of prior state.
    /// Used on logout and on unrecoverable auth failure.
    pub fn clear(&mut self) -> Result<()> {
        self.tokens = StoredTokens::default();
        let path = self.tokens_path();
        if path.exists() {
            std::fs::remove_file(&path).context("Failed to remove token file")?;
        }
        debug!("Tokens cleared");
        Ok(())
    }

    pub fn access_token(&self) -> Option<&str> {
        self.tokens.access.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.tokens.refresh.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.access.is_some()
    }

    /// The `Authorization` header value for the current access token.
    pub fn bearer_value(&self) -> Option<String> {
        self.tokens.access.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn save(&self) -> Result<()> {
        let path = self.tokens_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.tokens)?;
        std::fs::write(&path, contents).context("Failed to write token file")?;
        Ok(())
    }

    fn tokens_path(&self) -> PathBuf {
        self.cache_dir.join(TOKENS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, TokenStore) {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    #[test]
    fn test_latest_access_token_wins() {
        let (_dir, mut store) = store();
        store
            .set_tokens(Some("A1".to_string()), Some("R1".to_string()))
            .unwrap();
        store.set_tokens(Some("A2".to_string()), None).unwrap();

        assert_eq!(store.access_token(), Some("A2"));
        assert_eq!(store.bearer_value().as_deref(), Some("Bearer A2"));
        // Omitted refresh keeps the previously stored value
        assert_eq!(store.refresh_token(), Some("R1"));
    }

    #[test]
    fn test_load_round_trip() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = TokenStore::new(dir.path().to_path_buf());
            store
                .set_tokens(Some("A1".to_string()), Some("R1".to_string()))
                .unwrap();
        }
        let mut reloaded = TokenStore::new(dir.path().to_path_buf());
        assert!(reloaded.load().unwrap());
        assert_eq!(reloaded.access_token(), Some("A1"));
        assert_eq!(reloaded.refresh_token(), Some("R1"));
    }

    #[test]
    fn test_load_is_idempotent() {
        let (_dir, mut store) = store();
        store.set_tokens(Some("A1".to_string()), None).unwrap();
        assert!(store.load().unwrap());
        assert!(store.load().unwrap());
        assert_eq!(store.access_token(), Some("A1"));
    }

    #[test]
    fn test_load_with_no_file() {
        let (_dir, mut store) = store();
        assert!(!store.load().unwrap());
        assert!(!store.is_authenticated());
        assert!(store.bearer_value().is_none());
    }

    #[test]
    fn test_clear_removes_both_and_is_idempotent() {
        let (dir, mut store) = store();
        store
            .set_tokens(Some("A1".to_string()), Some("R1".to_string()))
            .unwrap();
        store.clear().unwrap();

        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
        assert!(!dir.path().join(TOKENS_FILE).exists());

        // Clearing an already-empty store is fine
        store.clear().unwrap();
        assert!(!store.is_authenticated());

        // Nothing survives a reload either
        let mut reloaded = TokenStore::new(dir.path().to_path_buf());
        assert!(!reloaded.load().unwrap());
    }
}
