//! Token cache storage and retrieval.
//!
//! Stored as JSON in `token_cache.json` with restricted permissions (0600)
//! under the `file` policy. Tokens are never logged or displayed.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{Account, CacheLocation, TokenKind};
use crate::config::paths;

/// Tokens are treated as expired this long before the provider says so.
const EXPIRY_BUFFER_MS: u64 = 5 * 60 * 1000;

pub(crate) fn now_millis_u64() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| u64::try_from(d.as_millis()).ok())
        .unwrap_or(u64::MAX)
}

/// Absolute expiry for a token that lives `expires_in_secs`, minus the buffer.
pub(crate) fn compute_expires_at(expires_in_secs: u64) -> u64 {
    let lifetime_ms = expires_in_secs
        .saturating_mul(1000)
        .saturating_sub(EXPIRY_BUFFER_MS);
    now_millis_u64().saturating_add(lifetime_ms)
}

/// Tokens held for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub id_token: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry timestamp in milliseconds since epoch, buffer already applied.
    pub expires: u64,
}

impl Credentials {
    pub fn is_expired(&self) -> bool {
        now_millis_u64() >= self.expires
    }

    pub fn token(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Id => &self.id_token,
            TokenKind::Access => &self.access_token,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub account: Account,
    pub credentials: Credentials,
}

/// Accounts with their credentials, plus which one is active.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TokenCache {
    #[serde(default)]
    pub accounts: Vec<CacheEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
}

impl TokenCache {
    pub fn get(&self, home_account_id: &str) -> Option<&CacheEntry> {
        self.accounts
            .iter()
            .find(|e| e.account.home_account_id == home_account_id)
    }

    /// Inserts or replaces the entry for the entry's account, keeping its
    /// original position.
    pub fn upsert(&mut self, entry: CacheEntry) {
        match self
            .accounts
            .iter_mut()
            .find(|e| e.account.home_account_id == entry.account.home_account_id)
        {
            Some(existing) => *existing = entry,
            None => self.accounts.push(entry),
        }
    }

    /// Removes an account, clearing `active` if it pointed at it.
    pub fn remove(&mut self, home_account_id: &str) -> Option<CacheEntry> {
        let index = self
            .accounts
            .iter()
            .position(|e| e.account.home_account_id == home_account_id)?;
        if self.active.as_deref() == Some(home_account_id) {
            self.active = None;
        }
        Some(self.accounts.remove(index))
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.accounts.iter().map(|e| e.account.clone()).collect()
    }

    /// The active account, if it still has an entry.
    pub fn active_account(&self) -> Option<Account> {
        let id = self.active.as_deref()?;
        self.get(id).map(|e| e.account.clone())
    }

    pub fn set_active(&mut self, home_account_id: Option<&str>) {
        self.active = home_account_id
            .filter(|id| self.get(id).is_some())
            .map(str::to_string);
    }
}

/// Backing store for a [`TokenCache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStore {
    File(PathBuf),
    Memory,
}

impl TokenStore {
    pub fn for_location(location: CacheLocation) -> Self {
        match location {
            CacheLocation::File => Self::File(paths::token_cache_path()),
            CacheLocation::Memory => Self::Memory,
        }
    }

    /// Loads the cache. Returns an empty cache if nothing is stored yet.
    pub fn load(&self) -> Result<TokenCache> {
        let Self::File(path) = self else {
            return Ok(TokenCache::default());
        };
        if !path.exists() {
            return Ok(TokenCache::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read token cache from {}", path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse token cache from {}", path.display()))
    }

    /// Saves the cache with restricted permissions (0600). No-op in memory.
    pub fn save(&self, cache: &TokenCache) -> Result<()> {
        let Self::File(path) = self else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(cache).context("Failed to serialize token cache")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)
                .with_context(|| format!("Failed to open {} for writing", path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(path, contents)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        Ok(())
    }
}
