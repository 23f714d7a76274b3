//! Identity: who the user is and how we get a bearer token for them.
//!
//! `IdentityProvider` is the narrow seam over the identity provider client.
//! `SessionManager` is what the rest of the app talks to.

mod cache;
mod callback;
mod config;
mod error;
pub mod log;
mod oidc;
mod session;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use cache::{CacheEntry, Credentials, TokenCache, TokenStore};
pub use callback::{CALLBACK_TIMEOUT, CallbackListener};
pub use config::{CacheLocation, IdentityConfig, TokenKind};
pub use error::IdentityError;
pub use oidc::{BrowserLauncher, OidcProvider, Pkce, build_auth_url, build_logout_url, generate_pkce};
pub use session::SessionManager;

/// An account known to the token cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable key: `<oid>.<tid>` when the tenant is known, otherwise the subject.
    pub home_account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Sign-in name (UPN or email). PII.
    pub username: String,
    /// Human-readable name. PII.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Account {
    /// Name to show in the UI: the display name, falling back to the username.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}

/// Capability surface of the identity provider client.
///
/// Implementations keep their own account cache; `&self` methods use
/// interior mutability so one provider can be shared behind an `Arc`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns a token for `account` without user interaction.
    ///
    /// Fails with [`IdentityError::InteractionRequired`] when only an
    /// interactive prompt can produce a token.
    async fn acquire_token_silent(
        &self,
        account: &Account,
        scopes: &[String],
    ) -> Result<String, IdentityError>;

    /// Runs the interactive sign-in and returns a token. On success the
    /// signed-in account becomes active.
    async fn acquire_token_interactive(&self, scopes: &[String]) -> Result<String, IdentityError>;

    /// All accounts in the cache, in the order they were first added.
    fn all_accounts(&self) -> Vec<Account>;

    fn active_account(&self) -> Option<Account>;

    fn set_active_account(&self, account: Option<&Account>);

    /// Forgets `account` and ends its provider session.
    async fn sign_out(&self, account: &Account) -> Result<(), IdentityError>;
}

/// Builds the production session manager from config.
pub fn connect(config: &IdentityConfig) -> Result<SessionManager> {
    config.validate()?;
    let provider = OidcProvider::from_config(config.clone())?;
    Ok(SessionManager::new(Arc::new(provider), config.scopes.clone()))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_username() {
        let mut account = testing::account("a1", "Ada Lovelace");
        assert_eq!(account.display_name(), "Ada Lovelace");

        account.name = Some("  ".to_string());
        assert_eq!(account.display_name(), "a1@example.com");

        account.name = None;
        assert_eq!(account.display_name(), "a1@example.com");
    }
}
