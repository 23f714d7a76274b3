use std::sync::Arc;

use super::log::{self, LogLevel};
use super::{Account, IdentityError, IdentityProvider};

/// Owns the identity provider for the whole app and turns its failures into
/// "token or no token".
#[derive(Clone)]
pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    scopes: Vec<String>,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn IdentityProvider>, scopes: Vec<String>) -> Self {
        Self { provider, scopes }
    }

    /// Picks the active account at startup: the already-active one, else the
    /// first known account.
    pub fn initialize(&self) -> Option<Account> {
        if let Some(active) = self.provider.active_account() {
            return Some(active);
        }
        let first = self.provider.all_accounts().into_iter().next()?;
        self.provider.set_active_account(Some(&first));
        log::info("Restored first cached account as active");
        Some(first)
    }

    pub fn active_account(&self) -> Option<Account> {
        self.provider.active_account()
    }

    pub fn display_name(&self) -> Option<String> {
        self.active_account()
            .map(|account| account.display_name().to_string())
    }

    /// Returns a bearer token for the active account, or `None`.
    ///
    /// Tries silently first. Only `InteractionRequired` falls through to the
    /// interactive flow; every other failure ends here.
    pub async fn acquire_token(&self) -> Option<String> {
        let Some(account) = self.provider.active_account() else {
            log::warning("No active account; cannot acquire a token");
            return None;
        };

        match self
            .provider
            .acquire_token_silent(&account, &self.scopes)
            .await
        {
            Ok(token) => Some(token),
            Err(IdentityError::InteractionRequired(reason)) => {
                log::info(&format!(
                    "Silent token acquisition needs interaction: {reason}"
                ));
                match self.provider.acquire_token_interactive(&self.scopes).await {
                    Ok(token) => Some(token),
                    Err(err) => {
                        log::error(&format!("Authentication failed: {err}"));
                        None
                    }
                }
            }
            Err(err) => {
                log::error(&format!("Silent token acquisition failed: {err}"));
                None
            }
        }
    }

    /// Runs the interactive sign-in. On success the new account is active.
    pub async fn login(&self) -> Result<Account, IdentityError> {
        self.provider.acquire_token_interactive(&self.scopes).await?;
        let account = self.provider.active_account().ok_or(IdentityError::NoAccount)?;
        log::emit(
            LogLevel::Info,
            &format!("Active account is now {}", account.username),
            true,
        );
        Ok(account)
    }

    /// Signs the active account out. Failures are logged, never returned.
    pub async fn sign_out(&self) {
        let Some(account) = self.provider.active_account() else {
            log::verbose("Sign-out requested with no active account");
            return;
        };
        if let Err(err) = self.provider.sign_out(&account).await {
            log::error(&format!("Sign-out failed: {err}"));
        }
    }
}
