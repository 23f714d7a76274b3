//! Authorization-code + PKCE client for an OIDC identity provider.
//!
//! Interactive sign-in opens the system browser and catches the redirect on
//! a loopback listener. Silent acquisition serves the cache and refreshes
//! with the stored refresh token.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::cache::compute_expires_at;
use super::log::{self, LogLevel};
use super::{
    Account, CALLBACK_TIMEOUT, CacheEntry, CallbackListener, Credentials, IdentityConfig,
    IdentityError, IdentityProvider, TokenCache, TokenStore,
};

/// OAuth error codes that mean "only the user can fix this".
const INTERACTION_ERRORS: [&str; 4] = [
    "invalid_grant",
    "interaction_required",
    "login_required",
    "consent_required",
];

/// Opens a URL for the user. Production uses the system browser.
pub type BrowserLauncher = Arc<dyn Fn(&str) -> std::io::Result<()> + Send + Sync>;

/// PKCE code verifier and challenge
pub struct Pkce {
    pub verifier: String,
    pub challenge: String,
}

/// Generate PKCE code verifier and challenge
pub fn generate_pkce() -> Pkce {
    // Use two UUIDs (16 bytes each) to get 32 random bytes
    let uuid1 = uuid::Uuid::new_v4();
    let uuid2 = uuid::Uuid::new_v4();
    let mut verifier_bytes = [0u8; 32];
    verifier_bytes[..16].copy_from_slice(uuid1.as_bytes());
    verifier_bytes[16..].copy_from_slice(uuid2.as_bytes());
    let verifier = URL_SAFE_NO_PAD.encode(verifier_bytes);

    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    let challenge = URL_SAFE_NO_PAD.encode(hasher.finalize());

    Pkce {
        verifier,
        challenge,
    }
}

/// Builds the authorization URL the browser is sent to.
pub fn build_auth_url(
    config: &IdentityConfig,
    pkce: &Pkce,
    state: &str,
    scopes: &[String],
) -> String {
    let scope = IdentityConfig::scope_param(scopes);
    let params = [
        ("client_id", config.client_id.as_str()),
        ("response_type", "code"),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("scope", scope.as_str()),
        ("code_challenge", pkce.challenge.as_str()),
        ("code_challenge_method", "S256"),
        ("state", state),
        ("response_mode", "query"),
    ];

    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();

    format!("{}?{query}", config.authorize_endpoint())
}

/// Builds the end-session URL, hinting which account is leaving.
pub fn build_logout_url(config: &IdentityConfig, account: Option<&Account>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query
        .append_pair("post_logout_redirect_uri", &config.post_logout_redirect_uri)
        .append_pair("client_id", &config.client_id);
    if let Some(account) = account {
        query.append_pair("logout_hint", &account.username);
    }
    format!("{}?{}", config.logout_endpoint(), query.finish())
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct IdClaims {
    oid: Option<String>,
    sub: Option<String>,
    tid: Option<String>,
    preferred_username: Option<String>,
    email: Option<String>,
    upn: Option<String>,
    name: Option<String>,
}

/// Reads the account out of an id token's payload. The signature is not
/// checked; the token came straight from the token endpoint.
fn account_from_id_token(id_token: &str) -> Result<Account, IdentityError> {
    let parts: Vec<&str> = id_token.split('.').collect();
    if parts.len() != 3 {
        return Err(IdentityError::Protocol(
            "id_token is not a JWT".to_string(),
        ));
    }
    let decoded = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| IdentityError::Protocol(format!("id_token payload is not base64: {e}")))?;
    let claims: IdClaims = serde_json::from_slice(&decoded)
        .map_err(|e| IdentityError::Protocol(format!("id_token payload is not JSON: {e}")))?;

    let Some(object_id) = claims.oid.or(claims.sub) else {
        return Err(IdentityError::Protocol(
            "id_token has neither oid nor sub".to_string(),
        ));
    };
    let home_account_id = match claims.tid.as_deref() {
        Some(tid) => format!("{object_id}.{tid}"),
        None => object_id,
    };

    Ok(Account {
        home_account_id,
        tenant_id: claims.tid,
        username: claims
            .preferred_username
            .or(claims.email)
            .or(claims.upn)
            .unwrap_or_default(),
        name: claims.name,
    })
}

fn classify_token_error(status: u16, body: String) -> IdentityError {
    if let Ok(err) = serde_json::from_str::<OAuthErrorBody>(&body)
        && INTERACTION_ERRORS.contains(&err.error.as_str())
    {
        return IdentityError::InteractionRequired(err.error_description.unwrap_or(err.error));
    }
    IdentityError::Http { status, body }
}

pub struct OidcProvider {
    config: IdentityConfig,
    http: reqwest::Client,
    store: TokenStore,
    cache: Mutex<TokenCache>,
    launcher: BrowserLauncher,
    callback_timeout: Duration,
}

impl OidcProvider {
    /// Provider backed by the configured cache location and the system browser.
    pub fn from_config(config: IdentityConfig) -> anyhow::Result<Self> {
        let store = TokenStore::for_location(config.cache_location);
        let launcher: BrowserLauncher = Arc::new(|url: &str| open::that(url));
        Self::new(config, store, launcher)
    }

    pub fn new(
        config: IdentityConfig,
        store: TokenStore,
        launcher: BrowserLauncher,
    ) -> anyhow::Result<Self> {
        let cache = store.load()?;
        Ok(Self {
            config,
            http: reqwest::Client::new(),
            store,
            cache: Mutex::new(cache),
            launcher,
            callback_timeout: CALLBACK_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_callback_timeout(mut self, timeout: Duration) -> Self {
        self.callback_timeout = timeout;
        self
    }

    fn lock_cache(&self) -> MutexGuard<'_, TokenCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn post_token_request(
        &self,
        form: String,
        what: &str,
    ) -> Result<TokenResponse, IdentityError> {
        let response = self
            .http
            .post(self.config.token_endpoint())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await
            .with_context(|| format!("Failed to send {what} request"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warning(&format!("{what} failed (HTTP {status})"));
            return Err(classify_token_error(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| IdentityError::Protocol(format!("Failed to parse token response: {e}")))
    }

    async fn exchange_code(
        &self,
        code: &str,
        pkce: &Pkce,
        scopes: &[String],
    ) -> Result<TokenResponse, IdentityError> {
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "authorization_code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("code", code)
            .append_pair("code_verifier", &pkce.verifier)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &IdentityConfig::scope_param(scopes))
            .finish();
        self.post_token_request(form, "Token exchange").await
    }

    async fn refresh(
        &self,
        refresh_token: &str,
        scopes: &[String],
    ) -> Result<TokenResponse, IdentityError> {
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "refresh_token")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("refresh_token", refresh_token)
            .append_pair("scope", &IdentityConfig::scope_param(scopes))
            .finish();
        self.post_token_request(form, "Token refresh").await
    }

    /// Writes a token response into the cache, falling back to `previous`
    /// for anything a refresh response leaves out.
    fn store_tokens(
        &self,
        tokens: TokenResponse,
        previous: Option<&CacheEntry>,
        activate: bool,
    ) -> Result<CacheEntry, IdentityError> {
        let id_token = match (tokens.id_token, previous) {
            (Some(token), _) => token,
            (None, Some(prev)) => prev.credentials.id_token.clone(),
            (None, None) => {
                return Err(IdentityError::Protocol(
                    "Token response did not include an id_token".to_string(),
                ));
            }
        };
        let account = match (account_from_id_token(&id_token), previous) {
            (Ok(account), _) => account,
            (Err(_), Some(prev)) => prev.account.clone(),
            (Err(err), None) => return Err(err),
        };

        let entry = CacheEntry {
            account,
            credentials: Credentials {
                id_token,
                access_token: tokens.access_token,
                refresh_token: tokens
                    .refresh_token
                    .or_else(|| previous.and_then(|p| p.credentials.refresh_token.clone())),
                expires: compute_expires_at(tokens.expires_in),
            },
        };

        let mut cache = self.lock_cache();
        cache.upsert(entry.clone());
        if activate {
            cache.set_active(Some(&entry.account.home_account_id));
        }
        self.store.save(&cache)?;
        Ok(entry)
    }
}

#[async_trait]
impl IdentityProvider for OidcProvider {
    async fn acquire_token_silent(
        &self,
        account: &Account,
        scopes: &[String],
    ) -> Result<String, IdentityError> {
        let cached = self.lock_cache().get(&account.home_account_id).cloned();
        let Some(entry) = cached else {
            return Err(IdentityError::InteractionRequired(
                "no cached credentials for account".to_string(),
            ));
        };

        if !entry.credentials.is_expired() {
            log::verbose("Serving token from cache");
            return Ok(entry.credentials.token(self.config.token_kind).to_string());
        }

        let Some(refresh_token) = entry.credentials.refresh_token.clone() else {
            return Err(IdentityError::InteractionRequired(
                "cached credentials have no refresh token".to_string(),
            ));
        };

        log::info("Cached token expired, refreshing");
        let tokens = self.refresh(&refresh_token, scopes).await?;
        let updated = self.store_tokens(tokens, Some(&entry), false)?;
        Ok(updated.credentials.token(self.config.token_kind).to_string())
    }

    async fn acquire_token_interactive(&self, scopes: &[String]) -> Result<String, IdentityError> {
        let (port, path) = self
            .config
            .redirect_listener()
            .map_err(|e| IdentityError::Protocol(format!("{e:#}")))?;

        let pkce = generate_pkce();
        let state = uuid::Uuid::new_v4().to_string();
        let auth_url = build_auth_url(&self.config, &pkce, &state, scopes);

        let listener = CallbackListener::bind(port).await?;
        log::info("Opening browser for interactive sign-in");
        (self.launcher)(&auth_url)
            .map_err(|e| IdentityError::Protocol(format!("Failed to open the browser: {e}")))?;

        let code = listener
            .wait_for_code(&path, &state, self.callback_timeout)
            .await?;
        let tokens = self.exchange_code(&code, &pkce, scopes).await?;
        let entry = self.store_tokens(tokens, None, true)?;

        log::info("Interactive sign-in completed");
        log::emit(
            LogLevel::Info,
            &format!("Signed in as {}", entry.account.username),
            true,
        );
        Ok(entry.credentials.token(self.config.token_kind).to_string())
    }

    fn all_accounts(&self) -> Vec<Account> {
        self.lock_cache().accounts()
    }

    fn active_account(&self) -> Option<Account> {
        self.lock_cache().active_account()
    }

    fn set_active_account(&self, account: Option<&Account>) {
        let mut cache = self.lock_cache();
        cache.set_active(account.map(|a| a.home_account_id.as_str()));
        if let Err(err) = self.store.save(&cache) {
            log::error(&format!("Failed to persist active account: {err:#}"));
        }
    }

    async fn sign_out(&self, account: &Account) -> Result<(), IdentityError> {
        {
            let mut cache = self.lock_cache();
            cache.remove(&account.home_account_id);
            self.store.save(&cache)?;
        }
        log::info("Removed account from token cache");

        let logout_url = build_logout_url(&self.config, Some(account));
        if let Err(err) = (self.launcher)(&logout_url) {
            log::warning(&format!("Failed to open the sign-out page: {err}"));
        }
        Ok(())
    }
}
