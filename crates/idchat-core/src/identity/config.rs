use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use url::Url;

/// Scope appended to every token request so refresh tokens are issued.
const OFFLINE_ACCESS: &str = "offline_access";

/// Where the token cache lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheLocation {
    /// `${IDCHAT_HOME}/token_cache.json`, mode 0600.
    #[default]
    File,
    /// Process lifetime only.
    Memory,
}

/// Which token is presented to the chat backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    #[default]
    Id,
    Access,
}

/// Static description of the identity provider client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub client_id: String,
    pub authority: String,
    pub redirect_uri: String,
    pub post_logout_redirect_uri: String,
    pub cache_location: CacheLocation,
    pub scopes: Vec<String>,
    pub token_kind: TokenKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorize_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logout_url: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            authority: "https://login.microsoftonline.com/common".to_string(),
            redirect_uri: "http://localhost:53682/auth/callback".to_string(),
            post_logout_redirect_uri: "http://localhost:53682/".to_string(),
            cache_location: CacheLocation::File,
            scopes: vec!["openid".into(), "profile".into(), "email".into()],
            token_kind: TokenKind::Id,
            authorize_url: None,
            token_url: None,
            logout_url: None,
        }
    }
}

impl IdentityConfig {
    fn endpoint(&self, name: &str) -> String {
        format!("{}/oauth2/v2.0/{name}", self.authority.trim_end_matches('/'))
    }

    pub fn authorize_endpoint(&self) -> String {
        self.authorize_url
            .clone()
            .unwrap_or_else(|| self.endpoint("authorize"))
    }

    pub fn token_endpoint(&self) -> String {
        self.token_url
            .clone()
            .unwrap_or_else(|| self.endpoint("token"))
    }

    pub fn logout_endpoint(&self) -> String {
        self.logout_url
            .clone()
            .unwrap_or_else(|| self.endpoint("logout"))
    }

    /// Host of the authority, for display.
    pub fn authority_host(&self) -> String {
        Url::parse(&self.authority)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| self.authority.clone())
    }

    /// Space-separated scopes for a token request, with `offline_access`.
    pub fn scope_param(scopes: &[String]) -> String {
        let mut all: Vec<&str> = scopes.iter().map(String::as_str).collect();
        if !all.contains(&OFFLINE_ACCESS) {
            all.push(OFFLINE_ACCESS);
        }
        all.join(" ")
    }

    /// Port and path the local callback listener must serve.
    pub fn redirect_listener(&self) -> Result<(u16, String)> {
        let url = Url::parse(&self.redirect_uri)
            .with_context(|| format!("Invalid redirect_uri '{}'", self.redirect_uri))?;
        if url.scheme() != "http" || !matches!(url.host_str(), Some("localhost" | "127.0.0.1")) {
            bail!(
                "redirect_uri must be an http://localhost or http://127.0.0.1 URL, got '{}'",
                self.redirect_uri
            );
        }
        let Some(port) = url.port() else {
            bail!("redirect_uri must include a port, got '{}'", self.redirect_uri);
        };
        Ok((port, url.path().to_string()))
    }

    /// Checks the fields needed to talk to the provider at all.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            bail!(
                "identity.client_id is not set. Add it to config.toml or set IDCHAT_CLIENT_ID."
            );
        }
        let authority = Url::parse(&self.authority)
            .with_context(|| format!("Invalid identity.authority '{}'", self.authority))?;
        if !matches!(authority.scheme(), "http" | "https") {
            bail!("identity.authority must be an http(s) URL, got '{}'", self.authority);
        }
        self.redirect_listener()?;
        Ok(())
    }
}
