//! Identity provider client.
//!
//! Sign-in is delegated to a hosted identity provider: the browser is sent
//! to the provider's authorize page, and the provider redirects back with a
//! one-time grant code that this client exchanges for the account's email.
//! The provider owns passwords and account recovery; this service only ever
//! sees the email.

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Provider URL missing from configuration.
    #[error("identity provider is not configured; set auth_url")]
    NotConfigured,

    /// Transport-level failure talking to the provider.
    #[error("identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the grant code.
    #[error("identity provider returned status {0}")]
    Status(u16),
}

/// Payload returned when a grant code is exchanged.
#[derive(Debug, Deserialize)]
struct GrantResponse {
    email: String,
}

/// Client for the hosted identity provider.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    base_url: String,
    client: reqwest::Client,
}

impl IdentityClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// The provider page to send a browser to, returning to `callback`.
    pub fn authorize_url(&self, callback: &str) -> String {
        format!(
            "{}/authorize?redirect_uri={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(callback)
        )
    }

    /// Exchanges a grant code for the signed-in account's email.
    pub async fn resolve_grant(&self, code: &str) -> Result<String, AuthError> {
        let url = format!(
            "{}/identity?code={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(code)
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(AuthError::Status(response.status().as_u16()));
        }

        let grant: GrantResponse = response.json().await?;
        Ok(grant.email)
    }
}
