//! Client-credentials tokens for calls to the NEF.
//!
//! A token is requested for every downstream call and never reused.

use crate::auth::error::AuthError;
use async_trait::async_trait;
use log::{debug, error};
use serde::{Deserialize, Serialize};

/// Token endpoint response (RFC 6749 section 5.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue(&self) -> Result<AccessToken, AuthError>;
}

pub struct ClientCredentialsIssuer {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl ClientCredentialsIssuer {
    pub fn new(
        client: reqwest::Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

#[async_trait]
impl TokenIssuer for ClientCredentialsIssuer {
    async fn issue(&self) -> Result<AccessToken, AuthError> {
        debug!("Requesting client credentials token from {}", self.token_url);
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!("Token endpoint {} answered {}", self.token_url, status);
            return Err(AuthError::TokenRequest {
                status: status.as_u16(),
            });
        }
        Ok(response.json::<AccessToken>().await?)
    }
}
