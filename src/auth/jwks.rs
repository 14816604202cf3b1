//! Public key set of the authorization server, with a time-bounded cache.
//!
//! Keys are discovered through `{authServer}/.well-known/openid-configuration`.
//! The set is cached for a configurable lifetime. After expiry the previous
//! set stays in use until a single background refresh replaces it.

use crate::auth::error::AuthError;
use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::DecodingKey;
use log::{debug, info, warn};
use moka::future::Cache;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Default cache lifetime of the key set.
pub const DEFAULT_CACHE_DURATION: Duration = Duration::from_secs(5 * 60);

const OPENID_CONFIGURATION_PATH: &str = "/.well-known/openid-configuration";

/// Source of the signing key set.
#[async_trait]
pub trait KeySetFetcher: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, AuthError>;
}

#[derive(Debug, Deserialize)]
struct OpenIdConfiguration {
    jwks_uri: String,
}

/// Fetches the key set over HTTP via OpenID discovery.
pub struct HttpKeySetFetcher {
    client: reqwest::Client,
    auth_server_url: String,
}

impl HttpKeySetFetcher {
    pub fn new(client: reqwest::Client, auth_server_url: impl Into<String>) -> Self {
        Self {
            client,
            auth_server_url: auth_server_url.into(),
        }
    }

    fn discovery_url(&self) -> String {
        format!(
            "{}{}",
            self.auth_server_url.trim_end_matches('/'),
            OPENID_CONFIGURATION_PATH
        )
    }
}

#[async_trait]
impl KeySetFetcher for HttpKeySetFetcher {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let discovery_url = self.discovery_url();
        debug!("Fetching OpenID configuration from {}", discovery_url);
        let config: OpenIdConfiguration = self
            .client
            .get(&discovery_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let key_set: JwkSet = self
            .client
            .get(&config.jwks_uri)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        info!(
            "Fetched {} signing keys from {}",
            key_set.keys.len(),
            config.jwks_uri
        );
        Ok(key_set)
    }
}

pub struct JwksCache {
    fetcher: Arc<dyn KeySetFetcher>,
    fresh: Cache<(), Arc<JwkSet>>,
    last_good: Arc<RwLock<Option<Arc<JwkSet>>>>,
    refreshing: Arc<AtomicBool>,
}

impl JwksCache {
    pub fn new(fetcher: Arc<dyn KeySetFetcher>, ttl: Duration) -> Self {
        let fresh = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self {
            fetcher,
            fresh,
            last_good: Arc::new(RwLock::new(None)),
            refreshing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The current key set.
    ///
    /// Only the very first call waits for the authorization server. Once a set
    /// has been fetched, an expired one keeps being served while a background
    /// task replaces it.
    pub async fn key_set(&self) -> Result<Arc<JwkSet>, AuthError> {
        if let Some(key_set) = self.fresh.get(&()).await {
            return Ok(key_set);
        }
        let stale = self.last_good.read().await.clone();
        match stale {
            Some(key_set) => {
                self.spawn_refresh();
                Ok(key_set)
            }
            None => refresh(&self.fresh, &self.fetcher, &self.last_good).await,
        }
    }

    fn spawn_refresh(&self) {
        if self.refreshing.swap(true, Ordering::AcqRel) {
            return;
        }
        let fresh = self.fresh.clone();
        let fetcher = Arc::clone(&self.fetcher);
        let last_good = Arc::clone(&self.last_good);
        let refreshing = Arc::clone(&self.refreshing);
        tokio::spawn(async move {
            debug!("Refreshing expired key set");
            if let Err(e) = refresh(&fresh, &fetcher, &last_good).await {
                warn!("Key set refresh failed, keeping the previous set: {}", e);
            }
            refreshing.store(false, Ordering::Release);
        });
    }

    /// Decoding key for the given key id.
    pub async fn decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, AuthError> {
        let kid = kid.ok_or(AuthError::UnknownKey(None))?;
        let key_set = self.key_set().await?;
        let jwk = key_set
            .find(kid)
            .ok_or_else(|| AuthError::UnknownKey(Some(kid.to_string())))?;
        Ok(DecodingKey::from_jwk(jwk)?)
    }
}

/// Single-flight fetch into the fresh slot, remembering the result.
async fn refresh(
    fresh: &Cache<(), Arc<JwkSet>>,
    fetcher: &Arc<dyn KeySetFetcher>,
    last_good: &RwLock<Option<Arc<JwkSet>>>,
) -> Result<Arc<JwkSet>, AuthError> {
    let fetcher = Arc::clone(fetcher);
    let key_set = fresh
        .try_get_with((), async move { fetcher.fetch().await.map(Arc::new) })
        .await
        .map_err(|e| AuthError::KeySetFetch(e.to_string()))?;
    *last_good.write().await = Some(Arc::clone(&key_set));
    Ok(key_set)
}
