//! HTTP client for the NEF AsSessionWithQoS subscription API.

use crate::auth::AccessToken;
use crate::nef::types::{AsSessionWithQoSSubscription, UserPlaneNotificationData};
use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::{header::LOCATION, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Default bound on every NEF request.
pub const DEFAULT_NEF_TIMEOUT: Duration = Duration::from_secs(5);

const SUBSCRIPTION_MARKER: &str = "subscriptions/";

#[derive(Debug, Error)]
pub enum NefError {
    #[error("nef request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("nef answered unexpected status {0}")]
    UnexpectedStatus(u16),

    #[error("nef response has no Location header")]
    MissingLocation,

    #[error("no subscriptionId in Location {0}")]
    MalformedLocation(String),
}

/// A subscription the NEF accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedSubscription {
    pub subscription_id: String,
    /// Full resource URI from the Location header.
    pub resource_uri: String,
    pub subscription: Option<AsSessionWithQoSSubscription>,
}

impl CreatedSubscription {
    /// The `self` link the NEF returned, or the Location URI without one.
    pub fn self_link(&self) -> &str {
        self.subscription
            .as_ref()
            .and_then(|s| s.self_link.as_deref())
            .unwrap_or(&self.resource_uri)
    }
}

#[async_trait]
pub trait SubscriptionApi: Send + Sync {
    async fn create(
        &self,
        scs_as_id: &str,
        payload: &AsSessionWithQoSSubscription,
        token: &AccessToken,
    ) -> Result<CreatedSubscription, NefError>;

    /// Returns notification data when the NEF sends any.
    async fn delete(
        &self,
        scs_as_id: &str,
        subscription_id: &str,
        token: &AccessToken,
    ) -> Result<Option<UserPlaneNotificationData>, NefError>;
}

pub struct NefClient {
    client: reqwest::Client,
    api_root: String,
}

impl NefClient {
    /// `api_root` is the NEF base URL including the service name path.
    pub fn new(api_root: impl Into<String>, timeout: Duration) -> Result<Self, NefError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_root: api_root.into().trim_end_matches('/').to_string(),
        })
    }

    fn subscriptions_url(&self, scs_as_id: &str) -> String {
        format!("{}/{}/subscriptions", self.api_root, scs_as_id)
    }

    fn subscription_url(&self, scs_as_id: &str, subscription_id: &str) -> String {
        format!("{}/{}", self.subscriptions_url(scs_as_id), subscription_id)
    }
}

/// Text following `subscriptions/` in a resource URI.
pub fn subscription_id_from_location(location: &str) -> Result<String, NefError> {
    location
        .find(SUBSCRIPTION_MARKER)
        .map(|idx| location[idx + SUBSCRIPTION_MARKER.len()..].to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| NefError::MalformedLocation(location.to_string()))
}

#[async_trait]
impl SubscriptionApi for NefClient {
    async fn create(
        &self,
        scs_as_id: &str,
        payload: &AsSessionWithQoSSubscription,
        token: &AccessToken,
    ) -> Result<CreatedSubscription, NefError> {
        let url = self.subscriptions_url(scs_as_id);
        debug!("POST {} {:?}", url, payload);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&token.access_token)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            error!("Subscription create at {} failed with {}", url, status);
            return Err(NefError::UnexpectedStatus(status.as_u16()));
        }

        let resource_uri = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(NefError::MissingLocation)?;
        let subscription_id = subscription_id_from_location(&resource_uri)?;
        let subscription = response.json::<AsSessionWithQoSSubscription>().await.ok();

        info!(
            "Subscription created. subscriptionId {}, resource {}",
            subscription_id, resource_uri
        );
        Ok(CreatedSubscription {
            subscription_id,
            resource_uri,
            subscription,
        })
    }

    async fn delete(
        &self,
        scs_as_id: &str,
        subscription_id: &str,
        token: &AccessToken,
    ) -> Result<Option<UserPlaneNotificationData>, NefError> {
        let url = self.subscription_url(scs_as_id, subscription_id);
        debug!("DELETE {}", url);
        let response = self
            .client
            .delete(&url)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(None),
            StatusCode::OK => {
                let body = response.bytes().await?;
                if body.is_empty() {
                    return Ok(None);
                }
                match serde_json::from_slice::<UserPlaneNotificationData>(&body) {
                    Ok(data) => Ok(Some(data)),
                    Err(e) => {
                        debug!("Ignoring undecodable delete response body: {}", e);
                        Ok(None)
                    }
                }
            }
            status => {
                error!("Subscription delete at {} failed with {}", url, status);
                Err(NefError::UnexpectedStatus(status.as_u16()))
            }
        }
    }
}
