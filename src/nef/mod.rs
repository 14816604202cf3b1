//! Downstream adapter for the NEF AsSessionWithQoS API.

pub mod client;
pub mod types;

pub use client::{CreatedSubscription, NefClient, NefError, SubscriptionApi, DEFAULT_NEF_TIMEOUT};
pub use types::{AsSessionWithQoSSubscription, FlowInfo, UserPlaneNotificationData};
