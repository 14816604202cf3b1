//! AsSessionWithQoS resources (3GPP TS 29.122).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowInfo {
    pub flow_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_descriptions: Option<Vec<String>>,
}

/// Subscription resource sent on create and echoed back by the NEF.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsSessionWithQoSSubscription {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_features: Option<String>,
    /// Only sent when this service can receive notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_info: Option<Vec<FlowInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qos_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ue_ipv4_addr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPlaneEventReport {
    pub event: String,
}

/// Body a NEF may return on subscription delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPlaneNotificationData {
    #[serde(default)]
    pub transaction: String,
    #[serde(default)]
    pub event_reports: Vec<UserPlaneEventReport>,
}
