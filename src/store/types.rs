//! Persisted documents.

use crate::session::types::{CreateSession, SessionInfo};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Static provisioning for one application server, keyed by its IPv4 address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedAppServerData {
    pub as_ipv4_addr: String,
    /// Identifier the NEF knows this application server by.
    pub scs_as_id: String,
    /// QoS tier (`QOS_E`...) to NEF QoS reference.
    pub qos_map: HashMap<String, String>,
}

/// Everything needed to answer a fetch and to tear the session down later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub ue_ipv4_addr: String,
    pub scs_as_id: String,
    pub session_id: String,
    pub nef_subscription_id: String,
    pub nef_subscription_resource: String,
    pub qos_reference: String,
    pub flow_id: u32,
    pub flow_descriptions: Vec<String>,
    pub session_req: CreateSession,
    pub session_info: SessionInfo,
}
