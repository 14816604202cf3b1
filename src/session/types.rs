//! QoD API request/response model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Default session lifetime when the client does not ask for one (24h).
pub const DEFAULT_SESSION_DURATION_SECS: i32 = 86_400;

/// QoS tier requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QosProfile {
    #[serde(rename = "QOS_E")]
    E,
    #[serde(rename = "QOS_S")]
    S,
    #[serde(rename = "QOS_M")]
    M,
    #[serde(rename = "QOS_L")]
    L,
}

impl QosProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            QosProfile::E => "QOS_E",
            QosProfile::S => "QOS_S",
            QosProfile::M => "QOS_M",
            QosProfile::L => "QOS_L",
        }
    }
}

impl fmt::Display for QosProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QosProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QOS_E" => Ok(QosProfile::E),
            "QOS_S" => Ok(QosProfile::S),
            "QOS_M" => Ok(QosProfile::M),
            "QOS_L" => Ok(QosProfile::L),
            other => Err(format!("qosProfile {} invalid", other)),
        }
    }
}

/// UE identity. Only `ipv4addr` is processed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UeId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msisdn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4addr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6addr: Option<String>,
}

/// Application server identity. Only `ipv4addr` is processed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4addr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6addr: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    pub from: i32,
    pub to: i32,
}

/// Ports and port ranges of one side of a flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortsSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranges: Option<Vec<PortRange>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<i32>>,
}

/// Body of `POST /sessions`.
///
/// `qos` is kept as the raw string so that an unknown tier reaches the
/// validator and is reported as `INVALID_INPUT` instead of a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSession {
    #[serde(default)]
    pub ue_id: UeId,
    #[serde(default)]
    pub as_id: AsId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ue_ports: Option<PortsSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_ports: Option<PortsSpec>,
    #[serde(default)]
    pub qos: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_auth_token: Option<String>,
}

/// A `CreateSession` that passed validation.
///
/// Holds the parsed addresses and tier next to the untouched original body,
/// which is what gets echoed back and persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    pub ue_addr: Ipv4Addr,
    pub as_addr: Ipv4Addr,
    pub qos: QosProfile,
    pub duration: i32,
    pub original: CreateSession,
}

impl SessionRequest {
    pub fn ue_ports(&self) -> Option<&PortsSpec> {
        self.original.ue_ports.as_ref()
    }

    pub fn as_ports(&self) -> Option<&PortsSpec> {
        self.original.as_ports.as_ref()
    }
}

/// Session as returned to QoD clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: String,
    pub duration: i32,
    pub started_at: i64,
    pub expires_at: i64,
    pub ue_id: UeId,
    pub as_id: AsId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ue_ports: Option<PortsSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_ports: Option<PortsSpec>,
    pub qos: QosProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_auth_token: Option<String>,
}

impl SessionInfo {
    /// Builds the client-facing view of a freshly created session.
    pub fn from_request(id: String, request: &SessionRequest, started_at: i64) -> Self {
        let original = &request.original;
        Self {
            id,
            duration: request.duration,
            started_at,
            expires_at: started_at + i64::from(request.duration),
            ue_id: original.ue_id.clone(),
            as_id: original.as_id.clone(),
            ue_ports: original.ue_ports.clone(),
            as_ports: original.as_ports.clone(),
            qos: request.qos,
            notification_uri: original.notification_uri.clone(),
            notification_auth_token: original.notification_auth_token.clone(),
        }
    }
}
