//! Resolves an application server and QoS tier against provisioning data,
//! and builds the directional flow descriptions for the session.

use crate::error::ErrorInfo;
use crate::session::types::{PortsSpec, SessionRequest};
use crate::store::{SessionStore, StoreError};
use log::{debug, error};

/// What the provisioning lookup yields for a validated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSession {
    pub scs_as_id: String,
    pub qos_reference: String,
    /// Uplink then downlink description.
    pub flow_descriptions: Vec<String>,
}

pub async fn resolve(
    store: &dyn SessionStore,
    request: &SessionRequest,
) -> Result<ResolvedSession, ErrorInfo> {
    let as_addr = request.as_addr.to_string();
    let provisioned = store.lookup_provisioning(&as_addr).await.map_err(|e| match e {
        StoreError::NotProvisioned(_) => {
            error!("asIpv4Addr {} not provisioned", as_addr);
            ErrorInfo::invalid_input(format!("asIpv4Addr {} not provisioned", as_addr))
        }
        other => {
            error!("Provisioning lookup failed for asIpv4Addr {}: {}", as_addr, other);
            ErrorInfo::internal(format!(
                "provisioning lookup failed for asIpv4Addr {}",
                as_addr
            ))
        }
    })?;

    let qos_reference = provisioned
        .qos_map
        .get(request.qos.as_str())
        .cloned()
        .ok_or_else(|| {
            error!(
                "qosProfile {} not provisioned for asIpv4Addr {}",
                request.qos, as_addr
            );
            ErrorInfo::invalid_input(format!("qosProfile {} not provisioned", request.qos))
        })?;

    let flow_descriptions = flow_descriptions(
        &request.ue_addr.to_string(),
        request.ue_ports(),
        &as_addr,
        request.as_ports(),
    );
    debug!(
        "Resolved asIpv4Addr {} to scsAsId {}, qosReference {}, flowDesc {:?}",
        as_addr, provisioned.scs_as_id, qos_reference, flow_descriptions
    );

    Ok(ResolvedSession {
        scs_as_id: provisioned.scs_as_id,
        qos_reference,
        flow_descriptions,
    })
}

/// Renders ranges as `from-to` followed by single ports, comma separated.
pub fn format_ports(ports: Option<&PortsSpec>) -> String {
    let Some(ports) = ports else {
        return String::new();
    };
    let ranges = ports
        .ranges
        .iter()
        .flatten()
        .map(|r| format!("{}-{}", r.from, r.to));
    let singles = ports.ports.iter().flatten().map(|p| p.to_string());
    ranges.chain(singles).collect::<Vec<_>>().join(", ")
}

/// Builds the `permit in` / `permit out` pair for a UE and application server.
///
/// An absent port specification leaves an empty token, so the spacing of the
/// template is kept as-is.
pub fn flow_descriptions(
    ue_addr: &str,
    ue_ports: Option<&PortsSpec>,
    as_addr: &str,
    as_ports: Option<&PortsSpec>,
) -> Vec<String> {
    let ue_ports = format_ports(ue_ports);
    let as_ports = format_ports(as_ports);
    vec![
        format!(
            "permit in any from {} {} to {} {}",
            ue_addr, ue_ports, as_addr, as_ports
        ),
        format!(
            "permit out any from {} {} to {} {}",
            as_addr, as_ports, ue_addr, ue_ports
        ),
    ]
}
