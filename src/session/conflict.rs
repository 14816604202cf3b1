//! Duplicate-session detection.

use crate::error::ErrorInfo;
use crate::session::types::QosProfile;
use crate::store::SessionStore;
use log::{error, warn};

/// Rejects the candidate when an existing session for the same
/// (UE, AS, QoS) carries exactly the same ordered flow descriptions.
///
/// A failing lookup is logged and treated as "no existing sessions".
pub async fn check_conflicts(
    store: &dyn SessionStore,
    ue_ipv4_addr: &str,
    scs_as_id: &str,
    qos: QosProfile,
    candidate: &[String],
) -> Result<(), ErrorInfo> {
    let existing = match store.find_sessions(ue_ipv4_addr, scs_as_id, qos).await {
        Ok(existing) => existing,
        Err(e) => {
            warn!(
                "Failed to get existing sessions for ueIpv4Addr {}, scsAsId {}, qosProfile {}: {}",
                ue_ipv4_addr, scs_as_id, qos, e
            );
            return Ok(());
        }
    };

    if existing
        .iter()
        .any(|record| same_flow_descriptions(&record.flow_descriptions, candidate))
    {
        error!("Existing session with same flowDesc {:?} exists", candidate);
        return Err(ErrorInfo::conflict(format!(
            "existing session with same flowDesc {:?} exist",
            candidate
        )));
    }
    Ok(())
}

/// Exact, order-sensitive comparison.
pub fn same_flow_descriptions(existing: &[String], candidate: &[String]) -> bool {
    existing.len() == candidate.len() && existing.iter().zip(candidate).all(|(a, b)| a == b)
}
