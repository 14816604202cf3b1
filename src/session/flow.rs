//! Flow identifier allocation.
//!
//! A flow id packs the media component number in the upper half and a
//! 16-bit per-(UE, AS) counter in the lower half (3GPP TS 24.008
//! 10.5.1.6.2). The counter wraps after 2^16 allocations, at which point
//! ids repeat.

use crate::error::ErrorInfo;
use crate::store::SessionStore;
use log::{error, warn};

/// Always one media component per session.
pub const MEDIA_COMPONENT_NUMBER: u32 = 1;

const FLOW_COUNTER_MASK: u64 = 0xFFFF;

pub fn flow_id(component_number: u32, counter: u16) -> u32 {
    (component_number << 16) | u32::from(counter)
}

/// Draws the next counter value from the store and encodes it.
pub async fn allocate_flow_id(
    store: &dyn SessionStore,
    ue_ipv4_addr: &str,
    scs_as_id: &str,
) -> Result<u32, ErrorInfo> {
    let raw = store
        .increment_flow_counter(ue_ipv4_addr, scs_as_id)
        .await
        .map_err(|e| {
            error!("Failed to get the flow counter: {}", e);
            ErrorInfo::internal(format!("failed to get the fNum. err {}", e))
        })?;

    if raw > FLOW_COUNTER_MASK {
        warn!(
            "Flow counter for ueIpv4Addr {}, scsAsId {} wrapped ({}); flow ids may repeat",
            ue_ipv4_addr, scs_as_id, raw
        );
    }
    let counter = (raw & FLOW_COUNTER_MASK) as u16;
    Ok(flow_id(MEDIA_COMPONENT_NUMBER, counter))
}
