//! Session store.
//!
//! Durable keyed storage for provisioning data, session records and the
//! per-(UE, AS) flow counter. Two backends implement [`SessionStore`]:
//! Redis for deployments and an in-process map for tests and local runs.
//!
//! The store owns every cross-request consistency guarantee the service
//! needs: the counter increment and the record write/delete are atomic here,
//! and callers hold no locks of their own.

pub mod error;
pub mod memory;
pub mod redis_store;
pub mod types;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use types::{ProvisionedAppServerData, SessionRecord};

use crate::session::types::QosProfile;
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Provisioning for an application server, or `NotProvisioned`.
    async fn lookup_provisioning(
        &self,
        as_ipv4_addr: &str,
    ) -> Result<ProvisionedAppServerData, StoreError>;

    /// All sessions sharing the given (UE, AS, QoS) triple.
    async fn find_sessions(
        &self,
        ue_ipv4_addr: &str,
        scs_as_id: &str,
        qos: QosProfile,
    ) -> Result<Vec<SessionRecord>, StoreError>;

    /// Atomically increments the flow counter and returns the new value.
    async fn increment_flow_counter(
        &self,
        ue_ipv4_addr: &str,
        scs_as_id: &str,
    ) -> Result<u64, StoreError>;

    /// Upsert. Returns the number of pre-existing records overwritten.
    async fn put_session(
        &self,
        ue_ipv4_addr: &str,
        session_id: &str,
        record: &SessionRecord,
    ) -> Result<u64, StoreError>;

    /// The stored record, or `NotFound`.
    async fn get_session(&self, session_id: &str) -> Result<SessionRecord, StoreError>;

    /// Returns the number of records removed.
    async fn delete_session(&self, session_id: &str) -> Result<u64, StoreError>;
}

/// Reads a JSON array of provisioning documents.
pub fn load_provisioning_file(
    path: impl AsRef<Path>,
) -> Result<Vec<ProvisionedAppServerData>, StoreError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| StoreError::ProvisioningFile {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}
