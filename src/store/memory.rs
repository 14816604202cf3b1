//! In-process store backend.

use crate::session::types::QosProfile;
use crate::store::error::StoreError;
use crate::store::types::{ProvisionedAppServerData, SessionRecord};
use crate::store::SessionStore;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{Mutex, RwLock};

#[derive(Default)]
pub struct MemoryStore {
    provisioned: RwLock<HashMap<String, ProvisionedAppServerData>>,
    sessions: RwLock<HashMap<String, SessionRecord>>,
    flow_counters: Mutex<HashMap<(String, String), u64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn provision(&self, data: ProvisionedAppServerData) {
        self.provisioned
            .write()
            .await
            .insert(data.as_ipv4_addr.clone(), data);
    }

    pub async fn with_provisioning(data: Vec<ProvisionedAppServerData>) -> Self {
        let store = Self::new();
        for doc in data {
            store.provision(doc).await;
        }
        store
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn lookup_provisioning(
        &self,
        as_ipv4_addr: &str,
    ) -> Result<ProvisionedAppServerData, StoreError> {
        self.provisioned
            .read()
            .await
            .get(as_ipv4_addr)
            .cloned()
            .ok_or_else(|| StoreError::NotProvisioned(as_ipv4_addr.to_string()))
    }

    async fn find_sessions(
        &self,
        ue_ipv4_addr: &str,
        scs_as_id: &str,
        qos: QosProfile,
    ) -> Result<Vec<SessionRecord>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .filter(|r| {
                r.ue_ipv4_addr == ue_ipv4_addr
                    && r.scs_as_id == scs_as_id
                    && r.session_info.qos == qos
            })
            .cloned()
            .collect())
    }

    async fn increment_flow_counter(
        &self,
        ue_ipv4_addr: &str,
        scs_as_id: &str,
    ) -> Result<u64, StoreError> {
        let mut counters = self.flow_counters.lock().await;
        let counter = counters
            .entry((ue_ipv4_addr.to_string(), scs_as_id.to_string()))
            .or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn put_session(
        &self,
        _ue_ipv4_addr: &str,
        session_id: &str,
        record: &SessionRecord,
    ) -> Result<u64, StoreError> {
        let previous = self
            .sessions
            .write()
            .await
            .insert(session_id.to_string(), record.clone());
        Ok(u64::from(previous.is_some()))
    }

    async fn get_session(&self, session_id: &str) -> Result<SessionRecord, StoreError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(session_id.to_string()))
    }

    async fn delete_session(&self, session_id: &str) -> Result<u64, StoreError> {
        let removed = self.sessions.write().await.remove(session_id);
        Ok(u64::from(removed.is_some()))
    }
}
