//! Redis store backend.

use crate::session::types::QosProfile;
use crate::store::error::StoreError;
use crate::store::types::{ProvisionedAppServerData, SessionRecord};
use crate::store::SessionStore;
use async_trait::async_trait;
use log::{debug, info, warn};
use redis::{AsyncCommands, Client as RedisClient};
use std::sync::Arc;

const KEY_PREFIX: &str = "qod";

pub struct RedisStore {
    redis_client: Arc<RedisClient>,
}

impl RedisStore {
    pub fn new(redis_client: Arc<RedisClient>) -> Self {
        Self { redis_client }
    }

    pub fn open(url: &str) -> Result<Self, StoreError> {
        let client = RedisClient::open(url)?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Writes (or replaces) the provisioning document for one application server.
    pub async fn provision(&self, data: &ProvisionedAppServerData) -> Result<(), StoreError> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let json = serde_json::to_string(data)?;
        let _: () = conn
            .set(self.provisioned_key(&data.as_ipv4_addr), json)
            .await?;
        info!(
            "Provisioned asIpv4Addr {} as scsAsId {}",
            data.as_ipv4_addr, data.scs_as_id
        );
        Ok(())
    }

    fn provisioned_key(&self, as_ipv4_addr: &str) -> String {
        format!("{}:provisioned:{}", KEY_PREFIX, as_ipv4_addr)
    }

    fn session_key(&self, session_id: &str) -> String {
        format!("{}:session:{}", KEY_PREFIX, session_id)
    }

    fn ue_sessions_key(&self, ue_ipv4_addr: &str, scs_as_id: &str, qos: QosProfile) -> String {
        format!(
            "{}:ue:{}:{}:{}:sessions",
            KEY_PREFIX, ue_ipv4_addr, scs_as_id, qos
        )
    }

    fn flow_counter_key(&self, ue_ipv4_addr: &str, scs_as_id: &str) -> String {
        format!("{}:flow:{}:{}", KEY_PREFIX, ue_ipv4_addr, scs_as_id)
    }
}

#[async_trait]
impl SessionStore for RedisStore {
    async fn lookup_provisioning(
        &self,
        as_ipv4_addr: &str,
    ) -> Result<ProvisionedAppServerData, StoreError> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let json: Option<String> = conn.get(self.provisioned_key(as_ipv4_addr)).await?;
        match json {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Err(StoreError::NotProvisioned(as_ipv4_addr.to_string())),
        }
    }

    async fn find_sessions(
        &self,
        ue_ipv4_addr: &str,
        scs_as_id: &str,
        qos: QosProfile,
    ) -> Result<Vec<SessionRecord>, StoreError> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let index_key = self.ue_sessions_key(ue_ipv4_addr, scs_as_id, qos);
        let session_ids: Vec<String> = conn.smembers(&index_key).await?;

        let mut records = Vec::with_capacity(session_ids.len());
        for session_id in session_ids {
            let json: Option<String> = conn.get(self.session_key(&session_id)).await?;
            match json {
                Some(json) => records.push(serde_json::from_str(&json)?),
                None => debug!("Stale index entry {} in {}", session_id, index_key),
            }
        }
        Ok(records)
    }

    async fn increment_flow_counter(
        &self,
        ue_ipv4_addr: &str,
        scs_as_id: &str,
    ) -> Result<u64, StoreError> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let counter: u64 = conn
            .incr(self.flow_counter_key(ue_ipv4_addr, scs_as_id), 1u64)
            .await?;
        Ok(counter)
    }

    async fn put_session(
        &self,
        ue_ipv4_addr: &str,
        session_id: &str,
        record: &SessionRecord,
    ) -> Result<u64, StoreError> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let session_key = self.session_key(session_id);
        let index_key = self.ue_sessions_key(
            ue_ipv4_addr,
            &record.scs_as_id,
            record.session_info.qos,
        );
        let json = serde_json::to_string(record)?;

        let (existed,): (u64,) = redis::pipe()
            .atomic()
            .exists(&session_key)
            .set(&session_key, json)
            .ignore()
            .sadd(&index_key, session_id)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(existed)
    }

    async fn get_session(&self, session_id: &str) -> Result<SessionRecord, StoreError> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let json: Option<String> = conn.get(self.session_key(session_id)).await?;
        match json {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Err(StoreError::NotFound(session_id.to_string())),
        }
    }

    async fn delete_session(&self, session_id: &str) -> Result<u64, StoreError> {
        let record = match self.get_session(session_id).await {
            Ok(record) => record,
            Err(StoreError::NotFound(_)) => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let index_key = self.ue_sessions_key(
            &record.ue_ipv4_addr,
            &record.scs_as_id,
            record.session_info.qos,
        );
        let (removed,): (u64,) = redis::pipe()
            .atomic()
            .del(self.session_key(session_id))
            .srem(&index_key, session_id)
            .ignore()
            .query_async(&mut conn)
            .await?;
        if removed == 0 {
            warn!("Session {} vanished before delete", session_id);
        }
        Ok(removed)
    }
}
