//! Session lifecycle: create, fetch and delete.
//!
//! Create runs validate, resolve, conflict check, flow allocation, token
//! issuance, NEF create and persistence, in that order. Any step's failure
//! aborts the remaining ones and nothing already done downstream is undone.
//! Delete removes the NEF subscription first and the local record after.

use crate::auth::TokenIssuer;
use crate::error::ErrorInfo;
use crate::nef::{AsSessionWithQoSSubscription, FlowInfo, SubscriptionApi};
use crate::session::conflict::check_conflicts;
use crate::session::flow::allocate_flow_id;
use crate::session::provisioning::resolve;
use crate::session::types::{CreateSession, SessionInfo};
use crate::session::validator::validate_session_request;
use crate::store::{SessionRecord, SessionStore, StoreError};
use chrono::Utc;
use log::{error, info, warn};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Callback URL handed to the NEF; `None` when notifications are not served.
    pub notification_url: Option<String>,
    pub supported_features: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            notification_url: None,
            supported_features: "0".to_string(),
        }
    }
}

pub struct SessionEngine {
    store: Arc<dyn SessionStore>,
    nef: Arc<dyn SubscriptionApi>,
    issuer: Arc<dyn TokenIssuer>,
    options: EngineOptions,
}

impl SessionEngine {
    pub fn new(
        store: Arc<dyn SessionStore>,
        nef: Arc<dyn SubscriptionApi>,
        issuer: Arc<dyn TokenIssuer>,
        options: EngineOptions,
    ) -> Self {
        Self {
            store,
            nef,
            issuer,
            options,
        }
    }

    pub async fn create_session(&self, request: CreateSession) -> Result<SessionInfo, ErrorInfo> {
        let request = validate_session_request(request)?;
        let resolved = resolve(self.store.as_ref(), &request).await?;
        let ue_addr = request.ue_addr.to_string();

        check_conflicts(
            self.store.as_ref(),
            &ue_addr,
            &resolved.scs_as_id,
            request.qos,
            &resolved.flow_descriptions,
        )
        .await?;

        let flow_id =
            allocate_flow_id(self.store.as_ref(), &ue_addr, &resolved.scs_as_id).await?;

        let token = self.issuer.issue().await.map_err(|e| {
            error!("Failed to obtain NEF access token: {}", e);
            ErrorInfo::internal(format!("failed to obtain access token. err {}", e))
        })?;

        let payload = AsSessionWithQoSSubscription {
            ue_ipv4_addr: Some(ue_addr.clone()),
            flow_info: Some(vec![FlowInfo {
                flow_id,
                flow_descriptions: Some(resolved.flow_descriptions.clone()),
            }]),
            qos_reference: Some(resolved.qos_reference.clone()),
            supported_features: Some(self.options.supported_features.clone()),
            notification_destination: self.options.notification_url.clone(),
            ..Default::default()
        };

        let created = self
            .nef
            .create(&resolved.scs_as_id, &payload, &token)
            .await
            .map_err(|e| {
                error!("NEF subscription create failed: {}", e);
                ErrorInfo::internal(format!(
                    "nef assessionwithqos subscription create failed. err {}",
                    e
                ))
            })?;

        let session_id = Uuid::new_v4().to_string();
        let session_info =
            SessionInfo::from_request(session_id.clone(), &request, Utc::now().timestamp());

        let record = SessionRecord {
            ue_ipv4_addr: ue_addr.clone(),
            scs_as_id: resolved.scs_as_id,
            session_id: session_id.clone(),
            nef_subscription_id: created.subscription_id.clone(),
            nef_subscription_resource: created.resource_uri.clone(),
            qos_reference: resolved.qos_reference,
            flow_id,
            flow_descriptions: resolved.flow_descriptions,
            session_req: request.original,
            session_info: session_info.clone(),
        };

        // The NEF subscription exists from here on; a failed write is reported
        // in the log only.
        match self.store.put_session(&ue_addr, &session_id, &record).await {
            Ok(0) => {}
            Ok(match_count) => warn!(
                "Session write for ueIpv4Addr {}, sessionId {} replaced {} existing records",
                ue_addr, session_id, match_count
            ),
            Err(e) => error!(
                "Failed to persist session. ueIpv4Addr {}, sessionId {}, err {}",
                ue_addr, session_id, e
            ),
        }

        info!(
            "Session created. subscriptionId {}, self {}, sessionId {}",
            created.subscription_id,
            created.self_link(),
            session_id
        );
        Ok(session_info)
    }

    pub async fn get_session(&self, session_id: &str) -> Result<SessionInfo, ErrorInfo> {
        self.load_record(session_id)
            .await
            .map(|record| record.session_info)
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<(), ErrorInfo> {
        let record = self.load_record(session_id).await?;
        info!(
            "Deleting session {}. subscriptionId {}, scsAsId {}",
            session_id, record.nef_subscription_id, record.scs_as_id
        );

        let token = self.issuer.issue().await.map_err(|e| {
            error!("Failed to obtain NEF access token: {}", e);
            ErrorInfo::internal(format!("failed to obtain access token. err {}", e))
        })?;

        let notification = self
            .nef
            .delete(&record.scs_as_id, &record.nef_subscription_id, &token)
            .await
            .map_err(|e| {
                error!("NEF subscription delete failed: {}", e);
                ErrorInfo::internal(format!(
                    "nef assessionwithqos subscription delete failed. err {}",
                    e
                ))
            })?;

        if let Some(data) = notification.filter(|d| !d.transaction.is_empty()) {
            warn!(
                "Notification event handling on delete is not implemented. transaction {}",
                data.transaction
            );
        }

        match self.store.delete_session(session_id).await {
            Ok(1) => Ok(()),
            Ok(match_count) => {
                error!(
                    "Failed to delete sessionId {} from store. matchCount {}",
                    session_id, match_count
                );
                Err(ErrorInfo::internal(format!(
                    "deleteSession failed to delete db entry. matchCount {}",
                    match_count
                )))
            }
            Err(e) => {
                error!("Failed to delete sessionId {} from store: {}", session_id, e);
                Err(ErrorInfo::internal(format!(
                    "deleteSession failed to delete db entry. err {}",
                    e
                )))
            }
        }
    }

    async fn load_record(&self, session_id: &str) -> Result<SessionRecord, ErrorInfo> {
        self.store.get_session(session_id).await.map_err(|e| match e {
            StoreError::NotFound(_) => {
                error!("sessionId {} not found", session_id);
                ErrorInfo::not_found(format!("sessionId {} does not exist", session_id))
            }
            other => {
                error!("Failed to read sessionId {}: {}", session_id, other);
                ErrorInfo::internal(format!("failed to read sessionId {}", session_id))
            }
        })
    }
}
