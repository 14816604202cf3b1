//! Fakes and fixtures shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use qodservice::auth::{AccessToken, AuthError, KeySetFetcher, TokenIssuer};
use qodservice::nef::{
    AsSessionWithQoSSubscription, CreatedSubscription, NefError, SubscriptionApi,
    UserPlaneNotificationData,
};
use qodservice::session::types::{AsId, CreateSession, PortsSpec, QosProfile, UeId};
use qodservice::store::{
    MemoryStore, ProvisionedAppServerData, SessionRecord, SessionStore, StoreError,
};
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};

pub const AS_ADDR: &str = "10.10.1.100";
pub const SCS_AS_ID: &str = "spryfoxnetworks";
pub const ISSUER: &str = "http://oauthserver:8080/realms/sfn.nef";
pub const AUDIENCE: &str = "qod-api";
pub const KID: &str = "qod-test-key";

pub fn provisioning() -> ProvisionedAppServerData {
    ProvisionedAppServerData {
        as_ipv4_addr: AS_ADDR.to_string(),
        scs_as_id: SCS_AS_ID.to_string(),
        qos_map: HashMap::from([
            ("QOS_E".to_string(), "qos-66".to_string()),
            ("QOS_S".to_string(), "qos-77".to_string()),
            ("QOS_M".to_string(), "qos-88".to_string()),
            ("QOS_L".to_string(), "qos-99".to_string()),
        ]),
    }
}

pub fn create_request(ue: &str, as_addr: &str, qos: QosProfile) -> CreateSession {
    CreateSession {
        ue_id: UeId {
            ipv4addr: Some(ue.to_string()),
            ..Default::default()
        },
        as_id: AsId {
            ipv4addr: Some(as_addr.to_string()),
            ..Default::default()
        },
        ue_ports: Some(PortsSpec {
            ranges: None,
            ports: Some(vec![5010]),
        }),
        qos: qos.as_str().to_string(),
        ..Default::default()
    }
}

/// Memory store that counts every call and can be told to fail some of them.
#[derive(Default)]
pub struct InstrumentedStore {
    pub inner: MemoryStore,
    pub calls: AtomicUsize,
    pub fail_find: AtomicBool,
    pub fail_increment: AtomicBool,
    pub fail_put: AtomicBool,
}

impl InstrumentedStore {
    pub async fn provisioned() -> Self {
        let store = Self::default();
        store.inner.provision(provisioning()).await;
        store
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn unavailable() -> StoreError {
        StoreError::Serialization(serde_json::from_str::<u8>("unavailable").unwrap_err())
    }
}

#[async_trait]
impl SessionStore for InstrumentedStore {
    async fn lookup_provisioning(
        &self,
        as_ipv4_addr: &str,
    ) -> Result<ProvisionedAppServerData, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup_provisioning(as_ipv4_addr).await
    }

    async fn find_sessions(
        &self,
        ue_ipv4_addr: &str,
        scs_as_id: &str,
        qos: QosProfile,
    ) -> Result<Vec<SessionRecord>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_find.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.find_sessions(ue_ipv4_addr, scs_as_id, qos).await
    }

    async fn increment_flow_counter(
        &self,
        ue_ipv4_addr: &str,
        scs_as_id: &str,
    ) -> Result<u64, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_increment.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.increment_flow_counter(ue_ipv4_addr, scs_as_id).await
    }

    async fn put_session(
        &self,
        ue_ipv4_addr: &str,
        session_id: &str,
        record: &SessionRecord,
    ) -> Result<u64, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.put_session(ue_ipv4_addr, session_id, record).await
    }

    async fn get_session(&self, session_id: &str) -> Result<SessionRecord, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_session(session_id).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<u64, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_session(session_id).await
    }
}

#[derive(Debug, Clone)]
pub struct CreateCall {
    pub scs_as_id: String,
    pub payload: AsSessionWithQoSSubscription,
    pub token: String,
}

/// Subscription API fake recording every call.
#[derive(Default)]
pub struct RecordingNef {
    pub creates: Mutex<Vec<CreateCall>>,
    pub deletes: Mutex<Vec<(String, String)>>,
    pub fail_create: AtomicBool,
    pub fail_delete: AtomicBool,
    pub delete_notification: Mutex<Option<UserPlaneNotificationData>>,
    next_id: AtomicUsize,
}

impl RecordingNef {
    pub fn create_count(&self) -> usize {
        self.creates.lock().unwrap().len()
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.lock().unwrap().len()
    }

    pub fn flow_ids(&self) -> Vec<u32> {
        self.creates
            .lock()
            .unwrap()
            .iter()
            .flat_map(|c| c.payload.flow_info.clone().unwrap_or_default())
            .map(|f| f.flow_id)
            .collect()
    }
}

#[async_trait]
impl SubscriptionApi for RecordingNef {
    async fn create(
        &self,
        scs_as_id: &str,
        payload: &AsSessionWithQoSSubscription,
        token: &AccessToken,
    ) -> Result<CreatedSubscription, NefError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(NefError::UnexpectedStatus(500));
        }
        self.creates.lock().unwrap().push(CreateCall {
            scs_as_id: scs_as_id.to_string(),
            payload: payload.clone(),
            token: token.access_token.clone(),
        });
        let id = format!("sub-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        Ok(CreatedSubscription {
            resource_uri: format!(
                "http://nef/3gpp-as-session-with-qos/v1/{}/subscriptions/{}",
                scs_as_id, id
            ),
            subscription_id: id,
            subscription: None,
        })
    }

    async fn delete(
        &self,
        scs_as_id: &str,
        subscription_id: &str,
        _token: &AccessToken,
    ) -> Result<Option<UserPlaneNotificationData>, NefError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(NefError::UnexpectedStatus(404));
        }
        self.deletes
            .lock()
            .unwrap()
            .push((scs_as_id.to_string(), subscription_id.to_string()));
        Ok(self.delete_notification.lock().unwrap().clone())
    }
}

/// Issues numbered tokens, or fails when told to.
#[derive(Default)]
pub struct CountingIssuer {
    pub issued: AtomicUsize,
    pub fail: AtomicBool,
}

impl CountingIssuer {
    pub fn issued_count(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenIssuer for CountingIssuer {
    async fn issue(&self) -> Result<AccessToken, AuthError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AuthError::TokenRequest { status: 401 });
        }
        let n = self.issued.fetch_add(1, Ordering::SeqCst);
        Ok(AccessToken {
            access_token: format!("nef-token-{}", n),
            token_type: "Bearer".to_string(),
            expires_in: Some(300),
            scope: None,
        })
    }
}

/// RSA key used to sign inbound test tokens, generated once per test binary.
pub fn signing_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut rand_core::OsRng, 2048).unwrap())
}

pub fn key_set_for(key: &RsaPrivateKey, kid: &str) -> JwkSet {
    let public = key.to_public_key();
    serde_json::from_value(json!({
        "keys": [{
            "kty": "RSA",
            "kid": kid,
            "use": "sig",
            "alg": "RS256",
            "n": URL_SAFE_NO_PAD.encode(public.n().to_bytes_be()),
            "e": URL_SAFE_NO_PAD.encode(public.e().to_bytes_be()),
        }]
    }))
    .unwrap()
}

pub fn key_set() -> JwkSet {
    key_set_for(signing_key(), KID)
}

/// Key set handed out without any network access.
pub struct StaticKeySet(pub JwkSet);

#[async_trait]
impl KeySetFetcher for StaticKeySet {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        Ok(self.0.clone())
    }
}

pub fn now() -> u64 {
    chrono::Utc::now().timestamp() as u64
}

pub fn sign_claims(key: &RsaPrivateKey, kid: &str, claims: serde_json::Value) -> String {
    let pem = key.to_pkcs1_pem(LineEnding::LF).unwrap();
    let encoding_key = EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap();
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    encode(&header, &claims, &encoding_key).unwrap()
}

/// A valid token carrying `scope`.
pub fn token_with_scope(scope: &str) -> String {
    sign_claims(
        signing_key(),
        KID,
        json!({
            "iss": ISSUER,
            "aud": AUDIENCE,
            "sub": "qod-client",
            "exp": now() + 600,
            "scope": scope,
        }),
    )
}
