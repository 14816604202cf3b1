//! Error types for the session store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("asIpv4Addr {0} not provisioned")]
    NotProvisioned(String),

    #[error("sessionId {0} does not exist")]
    NotFound(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to read provisioning file {path}: {source}")]
    ProvisioningFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
