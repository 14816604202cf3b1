//! Error types for both directions of the trust boundary.

use jsonwebtoken::Algorithm;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Unsupported signing algorithm {0:?}")]
    UnsupportedAlgorithm(Algorithm),

    #[error("No signing key found for kid {0:?}")]
    UnknownKey(Option<String>),

    #[error("Token rejected: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("scope {0} is not allowed")]
    ScopeNotAllowed(String),

    #[error("scope does not cover method {0}")]
    MethodNotInScope(String),

    #[error("Failed to fetch key set: {0}")]
    KeySetFetch(String),

    #[error("Token endpoint answered {status}")]
    TokenRequest { status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
