//! Trust boundary.
//!
//! Inbound: every request must carry an RS256 bearer token signed by the
//! configured authorization server, with matching issuer and audience, a
//! scope made only of authorized tokens, and a scope naming the HTTP method.
//!
//! Outbound: each call to the NEF is made under a freshly issued
//! client-credentials token.

pub mod error;
pub mod inbound;
pub mod jwks;
pub mod middleware;
pub mod outbound;

pub use error::AuthError;
pub use inbound::{InboundValidator, ScopedClaims};
pub use jwks::{HttpKeySetFetcher, JwksCache, KeySetFetcher};
pub use middleware::require_bearer;
pub use outbound::{AccessToken, ClientCredentialsIssuer, TokenIssuer};
