//! Bearer token validation for inbound requests.

use crate::auth::error::AuthError;
use crate::auth::jwks::JwksCache;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::{Deserialize, Serialize};

/// Claims of a validated access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedClaims {
    pub iss: String,
    #[serde(default)]
    pub sub: Option<String>,
    pub exp: u64,
    /// Space separated scope tokens.
    pub scope: String,
}

impl ScopedClaims {
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.split(' ')
    }
}

pub struct InboundValidator {
    jwks: JwksCache,
    issuer: String,
    audience: Vec<String>,
    authorized_scope: Vec<String>,
}

impl InboundValidator {
    pub fn new(
        jwks: JwksCache,
        issuer: impl Into<String>,
        audience: Vec<String>,
        authorized_scope: Vec<String>,
    ) -> Self {
        Self {
            jwks,
            issuer: issuer.into(),
            audience,
            authorized_scope,
        }
    }

    /// Validates `token` for a request using HTTP `method`.
    ///
    /// Checks, in order: RS256 signature against the cached key set, issuer,
    /// audience and expiry, every scope token being authorized, and the
    /// method name being one of the scope tokens.
    pub async fn validate(&self, token: &str, method: &str) -> Result<ScopedClaims, AuthError> {
        let header = decode_header(token)?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::UnsupportedAlgorithm(header.alg));
        }
        let key = self.jwks.decoding_key(header.kid.as_deref()).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&self.audience);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        let claims = decode::<ScopedClaims>(token, &key, &validation)?.claims;
        check_scope_authorized(&claims, &self.authorized_scope)?;
        check_method_in_scope(&claims, method)?;
        Ok(claims)
    }
}

fn check_scope_authorized(claims: &ScopedClaims, authorized: &[String]) -> Result<(), AuthError> {
    match claims
        .scopes()
        .find(|scope| !authorized.iter().any(|a| a == scope))
    {
        Some(scope) => Err(AuthError::ScopeNotAllowed(scope.to_string())),
        None => Ok(()),
    }
}

/// Ties the token to the verb being exercised.
fn check_method_in_scope(claims: &ScopedClaims, method: &str) -> Result<(), AuthError> {
    if claims.scopes().any(|scope| scope == method) {
        Ok(())
    } else {
        Err(AuthError::MethodNotInScope(method.to_string()))
    }
}
