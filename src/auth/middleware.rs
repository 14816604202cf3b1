//! axum layer applying inbound token validation to every route.

use crate::auth::error::AuthError;
use crate::auth::inbound::InboundValidator;
use crate::error::ErrorInfo;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::warn;
use std::sync::Arc;

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Rejects the request with 401 unless it carries a valid bearer token whose
/// scope covers the request method. Validated claims are put in the request
/// extensions and copied onto the response for the access log.
pub async fn require_bearer(
    State(validator): State<Arc<InboundValidator>>,
    mut request: Request,
    next: Next,
) -> Response {
    let result = match bearer_token(request.headers()) {
        Some(token) => validator.validate(&token, request.method().as_str()).await,
        None => Err(AuthError::MissingToken),
    };

    match result {
        Ok(claims) => {
            request.extensions_mut().insert(claims.clone());
            let mut response = next.run(request).await;
            response.extensions_mut().insert(claims);
            response
        }
        Err(e) => {
            warn!(
                "Rejected {} {}: {}",
                request.method(),
                request.uri().path(),
                e
            );
            ErrorInfo::unauthorized("invalid token").into_response()
        }
    }
}
