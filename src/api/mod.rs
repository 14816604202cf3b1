//! HTTP surface of the QoD API, mounted under [`BASE_PATH`].

pub mod handlers;

use crate::auth::{require_bearer, InboundValidator, ScopedClaims};
use crate::session::SessionEngine;
use axum::{
    extract::{ConnectInfo, Request},
    http::{header::HeaderName, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub const BASE_PATH: &str = "/qod/v0";

const CORS_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Routes with token validation, CORS and access logging applied.
pub fn router(engine: Arc<SessionEngine>, validator: Arc<InboundValidator>) -> Router {
    let sessions = Router::new()
        .route("/", get(handlers::index))
        .route("/sessions", axum::routing::post(handlers::create_session))
        .route(
            "/sessions/:session_id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .with_state(engine)
        .layer(middleware::from_fn_with_state(validator, require_bearer));

    Router::new()
        .nest(BASE_PATH, sessions)
        .layer(cors_layer())
        .layer(middleware::from_fn(access_log))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            HeaderName::from_static("authorization"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("content-length"),
            HeaderName::from_static("content-type"),
            HeaderName::from_static("user-agent"),
            HeaderName::from_static("referrer"),
            HeaderName::from_static("host"),
            HeaderName::from_static("token"),
            HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers([HeaderName::from_static("content-length")])
        .allow_credentials(true)
        .allow_origin(AllowOrigin::mirror_request())
        .max_age(CORS_MAX_AGE)
}

/// One line per request: `| status | client ip | method | path | subject |`.
async fn access_log(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .or_else(|| {
            request
                .headers()
                .get("x-forwarded-for")
                .and_then(|v: &HeaderValue| v.to_str().ok())
                .map(|v| v.split(',').next().unwrap_or(v).trim().to_string())
        })
        .unwrap_or_else(|| "-".to_string());

    let response = next.run(request).await;
    let subject = response
        .extensions()
        .get::<ScopedClaims>()
        .and_then(|claims| claims.sub.as_deref())
        .unwrap_or("-");
    info!(
        "| {} | {} | {} | {} | {} |",
        response.status().as_u16(),
        client_ip,
        method,
        path,
        subject
    );
    response
}
