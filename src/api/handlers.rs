use crate::error::ErrorInfo;
use crate::session::{CreateSession, SessionEngine};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, info};
use std::sync::Arc;

pub async fn index() -> &'static str {
    "Hello World!"
}

pub async fn create_session(
    State(engine): State<Arc<SessionEngine>>,
    body: Result<Json<CreateSession>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            error!("Failed to decode CreateSession body: {}", rejection.body_text());
            return ErrorInfo::invalid_input(rejection.body_text()).into_response();
        }
    };

    match engine.create_session(request).await {
        Ok(session) => (StatusCode::CREATED, Json(session)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_session(
    State(engine): State<Arc<SessionEngine>>,
    Path(session_id): Path<String>,
) -> Response {
    match engine.get_session(&session_id).await {
        Ok(session) => Json(session).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_session(
    State(engine): State<Arc<SessionEngine>>,
    Path(session_id): Path<String>,
) -> Response {
    match engine.delete_session(&session_id).await {
        Ok(()) => {
            info!("Session {} deleted", session_id);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => e.into_response(),
    }
}
