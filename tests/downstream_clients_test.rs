mod common;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use common::key_set;
use qodservice::auth::{
    AccessToken, AuthError, ClientCredentialsIssuer, HttpKeySetFetcher, KeySetFetcher,
    TokenIssuer,
};
use qodservice::nef::{
    AsSessionWithQoSSubscription, FlowInfo, NefClient, NefError, SubscriptionApi,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

const SERVICE: &str = "/3gpp-as-session-with-qos/v1";

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn token() -> AccessToken {
    AccessToken {
        access_token: "nef-token".to_string(),
        token_type: "Bearer".to_string(),
        expires_in: None,
        scope: None,
    }
}

fn payload() -> AsSessionWithQoSSubscription {
    AsSessionWithQoSSubscription {
        ue_ipv4_addr: Some("10.0.0.1".to_string()),
        flow_info: Some(vec![FlowInfo {
            flow_id: 65537,
            flow_descriptions: Some(vec![
                "permit in any from 10.0.0.1  to 10.10.1.100 ".to_string(),
                "permit out any from 10.10.1.100  to 10.0.0.1 ".to_string(),
            ]),
        }]),
        qos_reference: Some("qos-66".to_string()),
        supported_features: Some("0".to_string()),
        ..Default::default()
    }
}

#[derive(Default)]
struct NefState {
    received: Mutex<Vec<(Option<String>, Value)>>,
}

async fn nef_create(
    State(state): State<Arc<NefState>>,
    Path(scs_as_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.received.lock().unwrap().push((auth, body.clone()));

    match scs_as_id.as_str() {
        "legacy" => (StatusCode::OK, Json(body)).into_response(),
        "no-location" => (StatusCode::CREATED, Json(body)).into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            (StatusCode::CREATED, Json(body)).into_response()
        }
        _ => {
            let mut echoed = body;
            let location = format!("{}/{}/subscriptions/sub-42", SERVICE, scs_as_id);
            echoed["self"] = json!(location.clone());
            (
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(echoed),
            )
                .into_response()
        }
    }
}

async fn nef_delete(Path((_scs_as_id, subscription_id)): Path<(String, String)>) -> Response {
    match subscription_id.as_str() {
        "gone" => StatusCode::NOT_FOUND.into_response(),
        "with-notification" => (
            StatusCode::OK,
            Json(json!({
                "transaction": "http://nef/subscriptions/with-notification",
                "eventReports": [{"event": "SESSION_TERMINATION"}]
            })),
        )
            .into_response(),
        _ => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn nef_server() -> (String, Arc<NefState>) {
    let state = Arc::new(NefState::default());
    let app = Router::new()
        .route(
            &format!("{}/:scs_as_id/subscriptions", SERVICE),
            post(nef_create),
        )
        .route(
            &format!("{}/:scs_as_id/subscriptions/:subscription_id", SERVICE),
            axum::routing::delete(nef_delete),
        )
        .with_state(state.clone());
    let base = spawn(app).await;
    (format!("{}{}", base, SERVICE), state)
}

#[tokio::test]
async fn test_nef_create() {
    let (api_root, state) = nef_server().await;
    let client = NefClient::new(api_root, Duration::from_secs(5)).unwrap();

    let created = client
        .create("spryfoxnetworks", &payload(), &token())
        .await
        .unwrap();
    assert_eq!(created.subscription_id, "sub-42");
    assert!(created.resource_uri.ends_with("/spryfoxnetworks/subscriptions/sub-42"));
    assert_eq!(
        created.subscription.and_then(|s| s.self_link).as_deref(),
        Some("/3gpp-as-session-with-qos/v1/spryfoxnetworks/subscriptions/sub-42")
    );

    let received = state.received.lock().unwrap();
    let (auth, body) = &received[0];
    assert_eq!(auth.as_deref(), Some("Bearer nef-token"));
    assert_eq!(body["ueIpv4Addr"], "10.0.0.1");
    assert_eq!(body["flowInfo"][0]["flowId"], 65537);
    assert_eq!(body["qosReference"], "qos-66");
    assert!(body.get("notificationDestination").is_none());
}

#[tokio::test]
async fn test_nef_create_requires_created_status() {
    let (api_root, _) = nef_server().await;
    let client = NefClient::new(api_root, Duration::from_secs(5)).unwrap();
    assert!(matches!(
        client.create("legacy", &payload(), &token()).await,
        Err(NefError::UnexpectedStatus(200))
    ));
}

#[tokio::test]
async fn test_nef_create_requires_location() {
    let (api_root, _) = nef_server().await;
    let client = NefClient::new(api_root, Duration::from_secs(5)).unwrap();
    assert!(matches!(
        client.create("no-location", &payload(), &token()).await,
        Err(NefError::MissingLocation)
    ));
}

#[tokio::test]
async fn test_nef_timeout() {
    let (api_root, _) = nef_server().await;
    let client = NefClient::new(api_root, Duration::from_millis(200)).unwrap();
    assert!(matches!(
        client.create("slow", &payload(), &token()).await,
        Err(NefError::Transport(_))
    ));
}

#[tokio::test]
async fn test_nef_delete() {
    let (api_root, _) = nef_server().await;
    let client = NefClient::new(api_root, Duration::from_secs(5)).unwrap();

    assert_eq!(
        client
            .delete("spryfoxnetworks", "sub-42", &token())
            .await
            .unwrap(),
        None
    );

    let notification = client
        .delete("spryfoxnetworks", "with-notification", &token())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        notification.transaction,
        "http://nef/subscriptions/with-notification"
    );

    assert!(matches!(
        client.delete("spryfoxnetworks", "gone", &token()).await,
        Err(NefError::UnexpectedStatus(404))
    ));
}

#[tokio::test]
async fn test_nef_unreachable() {
    let client = NefClient::new(
        format!("http://127.0.0.1:9{}", SERVICE),
        Duration::from_secs(1),
    )
    .unwrap();
    assert!(matches!(
        client.create("spryfoxnetworks", &payload(), &token()).await,
        Err(NefError::Transport(_))
    ));
}

async fn token_endpoint(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Response {
    let expected = format!("Basic {}", STANDARD.encode("qod:secret"));
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str());
    if !authorized || form.get("grant_type").map(String::as_str) != Some("client_credentials") {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({
        "access_token": "issued-token",
        "token_type": "Bearer",
        "expires_in": 300,
        "scope": "nef"
    }))
    .into_response()
}

#[tokio::test]
async fn test_client_credentials_issue() {
    let base = spawn(Router::new().route("/token", post(token_endpoint))).await;
    let issuer = ClientCredentialsIssuer::new(
        reqwest::Client::new(),
        format!("{}/token", base),
        "qod",
        "secret",
    );

    let token = issuer.issue().await.unwrap();
    assert_eq!(token.access_token, "issued-token");
    assert_eq!(token.expires_in, Some(300));
}

#[tokio::test]
async fn test_client_credentials_rejected() {
    let base = spawn(Router::new().route("/token", post(token_endpoint))).await;
    let issuer = ClientCredentialsIssuer::new(
        reqwest::Client::new(),
        format!("{}/token", base),
        "qod",
        "wrong",
    );
    assert!(matches!(
        issuer.issue().await,
        Err(AuthError::TokenRequest { status: 401 })
    ));
}

#[tokio::test]
async fn test_key_set_discovery() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let jwks_uri = format!("{}/certs", base);
    let keys = serde_json::to_value(key_set()).unwrap();

    let app = Router::new()
        .route(
            "/realm/.well-known/openid-configuration",
            get(move || async move { Json(json!({ "issuer": "x", "jwks_uri": jwks_uri })) }),
        )
        .route("/certs", get(move || async move { Json(keys) }));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let fetcher = HttpKeySetFetcher::new(reqwest::Client::new(), format!("{}/realm", base));
    let fetched = fetcher.fetch().await.unwrap();
    assert_eq!(fetched.keys.len(), 1);
    assert!(fetched.find(common::KID).is_some());
}
