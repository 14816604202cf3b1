use log::{error, info, warn};
use qodservice::api;
use qodservice::auth::{ClientCredentialsIssuer, HttpKeySetFetcher, InboundValidator, JwksCache};
use qodservice::config::{Scheme, Settings, StoreBackend};
use qodservice::credentials;
use qodservice::nef::NefClient;
use qodservice::server;
use qodservice::session::{EngineOptions, SessionEngine};
use qodservice::store::{load_provisioning_file, MemoryStore, RedisStore, SessionStore};
use qodservice::version;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.log_level.as_str()),
    )
    .init();

    info!("{}", version::banner());
    info!("Starting {}", settings.comp_name);

    let store = build_store(&settings).await?;

    let http_client = reqwest::Client::builder()
        .timeout(settings.nef.timeout)
        .build()?;

    let issuer = Arc::new(ClientCredentialsIssuer::new(
        http_client.clone(),
        settings.oauth2.client_token_url.clone(),
        settings.oauth2.client_id.clone(),
        settings.oauth2.client_secret.clone(),
    ));
    let nef = Arc::new(NefClient::new(settings.nef.api_root(), settings.nef.timeout)?);
    info!("NEF AsSessionWithQoS API at {}", settings.nef.api_root());

    let notification_url = settings.notification_url();
    match &notification_url {
        Some(url) => info!("Notifications will be requested at {}", url),
        None => info!("No notify port configured; notifications not requested"),
    }
    let engine = Arc::new(SessionEngine::new(
        store,
        nef,
        issuer,
        EngineOptions {
            notification_url,
            supported_features: settings.nef.supported_features.clone(),
        },
    ));

    let fetcher = Arc::new(HttpKeySetFetcher::new(
        http_client,
        settings.oauth2.auth_server_url.clone(),
    ));
    let validator = Arc::new(InboundValidator::new(
        JwksCache::new(fetcher, settings.oauth2.cache_duration),
        settings.oauth2.issuer_url.clone(),
        settings.oauth2.audience.clone(),
        settings.oauth2.authorized_scope.clone(),
    ));

    let tls_acceptor = match settings.scheme {
        Scheme::Https => {
            let reader = credentials::reader_for(&settings.tls_env, &settings.tls_dir)?;
            Some(credentials::tls_acceptor(reader.as_ref())?)
        }
        Scheme::Http => None,
    };

    let app = api::router(engine, validator);
    let listener = TcpListener::bind(settings.listen_addr()).await?;
    info!(
        "Listening on {}://{}{}",
        settings.scheme.as_str(),
        settings.listen_addr(),
        api::BASE_PATH
    );

    if let Err(e) = server::serve(listener, app, tls_acceptor).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }
    info!("{} stopped", settings.comp_name);
    Ok(())
}

async fn build_store(
    settings: &Settings,
) -> Result<Arc<dyn SessionStore>, Box<dyn std::error::Error>> {
    match settings.store {
        StoreBackend::Redis => {
            info!("Using Redis store at {}", settings.redis_url);
            if settings.provision_file.is_some() {
                warn!("QOD_PROVISION_FILE is ignored with the Redis store; use qod-provision");
            }
            Ok(Arc::new(RedisStore::open(&settings.redis_url)?))
        }
        StoreBackend::Memory => {
            let provisioning = match &settings.provision_file {
                Some(path) => load_provisioning_file(path)?,
                None => {
                    warn!("In-memory store without QOD_PROVISION_FILE; no application server is provisioned");
                    Vec::new()
                }
            };
            info!(
                "Using in-memory store with {} provisioned application servers",
                provisioning.len()
            );
            Ok(Arc::new(MemoryStore::with_provisioning(provisioning).await))
        }
    }
}
