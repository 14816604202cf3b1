//! Seeds application server provisioning into Redis.
//!
//! Usage: `qod-provision <file.json>`, where the file holds a JSON array of
//! `{asIpv4Addr, scsAsId, qosMap}` documents. `REDIS_URL` selects the server.

use log::{error, info};
use qodservice::store::{load_provisioning_file, RedisStore};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(path) = env::args().nth(1) else {
        error!("usage: qod-provision <provisioning.json>");
        std::process::exit(2);
    };
    let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

    let documents = load_provisioning_file(&path)?;
    let store = RedisStore::open(&redis_url)?;
    for document in &documents {
        store.provision(document).await?;
    }
    info!(
        "Provisioned {} application servers from {} into {}",
        documents.len(),
        path,
        redis_url
    );
    Ok(())
}
