//! Backend entry-point: wires REST endpoints and OpenAPI docs.

use std::env;
use std::net::SocketAddr;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use orgkeeper::inbound::http::health::HealthState;
use orgkeeper::server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let bind_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:7007".into())
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid BIND_ADDR: {e}")))?;

    let mut config = ServerConfig::new(bind_addr);
    if let Ok(origin) = env::var("FRONTEND_ORIGIN") {
        config = config.with_frontend_origin(origin);
    }
    if let Ok(path) = env::var("ORG_FILE") {
        config = config.with_org_file(path);
    }
    if let Ok(url) = env::var("ORG_FILE_URL") {
        config = config.with_org_file_url(url);
    }
    match env::var("CATALOG_BASE_URL") {
        Ok(raw) => {
            let base = Url::parse(&raw)
                .map_err(|e| std::io::Error::other(format!("invalid CATALOG_BASE_URL: {e}")))?;
            config = config.with_catalog_base(base);
        }
        Err(_) => warn!("CATALOG_BASE_URL not set; catalog registration runs against a no-op client"),
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "orgkeeper listening");
    server.await
}
