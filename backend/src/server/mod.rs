//! Server construction and middleware wiring.

mod config;

pub use config::{
    DEFAULT_FRONTEND_ORIGIN, DEFAULT_ORG_FILE, DEFAULT_ORG_FILE_URL, ServerConfig,
};

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{App, HttpServer, http, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{CatalogClient, FixtureCatalogClient};
use crate::inbound::http::entities::{append_entity, org_file, register_entity};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::metrics::catalog_metrics;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{create_user, delete_user, get_user, list_users, update_user};
use crate::middleware::Trace;
use crate::outbound::{FlatFileOrgStore, HttpCatalogClient, InMemoryUserStore};

const CATALOG_TIMEOUT: Duration = Duration::from_secs(30);

/// Register every `/api` service.
///
/// Shared between [`create_server`] and test harnesses so both serve the
/// same route table. Concrete routes are registered before the
/// `{kind}-entity` scope.
pub fn api_services(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(create_user)
        .service(get_user)
        .service(update_user)
        .service(delete_user)
        .service(catalog_metrics)
        .service(
            web::scope("/{kind}-entity")
                .service(append_entity)
                .service(org_file)
                .service(register_entity),
        );
}

/// Build the HTTP state from configuration, constructing the adapters.
fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let org_store = FlatFileOrgStore::new(&config.org_file)?;
    let catalog: Arc<dyn CatalogClient> = match &config.catalog_base {
        Some(base) => Arc::new(
            HttpCatalogClient::new(base.clone(), CATALOG_TIMEOUT)
                .map_err(|err| std::io::Error::other(format!("catalog client: {err}")))?,
        ),
        None => Arc::new(FixtureCatalogClient),
    };
    Ok(web::Data::new(HttpState {
        users: Arc::new(InMemoryUserStore::default()),
        org_file: Arc::new(org_store),
        catalog,
        org_file_url: config.org_file_url.clone(),
    }))
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when the org file directory cannot be
/// prepared, the catalog client cannot be built, or the socket cannot be
/// bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config)?;
    let server_health_state = health_state.clone();
    let frontend_origin = config.frontend_origin.clone();

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_header(http::header::CONTENT_TYPE)
            .max_age(3600);

        let app = App::new()
            .app_data(server_health_state.clone())
            .app_data(http_state.clone())
            .wrap(Trace)
            .wrap(cors)
            .service(web::scope("/api").configure(api_services))
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        let app = app.service(
            SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );

        app
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
