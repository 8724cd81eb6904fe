//! Entity append and registration handlers.
//!
//! These routes take raw YAML produced by the creation forms and accumulate
//! it in the shared org file, then point the external catalog at that file.
//! The append is intentionally lock-free: concurrent submissions race on
//! the shared file, matching the original service's behaviour.

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use tracing::{error, info, warn};
use utoipa::IntoParams;

use crate::domain::Error;
use crate::domain::entity::EntityKind;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

fn parse_kind(slug: &str) -> ApiResult<EntityKind> {
    EntityKind::from_slug(slug).ok_or_else(|| {
        Error::not_found(
            "Unknown entity kind",
            format!("Entity kind '{slug}' is not supported"),
        )
    })
}

/// Append a raw YAML document to the shared org file.
///
/// The body is not parsed or validated here; the catalog performs its own
/// processing when it ingests the file.
#[utoipa::path(
    post,
    path = "/api/{kind}-entity/add",
    params(("kind" = String, Path, description = "Entity kind: user or group")),
    request_body(content = String, content_type = "application/yaml"),
    responses(
        (status = 200, description = "Entity appended to org.yaml"),
        (status = 400, description = "Body is not UTF-8 text", body = Error),
        (status = 404, description = "Unknown entity kind", body = Error),
        (status = 500, description = "Append failed", body = Error)
    ),
    tags = ["entities"],
    operation_id = "appendEntity"
)]
#[post("/add")]
pub async fn append_entity(
    state: web::Data<HttpState>,
    kind: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let kind = parse_kind(&kind)?;
    let text = std::str::from_utf8(&body).map_err(|_| {
        Error::invalid_request("Invalid request body")
            .with_message("Request body must be UTF-8 text")
    })?;

    let chunk = format!("\n---\n{}\n", text.trim());
    state.org_file.append(&chunk).await.map_err(|err| {
        error!(error = %err, "failed to append entity");
        Error::internal("Failed to save entity")
    })?;

    info!(kind = kind.slug(), "entity appended to org.yaml");
    Ok(HttpResponse::Ok().body("Entity appended to org.yaml"))
}

/// Serve the shared org file.
#[utoipa::path(
    get,
    path = "/api/{kind}-entity/org.yaml",
    params(("kind" = String, Path, description = "Entity kind: user or group")),
    responses(
        (status = 200, description = "Full org file contents", content_type = "text/yaml"),
        (status = 404, description = "Unknown entity kind", body = Error),
        (status = 500, description = "File missing or unreadable", body = Error)
    ),
    tags = ["entities"],
    operation_id = "orgFile"
)]
#[get("/org.yaml")]
pub async fn org_file(
    state: web::Data<HttpState>,
    kind: web::Path<String>,
) -> ApiResult<HttpResponse> {
    parse_kind(&kind)?;
    let contents = state.org_file.read_all().await.map_err(|err| {
        error!(error = %err, "failed to read org file");
        Error::internal("Failed to read org.yaml")
    })?;
    Ok(HttpResponse::Ok().content_type("text/yaml").body(contents))
}

/// Query parameters for [`register_entity`].
#[derive(Debug, Deserialize, IntoParams)]
pub struct RegisterQuery {
    /// Entity to refresh once the location is registered.
    name: Option<String>,
}

/// Ensure the org file's URL is registered with the catalog.
///
/// Registration is checked against the catalog's current locations so
/// repeated calls stay idempotent; a failed add is logged but does not fail
/// the request. Only the location query itself is fatal.
#[utoipa::path(
    get,
    path = "/api/{kind}-entity/register",
    params(
        ("kind" = String, Path, description = "Entity kind: user or group"),
        RegisterQuery
    ),
    responses(
        (status = 200, description = "Location registered or already present"),
        (status = 404, description = "Unknown entity kind", body = Error),
        (status = 500, description = "Catalog location query failed", body = Error)
    ),
    tags = ["entities"],
    operation_id = "registerEntity"
)]
#[get("/register")]
pub async fn register_entity(
    state: web::Data<HttpState>,
    kind: web::Path<String>,
    query: web::Query<RegisterQuery>,
) -> ApiResult<HttpResponse> {
    let kind = parse_kind(&kind)?;

    let locations = state.catalog.list_locations().await.map_err(|err| {
        error!(error = %err, "failed to query catalog locations");
        Error::internal("Failed to query catalog locations")
    })?;

    let target = state.org_file_url.as_str();
    let registered = if locations.iter().any(|location| location == target) {
        info!(target, "org file already registered with catalog");
        false
    } else {
        match state.catalog.add_location(target).await {
            Ok(()) => {
                info!(target, "org file registered with catalog");
                true
            }
            Err(err) => {
                warn!(error = %err, target, "failed to register org file location");
                false
            }
        }
    };

    if let Some(name) = query
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
    {
        match state.catalog.refresh_entity(kind, name).await {
            Ok(()) => info!(entity_ref = %kind.entity_ref(name), "catalog refresh triggered"),
            Err(err) => {
                warn!(error = %err, entity_ref = %kind.entity_ref(name), "catalog refresh failed");
            }
        }
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Location registration checked",
        "registered": registered,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::EntityDocument;
    use crate::domain::ports::{
        CatalogClient, CatalogError, FixtureCatalogClient, FixtureOrgFileStore, OrgFileStore,
    };
    use crate::outbound::memory::InMemoryUserStore;
    use actix_web::{App, http::StatusCode, test as actix_test};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    const ORG_URL: &str = "http://localhost:7007/api/user-entity/org.yaml";

    /// Catalog fake recording registration calls and optionally failing the
    /// location query.
    #[derive(Default)]
    struct RecordingCatalog {
        locations: Mutex<Vec<String>>,
        refreshed: Mutex<Vec<String>>,
        fail_listing: bool,
    }

    impl RecordingCatalog {
        fn with_locations(locations: Vec<String>) -> Self {
            Self {
                locations: Mutex::new(locations),
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail_listing: true,
                ..Self::default()
            }
        }

        fn locations(&self) -> Vec<String> {
            self.locations.lock().expect("locations lock").clone()
        }

        fn refreshed(&self) -> Vec<String> {
            self.refreshed.lock().expect("refreshed lock").clone()
        }
    }

    #[async_trait]
    impl CatalogClient for RecordingCatalog {
        async fn list_locations(&self) -> Result<Vec<String>, CatalogError> {
            if self.fail_listing {
                return Err(CatalogError::status(500, "listing unavailable"));
            }
            Ok(self.locations())
        }

        async fn add_location(&self, target: &str) -> Result<(), CatalogError> {
            self.locations
                .lock()
                .expect("locations lock")
                .push(target.to_owned());
            Ok(())
        }

        async fn refresh_entity(
            &self,
            kind: EntityKind,
            name: &str,
        ) -> Result<(), CatalogError> {
            self.refreshed
                .lock()
                .expect("refreshed lock")
                .push(kind.entity_ref(name));
            Ok(())
        }

        async fn register_entity(&self, _document: &EntityDocument) -> Result<(), CatalogError> {
            Ok(())
        }

        async fn remove_entity(&self, _kind: EntityKind, _name: &str) -> Result<(), CatalogError> {
            Ok(())
        }
    }

    fn state_with(
        org_store: Arc<dyn OrgFileStore>,
        catalog: Arc<dyn CatalogClient>,
    ) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            users: Arc::new(InMemoryUserStore::default()),
            org_file: org_store,
            catalog,
            org_file_url: ORG_URL.to_owned(),
        })
    }

    macro_rules! init_app {
        ($state:expr) => {
            actix_test::init_service(
                App::new().app_data($state.clone()).service(
                    web::scope("/api/{kind}-entity")
                        .service(append_entity)
                        .service(org_file)
                        .service(register_entity),
                ),
            )
            .await
        };
    }

    const USER_YAML: &str = "apiVersion: backstage.io/v1alpha1\nkind: User\nmetadata:\n  name: jdoe\nspec:\n  profile:\n    displayName: Jane Doe\n    email: jane@x.com\n  memberOf: []\n";

    #[actix_web::test]
    async fn append_grows_the_file_without_dedup() {
        let store = Arc::new(FixtureOrgFileStore::default());
        let state = state_with(store.clone(), Arc::new(FixtureCatalogClient));
        let app = init_app!(state);

        for _ in 0..2 {
            let response = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/api/user-entity/add")
                    .insert_header(("content-type", "application/yaml"))
                    .set_payload(USER_YAML)
                    .to_request(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        let contents = store.read_all().await.expect("contents");
        assert_eq!(contents.matches("---").count(), 2);
        assert_eq!(contents.matches("name: jdoe").count(), 2);
    }

    #[actix_web::test]
    async fn org_yaml_serves_appended_contents() {
        let store = Arc::new(FixtureOrgFileStore::default());
        let state = state_with(store, Arc::new(FixtureCatalogClient));
        let app = init_app!(state);

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/user-entity/add")
                .set_payload(USER_YAML)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/user-entity/org.yaml")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("content-type")
                .map(|v| v.to_str().unwrap_or_default()),
            Some("text/yaml")
        );
        let body = actix_test::read_body(response).await;
        let text = std::str::from_utf8(&body).expect("utf8 body");
        assert!(text.starts_with("\n---\n"));
        assert!(text.contains("kind: User"));
    }

    #[actix_web::test]
    async fn org_yaml_fails_before_first_append() {
        let state = state_with(
            Arc::new(FixtureOrgFileStore::default()),
            Arc::new(FixtureCatalogClient),
        );
        let app = init_app!(state);

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/user-entity/org.yaml")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn register_adds_missing_location_and_refreshes() {
        let catalog = Arc::new(RecordingCatalog::default());
        let state = state_with(Arc::new(FixtureOrgFileStore::default()), catalog.clone());
        let app = init_app!(state);

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/user-entity/register?name=jdoe")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["registered"], true);
        assert_eq!(catalog.locations(), vec![ORG_URL.to_owned()]);
        assert_eq!(catalog.refreshed(), vec!["user:default/jdoe".to_owned()]);
    }

    #[actix_web::test]
    async fn register_skips_known_location() {
        let catalog = Arc::new(RecordingCatalog::with_locations(vec![ORG_URL.to_owned()]));
        let state = state_with(Arc::new(FixtureOrgFileStore::default()), catalog.clone());
        let app = init_app!(state);

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/group-entity/register")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["registered"], false);
        assert_eq!(catalog.locations().len(), 1);
        assert!(catalog.refreshed().is_empty());
    }

    #[actix_web::test]
    async fn register_fails_when_location_query_fails() {
        let catalog = Arc::new(RecordingCatalog::failing());
        let state = state_with(Arc::new(FixtureOrgFileStore::default()), catalog);
        let app = init_app!(state);

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/user-entity/register")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn unknown_kind_is_not_found() {
        let state = state_with(
            Arc::new(FixtureOrgFileStore::default()),
            Arc::new(FixtureCatalogClient),
        );
        let app = init_app!(state);

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/widget-entity/add")
                .set_payload("kind: Widget")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["error"], "Unknown entity kind");
    }
}
