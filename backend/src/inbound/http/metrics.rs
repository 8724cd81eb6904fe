//! Read-only metrics endpoint over the org file.

use actix_web::{get, web};
use tracing::error;

use crate::domain::Error;
use crate::domain::entity::EntityDocument;
use crate::domain::metrics::{self, CatalogMetrics};
use crate::domain::ports::OrgFileError;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Aggregate the org file into dashboard metrics.
///
/// A missing org file is an empty catalog, not an error.
#[utoipa::path(
    get,
    path = "/api/metrics",
    responses(
        (status = 200, description = "Aggregated catalog metrics", body = CatalogMetrics),
        (status = 500, description = "Org file unreadable", body = Error)
    ),
    tags = ["metrics"],
    operation_id = "catalogMetrics"
)]
#[get("/metrics")]
pub async fn catalog_metrics(state: web::Data<HttpState>) -> ApiResult<web::Json<CatalogMetrics>> {
    let contents = match state.org_file.read_all().await {
        Ok(contents) => contents,
        Err(OrgFileError::Missing { .. }) => String::new(),
        Err(err) => {
            error!(error = %err, "failed to read org file for metrics");
            return Err(Error::internal("Failed to read org.yaml"));
        }
    };
    let documents = EntityDocument::parse_documents(&contents);
    Ok(web::Json(metrics::aggregate(&documents)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FixtureCatalogClient, FixtureOrgFileStore, OrgFileStore};
    use crate::outbound::memory::InMemoryUserStore;
    use actix_web::{App, http::StatusCode, test as actix_test};
    use serde_json::Value;
    use std::sync::Arc;

    fn state_with(org_file: Arc<dyn OrgFileStore>) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            users: Arc::new(InMemoryUserStore::default()),
            org_file,
            catalog: Arc::new(FixtureCatalogClient),
            org_file_url: "http://localhost:7007/api/user-entity/org.yaml".to_owned(),
        })
    }

    #[actix_web::test]
    async fn missing_file_yields_empty_metrics() {
        let state = state_with(Arc::new(FixtureOrgFileStore::default()));
        let app = actix_test::init_service(
            App::new()
                .app_data(state)
                .service(web::scope("/api").service(catalog_metrics)),
        )
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/metrics").to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["totalEntities"], 0);
    }

    #[actix_web::test]
    async fn aggregates_appended_documents() {
        let store = Arc::new(FixtureOrgFileStore::default());
        store
            .append("\n---\napiVersion: backstage.io/v1alpha1\nkind: User\nmetadata:\n  name: jdoe\nspec:\n  profile:\n    displayName: Jane Doe\n    email: jane@x.com\n  memberOf:\n  - engineering\n")
            .await
            .expect("append");
        store
            .append("\n---\napiVersion: backstage.io/v1alpha1\nkind: Group\nmetadata:\n  name: engineering\nspec:\n  type: team\n  profile:\n    displayName: Engineering\n  children: []\n")
            .await
            .expect("append");

        let state = state_with(store);
        let app = actix_test::init_service(
            App::new()
                .app_data(state)
                .service(web::scope("/api").service(catalog_metrics)),
        )
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/metrics").to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["totalEntities"], 2);
        assert_eq!(body["byGroup"][0]["name"], "engineering");
        assert_eq!(body["byType"][0]["name"], "team");
        assert_eq!(body["byType"][0]["percentage"], 100.0);
    }
}
