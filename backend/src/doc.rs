//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the OpenAPI specification for the REST API. The
//! generated document backs Swagger UI at `/docs` in debug builds.

use utoipa::OpenApi;

use crate::domain::metrics::{CatalogMetrics, GroupMembership, KindBreakdown};
use crate::domain::{Error, ErrorCode, GroupRecord, UserRecord};
use crate::inbound::http::users::UserPayload;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Orgkeeper API",
        description = "Catalog entity creation: user/group CRUD, org file appends, and catalog registration."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::entities::append_entity,
        crate::inbound::http::entities::org_file,
        crate::inbound::http::entities::register_entity,
        crate::inbound::http::metrics::catalog_metrics,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        UserRecord,
        GroupRecord,
        UserPayload,
        CatalogMetrics,
        KindBreakdown,
        GroupMembership,
    )),
    tags(
        (name = "users", description = "In-memory user CRUD"),
        (name = "entities", description = "Org file appends and catalog registration"),
        (name = "metrics", description = "Read-only catalog metrics"),
        (name = "health", description = "Probes for orchestration")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_has_wire_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");
        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "error");
    }

    #[test]
    fn documents_every_api_path() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/users",
            "/api/users/{name}",
            "/api/{kind}-entity/add",
            "/api/{kind}-entity/org.yaml",
            "/api/{kind}-entity/register",
            "/api/metrics",
            "/health/ready",
            "/health/live",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing path '{path}' in OpenAPI document"
            );
        }
    }
}
