//! Users API handlers.
//!
//! ```text
//! POST   /api/users          create a user
//! GET    /api/users          list users
//! GET    /api/users/{name}   fetch one user
//! PUT    /api/users/{name}   replace a user
//! DELETE /api/users/{name}   remove a user
//! ```
//!
//! Catalog registration of created, updated, and removed users is a
//! non-fatal side effect: failures are logged and the primary operation
//! still succeeds.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::domain::entity::{EntityDocument, EntityKind, MANAGED_BY_ANNOTATION};
use crate::domain::ports::UserStoreError;
use crate::domain::user::{DisplayName, Email, EntityName, UserRecord};
use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Request body for creating or replacing a user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    #[schema(example = "jdoe")]
    pub name: String,
    #[schema(example = "Jane Doe")]
    pub display_name: String,
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[serde(default)]
    #[schema(example = "engineering")]
    pub member_of: Option<String>,
}

/// Validate a payload field by field, collecting every failure into the
/// details array the clients render inline.
fn validate_payload(payload: &UserPayload) -> ApiResult<UserRecord> {
    let mut details: Vec<Value> = Vec::new();
    let mut collect = |field: &'static str, message: String| {
        details.push(json!({ "field": field, "message": message }));
    };

    let name = EntityName::new(payload.name.clone())
        .map_err(|err| collect(err.field(), err.to_string()))
        .ok();
    let display_name = DisplayName::new(payload.display_name.clone())
        .map_err(|err| collect(err.field(), err.to_string()))
        .ok();
    let email = Email::new(payload.email.clone())
        .map_err(|err| collect(err.field(), err.to_string()))
        .ok();

    if let (Some(name), Some(display_name), Some(email)) = (name, display_name, email) {
        Ok(UserRecord::new(
            name,
            display_name,
            email,
            payload.member_of.clone(),
            None,
        ))
    } else {
        warn!(?details, "user payload failed validation");
        Err(Error::validation(Value::Array(details)))
    }
}

fn store_failure(message: &'static str) -> impl FnOnce(UserStoreError) -> Error {
    move |err| {
        error!(error = %err, "user store failure");
        Error::internal(message)
    }
}

fn user_not_found(name: &str) -> Error {
    Error::not_found("User not found", format!("User '{name}' not found"))
}

/// Push the catalog entity for a stored user; never fails the request.
async fn register_with_catalog(state: &HttpState, record: &UserRecord) {
    let document =
        EntityDocument::user(record).with_annotation(MANAGED_BY_ANNOTATION, "users-api");
    match state.catalog.register_entity(&document).await {
        Ok(()) => info!(username = %record.name(), "user registered in catalog"),
        Err(err) => {
            warn!(username = %record.name(), error = %err, "failed to register user in catalog");
        }
    }
}

/// List all users.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All stored users", body = [UserRecord]),
        (status = 500, description = "User store failure", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<UserRecord>>> {
    let users = state
        .users
        .list()
        .await
        .map_err(store_failure("Failed to list users"))?;
    info!("retrieved all users");
    Ok(web::Json(users))
}

/// Create a new user.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = UserPayload,
    responses(
        (status = 201, description = "User created"),
        (status = 400, description = "Validation failed", body = Error),
        (status = 409, description = "Duplicate username or email", body = Error),
        (status = 500, description = "User store failure", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<UserPayload>,
) -> ApiResult<HttpResponse> {
    let record = validate_payload(&payload)?;

    if state
        .users
        .find(record.name().as_str())
        .await
        .map_err(store_failure("Failed to create user"))?
        .is_some()
    {
        return Err(Error::conflict(
            "User already exists",
            format!("A user with username '{}' already exists", record.name()),
        ));
    }

    if state
        .users
        .find_by_email(record.email().as_str())
        .await
        .map_err(store_failure("Failed to create user"))?
        .is_some()
    {
        return Err(Error::conflict(
            "Email already exists",
            format!("A user with email '{}' already exists", record.email()),
        ));
    }

    state
        .users
        .insert(record.clone())
        .await
        .map_err(store_failure("Failed to create user"))?;

    register_with_catalog(&state, &record).await;
    info!(username = %record.name(), "created new user");

    Ok(HttpResponse::Created().json(json!({
        "message": "User created successfully",
        "user": record,
    })))
}

/// Fetch a single user by name.
#[utoipa::path(
    get,
    path = "/api/users/{name}",
    params(("name" = String, Path, description = "Entity name of the user")),
    responses(
        (status = 200, description = "The stored user", body = UserRecord),
        (status = 404, description = "Unknown user", body = Error),
        (status = 500, description = "User store failure", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{name}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    name: web::Path<String>,
) -> ApiResult<web::Json<UserRecord>> {
    let user = state
        .users
        .find(&name)
        .await
        .map_err(store_failure("Failed to fetch user"))?
        .ok_or_else(|| user_not_found(&name))?;
    Ok(web::Json(user))
}

/// Replace a stored user.
#[utoipa::path(
    put,
    path = "/api/users/{name}",
    params(("name" = String, Path, description = "Entity name of the user")),
    request_body = UserPayload,
    responses(
        (status = 200, description = "User updated"),
        (status = 400, description = "Validation failed", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 409, description = "Email belongs to another user", body = Error),
        (status = 500, description = "User store failure", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{name}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    name: web::Path<String>,
    payload: web::Json<UserPayload>,
) -> ApiResult<HttpResponse> {
    if state
        .users
        .find(&name)
        .await
        .map_err(store_failure("Failed to update user"))?
        .is_none()
    {
        return Err(user_not_found(&name));
    }

    let record = validate_payload(&payload)?;

    let email_owner = state
        .users
        .find_by_email(record.email().as_str())
        .await
        .map_err(store_failure("Failed to update user"))?;
    if email_owner.is_some_and(|owner| owner.name().as_str() != name.as_str()) {
        return Err(Error::conflict(
            "Email already exists",
            format!("A user with email '{}' already exists", record.email()),
        ));
    }

    state
        .users
        .update(&name, record.clone())
        .await
        .map_err(store_failure("Failed to update user"))?;

    register_with_catalog(&state, &record).await;
    info!(username = %record.name(), "updated user");

    Ok(HttpResponse::Ok().json(json!({
        "message": "User updated successfully",
        "user": record,
    })))
}

/// Remove a stored user.
#[utoipa::path(
    delete,
    path = "/api/users/{name}",
    params(("name" = String, Path, description = "Entity name of the user")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "Unknown user", body = Error),
        (status = 500, description = "User store failure", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{name}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    name: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = state
        .users
        .remove(&name)
        .await
        .map_err(store_failure("Failed to delete user"))?
        .ok_or_else(|| user_not_found(&name))?;

    match state.catalog.remove_entity(EntityKind::User, &name).await {
        Ok(()) => info!(username = %user.name(), "user removed from catalog"),
        Err(err) => {
            warn!(username = %user.name(), error = %err, "failed to remove user from catalog");
        }
    }
    info!(username = %user.name(), "deleted user");

    Ok(HttpResponse::Ok().json(json!({
        "message": "User deleted successfully",
        "user": user,
    })))
}
