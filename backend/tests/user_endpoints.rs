//! Behavioural tests for the users CRUD API served through the full route
//! table.

use std::sync::Arc;

use actix_web::{App, http::StatusCode, test, web};
use serde_json::{Value, json};

use orgkeeper::domain::ports::{FixtureCatalogClient, FixtureOrgFileStore};
use orgkeeper::inbound::http::state::HttpState;
use orgkeeper::outbound::InMemoryUserStore;
use orgkeeper::server::api_services;

fn test_state() -> web::Data<HttpState> {
    web::Data::new(HttpState {
        users: Arc::new(InMemoryUserStore::default()),
        org_file: Arc::new(FixtureOrgFileStore::default()),
        catalog: Arc::new(FixtureCatalogClient),
        org_file_url: "http://localhost:7007/api/user-entity/org.yaml".to_owned(),
    })
}

fn jane() -> Value {
    json!({
        "name": "jdoe",
        "displayName": "Jane Doe",
        "email": "jane@x.com",
        "memberOf": "engineering",
    })
}

#[actix_web::test]
async fn user_lifecycle_create_read_update_delete() {
    let app = test::init_service(
        App::new()
            .app_data(test_state())
            .service(web::scope("/api").configure(api_services)),
    )
    .await;

    // Create.
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/users")
            .set_json(jane())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["user"]["memberOf"], "engineering");

    // Read back.
    let response = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/users/jdoe").to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["displayName"], "Jane Doe");

    // Update.
    let mut updated = jane();
    updated["displayName"] = json!("Jane A. Doe");
    let response = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/users/jdoe")
            .set_json(updated)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Delete, then the user is gone.
    let response = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/api/users/jdoe")
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/api/users/jdoe")
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn duplicate_create_conflicts_with_fixed_error_shape() {
    let app = test::init_service(
        App::new()
            .app_data(test_state())
            .service(web::scope("/api").configure(api_services)),
    )
    .await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/users")
            .set_json(jane())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/users")
            .set_json(jane())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"], "User already exists");
    assert_eq!(body["message"], "A user with username 'jdoe' already exists");
}

#[actix_web::test]
async fn validation_failure_reports_every_bad_field() {
    let app = test::init_service(
        App::new()
            .app_data(test_state())
            .service(web::scope("/api").configure(api_services)),
    )
    .await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/users")
            .set_json(json!({
                "name": "",
                "displayName": "   ",
                "email": "nope",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"], "Validation failed");
    let details = body["details"].as_array().expect("details array");
    let fields: Vec<&str> = details
        .iter()
        .filter_map(|detail| detail["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["name", "displayName", "email"]);
}
