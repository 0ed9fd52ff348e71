//! End-to-end tests over the router: real in-memory database, real JWT,
//! requests driven through `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use vreg_core::{Role, User};
use vreg_db::{build_user, Database, DbConfig};
use vreg_rest_api::auth::hash_password;
use vreg_rest_api::{routes, ApiConfig, AppState};

const CITIZEN_PASSPORT: &str = "1234 567890";

struct TestApp {
    router: Router,
    state: AppState,
    admin_token: String,
    employee_token: String,
    citizen_token: String,
}

async fn test_app() -> TestApp {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let config = ApiConfig {
        http_port: 0,
        database_path: ":memory:".to_string(),
        jwt_secret: "test-secret".to_string(),
        jwt_lifetime_secs: 3600,
        db_max_connections: 1,
    };
    let state = AppState::new(db, config);

    let admin = seed_user(&state, "admin@vreg.test", Role::Admin, None).await;
    let employee = seed_user(&state, "employee@vreg.test", Role::Employee, None).await;
    let citizen = seed_user(
        &state,
        "citizen@vreg.test",
        Role::Citizen,
        Some(CITIZEN_PASSPORT.to_string()),
    )
    .await;

    let admin_token = state.jwt.issue(&admin).unwrap();
    let employee_token = state.jwt.issue(&employee).unwrap();
    let citizen_token = state.jwt.issue(&citizen).unwrap();

    TestApp {
        router: routes::router(state.clone()),
        state,
        admin_token,
        employee_token,
        citizen_token,
    }
}

async fn seed_user(state: &AppState, email: &str, role: Role, party_key: Option<String>) -> User {
    let user = build_user(
        email.to_string(),
        hash_password("correct-horse-battery").unwrap(),
        role,
        party_key,
        None,
    );
    state.db.users().create(&user).await.unwrap()
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn person_payload(passport: &str, address: &str) -> Value {
    json!({
        "passport": passport,
        "lastName": "Ivanov",
        "firstName": "Ivan",
        "middleName": null,
        "address": address,
    })
}

#[tokio::test]
async fn test_healthz_is_public() {
    let app = test_app().await;

    let response = app
        .router
        .oneshot(request("GET", "/healthz", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_login_issues_usable_token() {
    let app = test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({"email": "employee@vreg.test", "password": "correct-horse-battery"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["role"], "employee");
    // The hash must never appear on the wire.
    assert!(body["user"].get("passwordHash").is_none());

    let me = app
        .router
        .oneshot(request("GET", "/v1/auth/me", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(me.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let app = test_app().await;

    let response = app
        .router
        .oneshot(request(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({"email": "employee@vreg.test", "password": "wrong"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = test_app().await;

    let response = app
        .router
        .oneshot(request("GET", "/v1/persons", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_person_lifecycle_over_http() {
    let app = test_app().await;
    let token = Some(app.employee_token.as_str());

    // Create
    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/v1/persons",
            token,
            Some(person_payload("1111 111111", "Lenina st. 1")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Read back, camelCase wire names
    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/v1/persons/1111%20111111", token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["lastName"], "Ivanov");

    // Patch the address; the owner registry must follow
    let response = app
        .router
        .clone()
        .oneshot(request(
            "PATCH",
            "/v1/persons/1111%20111111",
            token,
            Some(json!({"address": "Mira ave. 5"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let old_owner = app
        .state
        .db
        .owners()
        .get_by_address("Lenina st. 1")
        .await
        .unwrap();
    assert!(old_owner.is_none(), "orphaned address must be swept");
    let new_owner = app
        .state
        .db
        .owners()
        .get_by_address("Mira ave. 5")
        .await
        .unwrap();
    assert!(new_owner.is_some());

    // Delete
    let response = app
        .router
        .clone()
        .oneshot(request("DELETE", "/v1/persons/1111%20111111", token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_list_envelope_shape() {
    let app = test_app().await;
    let token = Some(app.employee_token.as_str());

    for (passport, address) in [("1111 111111", "A"), ("2222 222222", "B")] {
        let response = app
            .router
            .clone()
            .oneshot(request(
                "POST",
                "/v1/persons",
                token,
                Some(person_payload(passport, address)),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .router
        .oneshot(request("GET", "/v1/persons?page=1&limit=1", token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["pages"], 2);
    assert_eq!(body["currentPage"], 1);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_passport_is_bad_request() {
    let app = test_app().await;

    let response = app
        .router
        .oneshot(request(
            "POST",
            "/v1/persons",
            Some(&app.employee_token),
            Some(person_payload("not-a-passport", "A")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_duplicate_passport_is_conflict() {
    let app = test_app().await;
    let token = Some(app.employee_token.as_str());

    let payload = person_payload("1111 111111", "A");
    let response = app
        .router
        .clone()
        .oneshot(request("POST", "/v1/persons", token, Some(payload.clone())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .router
        .oneshot(request("POST", "/v1/persons", token, Some(payload)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_citizen_gating() {
    let app = test_app().await;

    // Seed the citizen's own person record as an employee.
    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/v1/persons",
            Some(&app.employee_token),
            Some(person_payload(CITIZEN_PASSPORT, "A")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let citizen = Some(app.citizen_token.as_str());

    // Citizens cannot list persons...
    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/v1/persons", citizen, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // ...but may read their own record...
    let uri = format!("/v1/persons/{}", CITIZEN_PASSPORT.replace(' ', "%20"));
    let response = app
        .router
        .clone()
        .oneshot(request("GET", &uri, citizen, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // ...and their own documents (none yet).
    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/v1/documents/mine", citizen, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    // Staff management is admin-only even for employees.
    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/v1/departments",
            Some(&app.employee_token),
            Some(json!({"name": "Central", "address": "Mira ave. 1", "phone": "+7 000"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .router
        .oneshot(request(
            "POST",
            "/v1/departments",
            Some(&app.admin_token),
            Some(json!({"name": "Central", "address": "Mira ave. 1", "phone": "+7 000"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_frozen_field_is_bad_request() {
    let app = test_app().await;
    let token = Some(app.employee_token.as_str());

    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/v1/persons",
            token,
            Some(person_payload("1111 111111", "A")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/v1/vehicles",
            token,
            Some(json!({
                "vin": "WVWZZZ1JZXW000001",
                "brand": "Lada",
                "model": "Vesta",
                "releaseYear": 2020,
                "engineNumber": "ENG-1",
                "chassisNumber": "CHS-1",
                "color": "white",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/v1/documents",
            token,
            Some(json!({
                "regNumber": "A123BC 77",
                "documentOwner": "1111 111111",
                "vehicleVin": "WVWZZZ1JZXW000001",
                "address": "A",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // The vehicle is now documented; its chassis number is frozen.
    let response = app
        .router
        .oneshot(request(
            "PATCH",
            "/v1/vehicles/WVWZZZ1JZXW000001",
            token,
            Some(json!({"chassisNumber": "CHS-2"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
