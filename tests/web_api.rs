//! HTTP API tests.
//!
//! Drive the axum router end to end with an in-memory database.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;

use common::{token_from_mail, TestApp};
use lms::mail::{PASSWORD_RESET_SUBJECT, VERIFICATION_SUBJECT};
use lms::web::create_router;

async fn create_test_server() -> (TestServer, TestApp) {
    let app = TestApp::new().await;
    let router = create_router(Arc::new(app.state.clone()), &[]);
    let server = TestServer::new(router).expect("Failed to create test server");
    (server, app)
}

/// Register and verify through the API, then log in and return the access token.
async fn signup(server: &TestServer, app: &TestApp, email: &str, password: &str) -> String {
    server
        .post("/users/register")
        .json(&json!({ "email": email, "password": password }))
        .await
        .assert_status(StatusCode::CREATED);

    let mail = app.wait_for_mail(email, VERIFICATION_SUBJECT).await;
    server
        .get("/users/verify-email")
        .add_query_param("email", email)
        .add_query_param("token", token_from_mail(&mail))
        .await
        .assert_status_ok();

    login(server, email, password).await
}

async fn login(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .post("/users/login")
        .json(&json!({ "email": email, "password": password }))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    body["data"]["access_token"].as_str().unwrap().to_string()
}

async fn admin_token(server: &TestServer, app: &TestApp) -> String {
    app.state
        .accounts
        .bootstrap_admin("admin@x.com", "rootpw")
        .await
        .unwrap();
    login(server, "admin@x.com", "rootpw").await
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

#[tokio::test]
async fn test_health() {
    let (server, _app) = create_test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn test_register_returns_created_user() {
    let (server, _app) = create_test_server().await;

    let response = server
        .post("/users/register")
        .json(&json!({ "email": "a@x.com", "password": "pw1" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["data"]["email"], "a@x.com");
    assert_eq!(body["data"]["is_active"], false);
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_is_conflict() {
    let (server, _app) = create_test_server().await;
    let body = json!({ "email": "a@x.com", "password": "pw1" });

    server.post("/users/register").json(&body).await;
    let response = server.post("/users/register").json(&body).await;

    response.assert_status(StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_register_validation_errors() {
    let (server, _app) = create_test_server().await;

    let response = server
        .post("/users/register")
        .json(&json!({ "email": "a@x.com", "password": "" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["password"].is_array());

    let response = server
        .post("/users/register")
        .json(&json!({ "email": "not-an-email", "password": "pw1" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (server, _app) = create_test_server().await;
    let response = server
        .post("/users/login")
        .json(&json!({ "email": "a@x.com" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_before_verification_is_unauthorized() {
    let (server, _app) = create_test_server().await;
    server
        .post("/users/register")
        .json(&json!({ "email": "a@x.com", "password": "pw1" }))
        .await;

    let response = server
        .post("/users/login")
        .json(&json!({ "email": "a@x.com", "password": "pw1" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["message"], "invalid email or password");
}

#[tokio::test]
async fn test_verify_email_with_bad_token() {
    let (server, _app) = create_test_server().await;
    server
        .post("/users/register")
        .json(&json!({ "email": "a@x.com", "password": "pw1" }))
        .await;

    server
        .get("/users/verify-email")
        .add_query_param("email", "a@x.com")
        .add_query_param("token", "forged")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .get("/users/verify-email")
        .add_query_param("email", "ghost@x.com")
        .add_query_param("token", "forged")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_returns_tokens() {
    let (server, app) = create_test_server().await;
    signup(&server, &app, "a@x.com", "pw1").await;

    let response = server
        .post("/users/login")
        .json(&json!({ "email": "a@x.com", "password": "pw1" }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert_eq!(body["data"]["expires_in"], 3600);
    assert!(body["data"]["refresh_token"].is_string());
    assert_eq!(body["data"]["user"]["email"], "a@x.com");
}

#[tokio::test]
async fn test_profile_requires_token() {
    let (server, app) = create_test_server().await;
    let token = signup(&server, &app, "a@x.com", "pw1").await;

    server
        .get("/users/profile")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .get("/users/profile")
        .add_header(AUTHORIZATION, "Bearer garbage")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .get("/users/profile")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["email"], "a@x.com");
}

#[tokio::test]
async fn test_refresh_token() {
    let (server, app) = create_test_server().await;
    signup(&server, &app, "a@x.com", "pw1").await;

    let login = server
        .post("/users/login")
        .json(&json!({ "email": "a@x.com", "password": "pw1" }))
        .await
        .json::<Value>();
    let refresh = login["data"]["refresh_token"].as_str().unwrap();

    let response = server
        .post("/users/token/refresh")
        .json(&json!({ "refresh_token": refresh }))
        .await;
    response.assert_status_ok();
    let access = response.json::<Value>()["data"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    server
        .get("/users/profile")
        .add_header(AUTHORIZATION, bearer(&access))
        .await
        .assert_status_ok();

    server
        .post("/users/token/refresh")
        .json(&json!({ "refresh_token": "nope" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_password_reset_flow() {
    let (server, app) = create_test_server().await;
    signup(&server, &app, "a@x.com", "pw1").await;

    server
        .post("/users/password-reset")
        .json(&json!({ "email": "a@x.com" }))
        .await
        .assert_status_ok();

    let mail = app.wait_for_mail("a@x.com", PASSWORD_RESET_SUBJECT).await;
    let token = token_from_mail(&mail);

    server
        .post("/users/password-update")
        .add_query_param("email", "a@x.com")
        .add_query_param("token", &token)
        .json(&json!({ "password": "newpw", "confirm_password": "other" }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    server
        .post("/users/password-update")
        .add_query_param("email", "a@x.com")
        .add_query_param("token", &token)
        .json(&json!({ "password": "newpw", "confirm_password": "newpw" }))
        .await
        .assert_status_ok();

    login(&server, "a@x.com", "newpw").await;
}

#[tokio::test]
async fn test_password_reset_unverified_is_forbidden() {
    let (server, _app) = create_test_server().await;
    server
        .post("/users/register")
        .json(&json!({ "email": "a@x.com", "password": "pw1" }))
        .await;

    server
        .post("/users/password-reset")
        .json(&json!({ "email": "a@x.com" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    server
        .post("/users/password-reset")
        .json(&json!({ "email": "ghost@x.com" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_loan_lifecycle_over_http() {
    let (server, app) = create_test_server().await;
    let user = signup(&server, &app, "a@x.com", "pw1").await;
    let admin = admin_token(&server, &app).await;

    let response = server
        .post("/loans")
        .add_header(AUTHORIZATION, bearer(&user))
        .json(&json!({ "amount": "1500.00" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let loan = response.json::<Value>();
    assert_eq!(loan["data"]["status"], "pending");
    let loan_id = loan["data"]["id"].as_i64().unwrap();

    let response = server
        .get(&format!("/loans/{loan_id}"))
        .add_header(AUTHORIZATION, bearer(&user))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["amount"], "1500.00");

    // users cannot decide on loans
    server
        .patch(&format!("/admin/loans/{loan_id}/approve"))
        .add_header(AUTHORIZATION, bearer(&user))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = server
        .patch(&format!("/admin/loans/{loan_id}/approve"))
        .add_header(AUTHORIZATION, bearer(&admin))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["status"], "approved");

    server
        .patch(&format!("/admin/loans/{loan_id}/reject"))
        .add_header(AUTHORIZATION, bearer(&admin))
        .await
        .assert_status(StatusCode::CONFLICT);

    server
        .patch(&format!("/admin/loans/{loan_id}/cancel"))
        .add_header(AUTHORIZATION, bearer(&admin))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .get(&format!("/loans/{loan_id}"))
        .add_header(AUTHORIZATION, bearer(&user))
        .await;
    assert_eq!(response.json::<Value>()["data"]["status"], "approved");

    server
        .delete(&format!("/admin/loans/{loan_id}"))
        .add_header(AUTHORIZATION, bearer(&admin))
        .await
        .assert_status_ok();

    server
        .get(&format!("/loans/{loan_id}"))
        .add_header(AUTHORIZATION, bearer(&user))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .delete(&format!("/admin/loans/{loan_id}"))
        .add_header(AUTHORIZATION, bearer(&admin))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_amount_rejected() {
    let (server, app) = create_test_server().await;
    let user = signup(&server, &app, "a@x.com", "pw1").await;

    for amount in ["", "-10", "ten", "0"] {
        server
            .post("/loans")
            .add_header(AUTHORIZATION, bearer(&user))
            .json(&json!({ "amount": amount }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}

#[tokio::test]
async fn test_loan_visibility() {
    let (server, app) = create_test_server().await;
    let alice = signup(&server, &app, "a@x.com", "pw1").await;
    let bob = signup(&server, &app, "b@x.com", "pw1").await;
    let admin = admin_token(&server, &app).await;

    let alice_loan = server
        .post("/loans")
        .add_header(AUTHORIZATION, bearer(&alice))
        .json(&json!({ "amount": "100" }))
        .await
        .json::<Value>()["data"]["id"]
        .as_i64()
        .unwrap();
    server
        .post("/loans")
        .add_header(AUTHORIZATION, bearer(&bob))
        .json(&json!({ "amount": "200" }))
        .await;

    // another user's loan looks absent
    server
        .get(&format!("/loans/{alice_loan}"))
        .add_header(AUTHORIZATION, bearer(&bob))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let own = server
        .get("/loans")
        .add_header(AUTHORIZATION, bearer(&bob))
        .await
        .json::<Value>();
    let own = own["data"].as_array().unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0]["amount"], "200");

    server
        .get("/admin/loans")
        .add_header(AUTHORIZATION, bearer(&bob))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let all = server
        .get("/admin/loans")
        .add_query_param("status", "pending")
        .add_header(AUTHORIZATION, bearer(&admin))
        .await
        .json::<Value>();
    let all = all["data"].as_array().unwrap();
    assert_eq!(all.len(), 2);
    // pending queue reads oldest first
    assert_eq!(all[0]["id"].as_i64().unwrap(), alice_loan);

    server
        .get("/admin/loans")
        .add_query_param("status", "lost")
        .add_header(AUTHORIZATION, bearer(&admin))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_users_and_logs() {
    let (server, app) = create_test_server().await;
    let user = signup(&server, &app, "a@x.com", "pw1").await;
    let admin = admin_token(&server, &app).await;

    let users = server
        .get("/admin/users")
        .add_header(AUTHORIZATION, bearer(&admin))
        .await
        .json::<Value>();
    assert_eq!(users["data"].as_array().unwrap().len(), 2);

    let first_id = users["data"][0]["id"].as_i64().unwrap();
    let response = server
        .get(&format!("/admin/users/{first_id}"))
        .add_header(AUTHORIZATION, bearer(&admin))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["email"], "a@x.com");

    server
        .get("/admin/users/9999")
        .add_header(AUTHORIZATION, bearer(&admin))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .get("/admin/users")
        .add_header(AUTHORIZATION, bearer(&user))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let logs = server
        .get("/admin/logs")
        .add_header(AUTHORIZATION, bearer(&admin))
        .await
        .json::<Value>();
    let categories: Vec<&str> = logs["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["category"].as_str())
        .collect();
    assert!(categories.contains(&"User Registration"));
    assert!(categories.contains(&"Login Attempt"));

    server
        .get("/admin/logs")
        .add_header(AUTHORIZATION, bearer(&user))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}
