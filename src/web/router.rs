//! Router configuration for the HTTP layer.

use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_loan, delete_loan, forget_password, get_loan, get_user, list_all_loans, list_logs,
    list_my_loans, list_users, login, profile, refresh_token, register, transition_loan,
    update_password, verify_email, AppState,
};
use super::middleware::create_cors_layer;

/// Create the main router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let user_routes = Router::new()
        .route("/users/register", post(register))
        .route("/users/verify-email", get(verify_email))
        .route("/users/login", post(login))
        .route("/users/password-reset", post(forget_password))
        .route("/users/password-update", post(update_password))
        .route("/users/token/refresh", post(refresh_token))
        .route("/users/profile", get(profile));

    let loan_routes = Router::new()
        .route("/loans", post(create_loan).get(list_my_loans))
        .route("/loans/:id", get(get_loan));

    let admin_routes = Router::new()
        .route("/admin/loans", get(list_all_loans))
        .route("/admin/loans/:id", axum::routing::delete(delete_loan))
        .route("/admin/loans/:id/:action", patch(transition_loan))
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", get(get_user))
        .route("/admin/logs", get(list_logs));

    Router::new()
        .merge(user_routes)
        .merge(loan_routes)
        .merge(admin_routes)
        .with_state(app_state)
        .merge(create_health_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
