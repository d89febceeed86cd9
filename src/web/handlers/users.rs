//! Account handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::web::dto::{
    ApiResponse, LoginRequest, LoginResponse, MessageResponse, PasswordResetRequest,
    PasswordUpdateQuery, PasswordUpdateRequest, RefreshRequest, RefreshResponse,
    RegisterRequest, UserResponse, ValidatedJson, VerifyEmailQuery,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// POST /users/register - Create an inactive account and mail a verification link.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let user = state.accounts.register(&req.email, &req.password).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(user.into()))))
}

/// GET /users/verify-email - Activate an account from the mailed link.
pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .accounts
        .verify_email(&query.token, &query.email)
        .await?;
    Ok(Json(ApiResponse::new(MessageResponse::new(
        "Email verified successfully",
    ))))
}

/// POST /users/login - Exchange credentials for session tokens.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let result = state.accounts.login(&req.email, &req.password).await?;
    Ok(Json(ApiResponse::new(result.into())))
}

/// POST /users/password-reset - Mail a password reset link.
pub async fn forget_password(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<PasswordResetRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.accounts.forget_password(&req.email).await?;
    Ok(Json(ApiResponse::new(MessageResponse::new(
        "Password reset link sent",
    ))))
}

/// POST /users/password-update - Set a new password using the mailed token.
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PasswordUpdateQuery>,
    ValidatedJson(req): ValidatedJson<PasswordUpdateRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .accounts
        .reset_password(&query.token, &query.email, &req.password)
        .await?;
    Ok(Json(ApiResponse::new(MessageResponse::new(
        "Password updated successfully",
    ))))
}

/// POST /users/token/refresh - Issue a new access token.
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<ApiResponse<RefreshResponse>>, ApiError> {
    let access_token = state
        .accounts
        .refresh_access_token(&req.refresh_token)
        .await?;
    Ok(Json(ApiResponse::new(RefreshResponse {
        access_token,
        token_type: "Bearer".to_string(),
    })))
}

/// GET /users/profile - The caller's own account.
pub async fn profile(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.accounts.profile(&identity).await?;
    Ok(Json(ApiResponse::new(user.into())))
}
