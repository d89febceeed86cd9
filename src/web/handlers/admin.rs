//! Admin handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::loan::LoanStatus;
use crate::web::dto::{
    ApiResponse, LoanListQuery, LoanResponse, LogEntryResponse, MessageResponse, UserResponse,
};
use crate::web::error::ApiError;
use crate::web::handlers::loans::parse_filter;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// GET /admin/loans - Every loan, optionally filtered by status.
pub async fn list_all_loans(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Query(query): Query<LoanListQuery>,
) -> Result<Json<ApiResponse<Vec<LoanResponse>>>, ApiError> {
    identity.require_admin()?;
    let filter = parse_filter(&query)?;

    let loans = state.loans.list(filter, &identity).await?;
    Ok(Json(ApiResponse::new(
        loans.into_iter().map(LoanResponse::from).collect(),
    )))
}

/// PATCH /admin/loans/:id/:action - Approve or reject a pending loan.
pub async fn transition_loan(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path((loan_id, action)): Path<(i64, String)>,
) -> Result<Json<ApiResponse<LoanResponse>>, ApiError> {
    let target = match action.as_str() {
        "approve" => LoanStatus::Approved,
        "reject" => LoanStatus::Rejected,
        other => {
            return Err(ApiError::bad_request(format!(
                "unknown action: {other} (expected approve or reject)"
            )))
        }
    };

    let loan = state.loans.transition(&identity, loan_id, target).await?;
    Ok(Json(ApiResponse::new(loan.into())))
}

/// DELETE /admin/loans/:id - Remove a loan.
pub async fn delete_loan(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(loan_id): Path<i64>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.loans.delete(&identity, loan_id).await?;
    Ok(Json(ApiResponse::new(MessageResponse::new("Loan deleted"))))
}

/// GET /admin/users - Every account.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    let users = state.accounts.list_users(&identity).await?;
    Ok(Json(ApiResponse::new(
        users.into_iter().map(UserResponse::from).collect(),
    )))
}

/// GET /admin/users/:id - One account.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.accounts.get_user(&identity, user_id).await?;
    Ok(Json(ApiResponse::new(user.into())))
}

/// GET /admin/logs - The audit log, newest first.
pub async fn list_logs(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<Json<ApiResponse<Vec<LogEntryResponse>>>, ApiError> {
    let entries = state.audit.list(&identity).await?;
    Ok(Json(ApiResponse::new(
        entries.into_iter().map(LogEntryResponse::from).collect(),
    )))
}
