//! Loan handlers for applicants.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::loan::{LoanFilter, LoanStatus, SortOrder};
use crate::web::dto::{ApiResponse, CreateLoanRequest, LoanListQuery, LoanResponse, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// Turn listing query parameters into a filter.
pub(crate) fn parse_filter(query: &LoanListQuery) -> Result<LoanFilter, ApiError> {
    let mut filter = LoanFilter::new();
    if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
        filter = filter.status(status.parse::<LoanStatus>().map_err(ApiError::bad_request)?);
    }
    if let Some(order) = query.order.as_deref().filter(|s| !s.is_empty()) {
        filter = filter.order(order.parse::<SortOrder>().map_err(ApiError::bad_request)?);
    }
    Ok(filter)
}

/// POST /loans - Submit a loan application.
pub async fn create_loan(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateLoanRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LoanResponse>>), ApiError> {
    let loan = state.loans.create(&identity, &req.amount).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(loan.into()))))
}

/// GET /loans - The caller's loans.
pub async fn list_my_loans(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Query(query): Query<LoanListQuery>,
) -> Result<Json<ApiResponse<Vec<LoanResponse>>>, ApiError> {
    let filter = parse_filter(&query)?;
    let mut own = identity;
    own.is_admin = false;

    let loans = state.loans.list(filter, &own).await?;
    Ok(Json(ApiResponse::new(
        loans.into_iter().map(LoanResponse::from).collect(),
    )))
}

/// GET /loans/:id - Loan status, for its owner or an admin.
pub async fn get_loan(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(loan_id): Path<i64>,
) -> Result<Json<ApiResponse<LoanResponse>>, ApiError> {
    let loan = state.loans.get_status(loan_id, &identity).await?;
    Ok(Json(ApiResponse::new(loan.into())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        let filter = parse_filter(&LoanListQuery {
            status: Some("pending".to_string()),
            order: Some("desc".to_string()),
        })
        .unwrap();
        assert_eq!(filter.status, Some(LoanStatus::Pending));
        assert_eq!(filter.order, Some(SortOrder::Desc));

        let empty = parse_filter(&LoanListQuery::default()).unwrap();
        assert_eq!(empty, LoanFilter::new());
    }

    #[test]
    fn test_parse_filter_rejects_unknown_values() {
        let bad_status = parse_filter(&LoanListQuery {
            status: Some("lost".to_string()),
            order: None,
        });
        assert!(bad_status.is_err());

        let bad_order = parse_filter(&LoanListQuery {
            status: None,
            order: Some("up".to_string()),
        });
        assert!(bad_order.is_err());
    }
}
