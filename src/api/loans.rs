//! Transaction (borrow record) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::{
    error::AppResult,
    models::loan::{BorrowRecord, IssueRequest},
};

use super::{AuthenticatedUser, LimitQuery, ListResponse, MessageResponse};

/// List borrow records, newest first
#[utoipa::path(
    get,
    path = "/transactions",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(LimitQuery),
    responses(
        (status = 200, description = "Borrow records", body = [BorrowRecord]),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_transactions(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<ListResponse<BorrowRecord>>> {
    claims.require_admin()?;

    let records = state.services.loans.list(query.limit).await;
    Ok(Json(ListResponse::new(records)))
}

/// Rows of the current loans view
#[utoipa::path(
    get,
    path = "/transactions/current",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(LimitQuery),
    responses(
        (status = 200, description = "Open loans"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_current_transactions(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<ListResponse<Value>>> {
    claims.require_admin()?;

    let rows = state.services.loans.list_current(query.limit).await;
    Ok(Json(ListResponse::new(rows)))
}

/// Lend a copy to a member
#[utoipa::path(
    post,
    path = "/transactions/issue",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(IssueRequest),
    responses(
        (status = 201, description = "Book issued", body = BorrowRecord),
        (status = 400, description = "Copy not available"),
        (status = 404, description = "Member not found"),
        (status = 502, description = "Remote store unavailable")
    )
)]
pub async fn issue_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(request): Query<IssueRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse<BorrowRecord>>)> {
    claims.require_admin()?;

    let record = state
        .services
        .loans
        .issue(&request.book_copy_id, &request.member_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Book issued successfully", record)),
    ))
}

/// Take a copy back
#[utoipa::path(
    post,
    path = "/transactions/{id}/return",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Transaction ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = BorrowRecord),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Already returned"),
        (status = 502, description = "Remote store unavailable")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse<BorrowRecord>>> {
    claims.require_admin()?;

    let record = state.services.loans.return_loan(&id).await?;
    Ok(Json(MessageResponse::new("Book returned successfully", record)))
}
