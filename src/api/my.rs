//! Member self-service endpoints

use axum::{extract::State, Json};

use crate::{error::AppResult, models::loan::LoanDetails};

use super::{AuthenticatedUser, ListResponse};

const NO_PROFILE: &str = "No member profile found";

/// Books the caller currently has on loan
#[utoipa::path(
    get,
    path = "/my/books",
    tag = "my",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active loans", body = [LoanDetails]),
        (status = 401, description = "Not authenticated"),
        (status = 502, description = "Remote store unavailable")
    )
)]
pub async fn my_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ListResponse<LoanDetails>>> {
    let loans = state.services.loans.member_loans(&claims.sub, true).await?;
    Ok(Json(into_list(loans)))
}

/// Every loan of the caller, returned or not
#[utoipa::path(
    get,
    path = "/my/history",
    tag = "my",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Borrowing history", body = [LoanDetails]),
        (status = 401, description = "Not authenticated"),
        (status = 502, description = "Remote store unavailable")
    )
)]
pub async fn my_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ListResponse<LoanDetails>>> {
    let loans = state.services.loans.member_loans(&claims.sub, false).await?;
    Ok(Json(into_list(loans)))
}

fn into_list(loans: Option<Vec<LoanDetails>>) -> ListResponse<LoanDetails> {
    match loans {
        Some(loans) => ListResponse::new(loans),
        None => ListResponse::with_message(Vec::new(), NO_PROFILE),
    }
}
