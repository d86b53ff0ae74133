//! Analytics endpoints

use axum::{extract::State, Json};
use serde_json::Value;

use crate::{error::AppResult, models::analytics::AnalyticsSummary};

use super::{AuthenticatedUser, ListResponse};

/// Library summary
#[utoipa::path(
    get,
    path = "/analytics/summary",
    tag = "analytics",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Summary figures", body = AnalyticsSummary),
        (status = 403, description = "Admin access required"),
        (status = 502, description = "Remote store unavailable")
    )
)]
pub async fn summary(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<AnalyticsSummary>> {
    claims.require_admin()?;

    let summary = state.services.analytics.summary().await?;
    Ok(Json(summary))
}

/// Per-subject circulation figures
#[utoipa::path(
    get,
    path = "/analytics/subjects",
    tag = "analytics",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Rows of the subject performance view"),
        (status = 403, description = "Admin access required"),
        (status = 502, description = "Remote store unavailable")
    )
)]
pub async fn subject_performance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ListResponse<Value>>> {
    claims.require_admin()?;

    let rows = state.services.analytics.subject_performance().await?;
    Ok(Json(ListResponse::new(rows)))
}
