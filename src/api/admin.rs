//! Admin maintenance endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::admin::{CleanupReport, CopyInitReport},
};

use super::AuthenticatedUser;

/// Delete transactions, copies, members and non-admin accounts
#[utoipa::path(
    delete,
    path = "/admin/clean-data",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Data cleaned", body = CleanupReport),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn clean_data(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<CleanupReport>> {
    claims.require_admin()?;

    tracing::warn!("{} requested a data clean-up", claims.sub);
    Ok(Json(state.services.catalog.clean_data().await))
}

/// Create copy #1 for every book without copies
#[utoipa::path(
    post,
    path = "/admin/init-book-copies",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Copies created", body = CopyInitReport),
        (status = 403, description = "Admin access required"),
        (status = 502, description = "Remote store unavailable")
    )
)]
pub async fn init_book_copies(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<CopyInitReport>> {
    claims.require_admin()?;

    let report = state.services.catalog.init_book_copies().await?;
    Ok(Json(report))
}
