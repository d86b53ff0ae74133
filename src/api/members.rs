//! Member management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::{
    error::AppResult,
    models::member::{CreateMember, Member},
};

use super::{AuthenticatedUser, LimitQuery, ListResponse, MessageResponse};

/// List members
#[utoipa::path(
    get,
    path = "/members",
    tag = "members",
    security(("bearer_auth" = [])),
    params(LimitQuery),
    responses(
        (status = 200, description = "Members", body = [Member]),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_members(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<ListResponse<Member>>> {
    claims.require_admin()?;

    let members = state.services.catalog.list_members(query.limit).await;
    Ok(Json(ListResponse::new(members)))
}

/// Add a member
#[utoipa::path(
    post,
    path = "/members",
    tag = "members",
    security(("bearer_auth" = [])),
    request_body = CreateMember,
    responses(
        (status = 201, description = "Member created", body = [Member]),
        (status = 400, description = "Invalid data"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn create_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(member): Json<CreateMember>,
) -> AppResult<(StatusCode, Json<MessageResponse<Vec<Member>>>)> {
    claims.require_admin()?;

    let created = state.services.catalog.add_member(member).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Member added successfully", created)),
    ))
}

/// Delete a member
#[utoipa::path(
    delete,
    path = "/members/{id}",
    tag = "members",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member deleted"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn delete_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse<Vec<Value>>>> {
    claims.require_admin()?;

    let removed = state.services.catalog.delete_member(&id).await;
    Ok(Json(MessageResponse::new("Member deleted successfully", removed)))
}
