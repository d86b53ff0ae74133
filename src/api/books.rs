//! Book and subject endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::{
    error::AppResult,
    models::book::{Book, CreateBook, Subject},
};

use super::{AuthenticatedUser, LimitQuery, ListResponse, MessageResponse};

/// List books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(LimitQuery),
    responses(
        (status = 200, description = "Books", body = [Book]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<ListResponse<Book>>> {
    claims.require_admin()?;

    let books = state.services.catalog.list_books(query.limit).await;
    Ok(Json(ListResponse::new(books)))
}

/// List books that have a copy on the shelf
#[utoipa::path(
    get,
    path = "/books/available",
    tag = "books",
    security(("bearer_auth" = [])),
    params(LimitQuery),
    responses(
        (status = 200, description = "Rows of the available books view"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_available_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<ListResponse<Value>>> {
    claims.require_admin()?;

    let rows = state.services.catalog.available_books(query.limit).await;
    Ok(Json(ListResponse::new(rows)))
}

/// Add a book together with its first copy
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = [Book]),
        (status = 400, description = "Invalid data"),
        (status = 403, description = "Admin access required"),
        (status = 502, description = "Remote store unavailable")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<MessageResponse<Vec<Book>>>)> {
    claims.require_admin()?;

    let created = state.services.catalog.add_book(book).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Book added successfully", created)),
    ))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book deleted"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse<Vec<Value>>>> {
    claims.require_admin()?;

    let removed = state.services.catalog.delete_book(&id).await;
    Ok(Json(MessageResponse::new("Book deleted successfully", removed)))
}

/// List subjects
#[utoipa::path(
    get,
    path = "/subjects",
    tag = "books",
    responses(
        (status = 200, description = "Subjects", body = [Subject]),
        (status = 502, description = "Remote store unavailable")
    )
)]
pub async fn list_subjects(
    State(state): State<crate::AppState>,
) -> AppResult<Json<ListResponse<Subject>>> {
    let subjects = state.services.catalog.subjects().await?;
    Ok(Json(ListResponse::new(subjects)))
}
