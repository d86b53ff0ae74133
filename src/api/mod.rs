//! API handlers for the library gateway REST endpoints

pub mod admin;
pub mod analytics;
pub mod auth;
pub mod books;
pub mod health;
pub mod loans;
pub mod my;
pub mod members;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::IntoParams;

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// List response wrapper
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            count: data.len(),
            data,
            message: None,
        }
    }

    pub fn with_message(data: Vec<T>, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(data)
        }
    }
}

/// Acknowledgement carrying the affected rows
#[derive(Debug, Serialize)]
pub struct MessageResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T> MessageResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

/// Row limit for list endpoints
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    /// Maximum number of rows (default: 100)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

/// Build the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Authentication
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/available", get(books::list_available_books))
        .route("/books/:id", delete(books::delete_book))
        .route("/subjects", get(books::list_subjects))
        // Members
        .route("/members", get(members::list_members).post(members::create_member))
        .route("/members/:id", delete(members::delete_member))
        // Transactions
        .route("/transactions", get(loans::list_transactions))
        .route("/transactions/current", get(loans::list_current_transactions))
        .route("/transactions/issue", post(loans::issue_book))
        .route("/transactions/:id/return", post(loans::return_book))
        // Member self-service
        .route("/my/books", get(my::my_books))
        .route("/my/history", get(my::my_history))
        // Analytics
        .route("/analytics/summary", get(analytics::summary))
        .route("/analytics/subjects", get(analytics::subject_performance))
        // Admin upkeep
        .route("/admin/clean-data", delete(admin::clean_data))
        .route("/admin/init-book-copies", post(admin::init_book_copies))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
