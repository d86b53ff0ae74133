//! Authentication endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::user::{Identity, LoginRequest, RegisterRequest, TokenResponse},
};

use super::AuthenticatedUser;

/// Register a member account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid data or e-mail already registered"),
        (status = 502, description = "Remote store unavailable")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state.services.auth.register(request).await?;
    Ok(Json(token))
}

/// Authenticate with e-mail and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .services
        .auth
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(token))
}

/// Identity carried by the bearer token
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current identity", body = Identity),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(AuthenticatedUser(claims): AuthenticatedUser) -> Json<Identity> {
    Json(claims.identity())
}
