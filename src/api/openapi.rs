//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, analytics, auth, books, health, loans, members, my};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library Gateway API",
        version = "1.0.0",
        description = "Library Management REST API backed by a hosted PostgREST endpoint",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Books
        books::list_books,
        books::list_available_books,
        books::create_book,
        books::delete_book,
        books::list_subjects,
        // Members
        members::list_members,
        members::create_member,
        members::delete_member,
        // Transactions
        loans::list_transactions,
        loans::list_current_transactions,
        loans::issue_book,
        loans::return_book,
        // Self-service
        my::my_books,
        my::my_history,
        // Analytics
        analytics::summary,
        analytics::subject_performance,
        // Admin
        admin::clean_data,
        admin::init_book_copies,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::RegisterRequest,
            crate::models::user::LoginRequest,
            crate::models::user::TokenResponse,
            crate::models::user::Identity,
            crate::models::user::Role,
            // Catalog
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::BookCopy,
            crate::models::book::Subject,
            crate::models::member::Member,
            crate::models::member::CreateMember,
            // Transactions
            crate::models::loan::BorrowRecord,
            crate::models::loan::IssueRequest,
            crate::models::loan::LoanDetails,
            crate::models::loan::LoanStatus,
            // Analytics
            crate::models::analytics::AnalyticsSummary,
            crate::models::analytics::LibraryPulse,
            // Admin
            crate::models::admin::CleanupReport,
            crate::models::admin::CopyInitReport,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Book, copy and subject management"),
        (name = "members", description = "Member management"),
        (name = "transactions", description = "Issue and return"),
        (name = "my", description = "Member self-service"),
        (name = "analytics", description = "Library analytics"),
        (name = "admin", description = "Maintenance")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
