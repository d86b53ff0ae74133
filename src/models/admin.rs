//! Admin maintenance reports

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Rows removed by `DELETE /admin/clean-data`. Books and subjects are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CleanupReport {
    pub transactions: usize,
    pub book_copies: usize,
    pub members: usize,
    pub users: usize,
    pub message: String,
}

/// Outcome of `POST /admin/init-book-copies`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CopyInitReport {
    pub created: usize,
    pub total_books: usize,
    pub message: String,
}
