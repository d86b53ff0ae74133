//! Books, physical copies and subjects

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Row of the `books` table
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: String,
    pub isbn: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    pub language: Option<String>,
    pub pages: Option<i32>,
    pub subject_id: Option<String>,
}

/// Title/author projection used to enrich borrow records
#[derive(Debug, Clone, Deserialize)]
pub struct BookTitle {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
}

/// Create book request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    /// Falls back to the first known subject when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
}

fn default_language() -> String {
    "English".to_string()
}

/// Row of the `book_copies` table
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookCopy {
    pub id: String,
    pub book_id: String,
    #[serde(default = "first_copy")]
    pub copy_number: i32,
    pub condition: Option<String>,
    #[serde(default = "available")]
    pub is_available: bool,
    #[serde(default)]
    pub issue_count: i32,
}

/// Insert payload for `book_copies`
#[derive(Debug, Clone, Serialize)]
pub struct NewBookCopy {
    pub book_id: String,
    pub copy_number: i32,
    pub condition: String,
    pub is_available: bool,
}

impl NewBookCopy {
    /// Copy #1 in good condition, on the shelf
    pub fn first_for(book_id: &str) -> Self {
        Self {
            book_id: book_id.to_string(),
            copy_number: 1,
            condition: "Good".to_string(),
            is_available: true,
        }
    }
}

/// Row of the `subjects` table
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Subject {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    pub description: Option<String>,
}

fn first_copy() -> i32 {
    1
}

fn available() -> bool {
    true
}
