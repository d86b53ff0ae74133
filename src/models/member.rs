//! Library members

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Row of the `members` table
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Member {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    pub member_type: Option<String>,
    pub phone: Option<String>,
    pub borrowing_limit: Option<i32>,
    pub max_borrow_days: Option<i64>,
}

impl Member {
    /// Borrow duration in days, `default` when unset or non-positive
    pub fn borrow_days(&self, default: i64) -> i64 {
        self.max_borrow_days.filter(|d| *d > 0).unwrap_or(default)
    }
}

/// Create member request (also used when a reader self-registers)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMember {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_member_type")]
    pub member_type: String,
}

pub fn default_member_type() -> String {
    "Student".to_string()
}
