//! Borrow records (the `transactions` table) and related types

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::timestamp;

/// One issue/return cycle of a book copy
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowRecord {
    pub id: String,
    pub book_copy_id: String,
    pub member_id: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub issue_date: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::date::deserialize")]
    pub due_date: NaiveDate,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub return_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub fine_amount: f64,
}

fn zero_if_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

impl BorrowRecord {
    pub fn is_returned(&self) -> bool {
        self.return_date.is_some()
    }

    pub fn status(&self) -> LoanStatus {
        if self.is_returned() {
            LoanStatus::Returned
        } else {
            LoanStatus::Active
        }
    }
}

/// Insert payload for a new borrow record
#[derive(Debug, Clone, Serialize)]
pub struct NewBorrowRecord {
    pub book_copy_id: String,
    pub member_id: String,
    pub issue_date: DateTime<Utc>,
    pub due_date: NaiveDate,
}

impl NewBorrowRecord {
    /// Record issued at `issued_at`, due `days` later (date precision).
    /// `None` when the due date falls outside the representable range.
    pub fn issued_at(
        book_copy_id: &str,
        member_id: &str,
        issued_at: DateTime<Utc>,
        days: i64,
    ) -> Option<Self> {
        let due = Duration::try_days(days).and_then(|d| issued_at.checked_add_signed(d))?;
        Some(Self {
            book_copy_id: book_copy_id.to_string(),
            member_id: member_id.to_string(),
            issue_date: issued_at,
            due_date: due.date_naive(),
        })
    }
}

/// Patch payload setting or clearing the return timestamp
#[derive(Debug, Clone, Serialize)]
pub struct ReturnStamp {
    pub return_date: Option<DateTime<Utc>>,
}

/// Issue request parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct IssueRequest {
    /// Copy being lent
    pub book_copy_id: String,
    /// Borrowing member
    pub member_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LoanStatus {
    Active,
    Returned,
}

/// Borrow record joined with the borrowed book, as shown to members
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub transaction_id: String,
    pub book_title: String,
    pub author: String,
    pub issue_date: DateTime<Utc>,
    pub due_date: NaiveDate,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
}
