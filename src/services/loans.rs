//! Borrow/return workflow
//!
//! Issue and return each touch two tables (`transactions`, `book_copies`)
//! through independent calls. The availability flip is idempotent and is
//! retried; when it still fails, the flag is written back and the
//! borrow-record change made just before it is undone, so the copy flag and
//! the open records keep agreeing even when a flip landed but its response
//! was lost.

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde_json::Value;

use crate::{
    config::WorkflowConfig,
    error::{AppError, AppResult, StoreError, StoreResult},
    models::loan::{BorrowRecord, LoanDetails, NewBorrowRecord},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    config: WorkflowConfig,
}

impl LoansService {
    pub fn new(repository: Repository, config: WorkflowConfig) -> Self {
        Self { repository, config }
    }

    /// List borrow records, newest first
    pub async fn list(&self, limit: usize) -> Vec<BorrowRecord> {
        self.repository.loans.list(limit).await
    }

    /// Rows of the current-loans view
    pub async fn list_current(&self, limit: usize) -> Vec<Value> {
        self.repository.loans.list_current(limit).await
    }

    /// Lend a copy to a member
    pub async fn issue(&self, copy_id: &str, member_id: &str) -> AppResult<BorrowRecord> {
        self.issue_at(copy_id, member_id, Utc::now()).await
    }

    pub(crate) async fn issue_at(
        &self,
        copy_id: &str,
        member_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<BorrowRecord> {
        if self.repository.copies.availability(copy_id).await? != Some(true) {
            return Err(AppError::CopyUnavailable(copy_id.to_string()));
        }

        let member = self
            .repository
            .members
            .get_by_id(member_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", member_id)))?;
        let days = member.borrow_days(self.config.default_borrow_days);
        let new_record = NewBorrowRecord::issued_at(copy_id, member_id, now, days).ok_or_else(|| {
            AppError::Validation(format!(
                "Borrow duration of {} days for member {} is out of range",
                days, member_id
            ))
        })?;

        let record = self
            .repository
            .loans
            .create(&new_record)
            .await?
            .ok_or_else(|| AppError::Internal("Remote store did not return the new transaction".to_string()))?;

        if let Err(e) = self.flip_availability(copy_id, false).await {
            self.undo_issue(&record).await;
            return Err(e.into());
        }

        tracing::info!(
            "Issued copy {} to member {} (transaction {}, due {})",
            copy_id,
            member_id,
            record.id,
            record.due_date
        );
        Ok(record)
    }

    /// Take a copy back. Returning an already returned record is rejected
    /// and leaves the copy untouched.
    pub async fn return_loan(&self, transaction_id: &str) -> AppResult<BorrowRecord> {
        self.return_at(transaction_id, Utc::now()).await
    }

    pub(crate) async fn return_at(
        &self,
        transaction_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<BorrowRecord> {
        let record = self
            .repository
            .loans
            .get_by_id(transaction_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transaction {} not found", transaction_id)))?;

        if record.is_returned() {
            return Err(AppError::AlreadyReturned(transaction_id.to_string()));
        }

        self.repository
            .loans
            .set_return_date(transaction_id, Some(now))
            .await?;

        if let Err(e) = self.flip_availability(&record.book_copy_id, true).await {
            self.undo_return(&record).await;
            return Err(e.into());
        }

        tracing::info!(
            "Returned transaction {} (copy {})",
            transaction_id,
            record.book_copy_id
        );
        Ok(BorrowRecord {
            return_date: Some(now),
            ..record
        })
    }

    /// Roll back an issue whose flag flip failed. The flip may have landed
    /// with only its response lost, so the flag is put back first. When that
    /// fails too the record stays open: it can still be closed through a
    /// normal return, which rewrites the flag.
    async fn undo_issue(&self, record: &BorrowRecord) {
        if let Err(e) = self
            .repository
            .copies
            .set_availability(&record.book_copy_id, true)
            .await
        {
            tracing::error!(
                "Transaction {} kept open: could not restore availability of copy {}: {}",
                record.id,
                record.book_copy_id,
                e
            );
            return;
        }
        if let Err(e) = self.repository.loans.delete(&record.id).await {
            tracing::error!(
                "Transaction {} left open on copy {} that is marked available: {}",
                record.id,
                record.book_copy_id,
                e
            );
        }
    }

    /// Reopen a record whose return flip failed, flagging the copy on loan again
    async fn undo_return(&self, record: &BorrowRecord) {
        if let Err(e) = self
            .repository
            .copies
            .set_availability(&record.book_copy_id, false)
            .await
        {
            tracing::error!(
                "Could not flag copy {} on loan again after failed return of {}: {}",
                record.book_copy_id,
                record.id,
                e
            );
        }
        if let Err(e) = self.repository.loans.set_return_date(&record.id, None).await {
            tracing::error!(
                "Transaction {} marked returned but copy {} may still be flagged on loan: {}",
                record.id,
                record.book_copy_id,
                e
            );
        }
    }

    async fn flip_availability(&self, copy_id: &str, available: bool) -> StoreResult<()> {
        let attempts = self.config.flip_attempts.max(1);
        let mut last_error = StoreError::Transport("no attempt made".to_string());

        for attempt in 1..=attempts {
            match self.repository.copies.set_availability(copy_id, available).await {
                Ok(envelope) => {
                    if envelope.is_empty() {
                        tracing::warn!("Availability update matched no copy with id {}", copy_id);
                    }
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(
                        "Setting availability of copy {} failed (attempt {}/{}): {}",
                        copy_id,
                        attempt,
                        attempts,
                        e
                    );
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    /// Loans of the member linked to `email`, joined with book title and
    /// author. `None` when no member profile exists for the e-mail.
    pub async fn member_loans(
        &self,
        email: &str,
        active_only: bool,
    ) -> AppResult<Option<Vec<LoanDetails>>> {
        let Some(member_id) = self.repository.members.find_id_by_email(email).await? else {
            return Ok(None);
        };

        let records = self.repository.loans.for_member(&member_id).await?;
        let pending = records
            .into_iter()
            .filter(|r| !active_only || !r.is_returned())
            .map(|r| self.with_book(r));

        // join_all keeps input order; unresolved records are dropped in place
        let details = join_all(pending).await.into_iter().flatten().collect();
        Ok(Some(details))
    }

    async fn with_book(&self, record: BorrowRecord) -> Option<LoanDetails> {
        let book_id = self.repository.copies.book_id(&record.book_copy_id).await?;
        let book = self.repository.books.title(&book_id).await?;

        Some(LoanDetails {
            status: record.status(),
            transaction_id: record.id,
            book_title: book.title,
            author: book.author,
            issue_date: record.issue_date,
            due_date: record.due_date,
            return_date: record.return_date,
        })
    }
}
