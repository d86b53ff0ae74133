//! Borrow records repository (`transactions` table)

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    error::StoreResult,
    models::loan::{BorrowRecord, NewBorrowRecord, ReturnStamp},
    store::{Envelope, RemoteStore, TableHandle},
};

use super::{
    every_row,
    tables::{CURRENT_TRANSACTIONS_VIEW, TRANSACTIONS},
};

#[derive(Clone)]
pub struct LoansRepository {
    store: RemoteStore,
}

impl LoansRepository {
    pub fn new(store: RemoteStore) -> Self {
        Self { store }
    }

    fn table(&self) -> TableHandle {
        self.store.table(TRANSACTIONS)
    }

    /// List borrow records, newest first
    pub async fn list(&self, limit: usize) -> Vec<BorrowRecord> {
        self.table()
            .order("issue_date", true)
            .limit(limit)
            .fetch()
            .await
            .decode()
    }

    /// Rows of the current-loans view, passed through untouched
    pub async fn list_current(&self, limit: usize) -> Vec<Value> {
        self.store
            .table(CURRENT_TRANSACTIONS_VIEW)
            .limit(limit)
            .fetch()
            .await
            .rows
    }

    /// Get borrow record by ID
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<BorrowRecord>> {
        let envelope = self.table().eq("id", id).try_fetch().await?;
        Ok(envelope.first())
    }

    /// Every borrow record of a member, oldest first
    pub async fn for_member(&self, member_id: &str) -> StoreResult<Vec<BorrowRecord>> {
        let envelope = self
            .table()
            .eq("member_id", member_id)
            .order("issue_date", false)
            .try_fetch()
            .await?;
        Ok(envelope.decode())
    }

    /// Create a borrow record, returning the stored row
    pub async fn create(&self, record: &NewBorrowRecord) -> StoreResult<Option<BorrowRecord>> {
        Ok(self.table().try_insert(record).await?.first())
    }

    /// Set (or clear, with `None`) the return timestamp
    pub async fn set_return_date(
        &self,
        id: &str,
        returned_at: Option<DateTime<Utc>>,
    ) -> StoreResult<Envelope> {
        self.table()
            .eq("id", id)
            .try_update(&ReturnStamp { return_date: returned_at })
            .await
    }

    /// Delete a borrow record
    pub async fn delete(&self, id: &str) -> StoreResult<Envelope> {
        self.table().eq("id", id).try_remove().await
    }

    /// Delete every borrow record
    pub async fn delete_all(&self) -> Envelope {
        self.table().neq("id", every_row()).remove().await
    }
}
