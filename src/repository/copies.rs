//! Book copies repository

use serde::Deserialize;
use serde_json::json;

use crate::{
    error::StoreResult,
    models::book::NewBookCopy,
    store::{Envelope, RemoteStore, TableHandle},
};

use super::{every_row, tables::BOOK_COPIES};

#[derive(Deserialize)]
struct Availability {
    #[serde(default)]
    is_available: bool,
}

#[derive(Deserialize)]
struct CopyBook {
    book_id: String,
}

#[derive(Clone)]
pub struct CopiesRepository {
    store: RemoteStore,
}

impl CopiesRepository {
    pub fn new(store: RemoteStore) -> Self {
        Self { store }
    }

    fn table(&self) -> TableHandle {
        self.store.table(BOOK_COPIES)
    }

    /// Availability flag of a copy; `None` when the copy does not exist.
    /// A row without the flag reads as unavailable.
    pub async fn availability(&self, copy_id: &str) -> StoreResult<Option<bool>> {
        let envelope = self
            .table()
            .select("is_available")
            .eq("id", copy_id)
            .try_fetch()
            .await?;
        Ok(envelope.first::<Availability>().map(|a| a.is_available))
    }

    /// Set the availability flag of a copy
    pub async fn set_availability(&self, copy_id: &str, available: bool) -> StoreResult<Envelope> {
        self.table()
            .eq("id", copy_id)
            .try_update(&json!({ "is_available": available }))
            .await
    }

    /// Book a copy belongs to, `None` when it cannot be resolved
    pub async fn book_id(&self, copy_id: &str) -> Option<String> {
        self.table()
            .select("book_id")
            .eq("id", copy_id)
            .fetch()
            .await
            .first::<CopyBook>()
            .map(|c| c.book_id)
    }

    /// Whether a book already has at least one copy
    pub async fn has_copies(&self, book_id: &str) -> StoreResult<bool> {
        let envelope = self
            .table()
            .select("id")
            .eq("book_id", book_id)
            .limit(1)
            .try_fetch()
            .await?;
        Ok(!envelope.is_empty())
    }

    /// Create a copy
    pub async fn create(&self, copy: &NewBookCopy) -> Envelope {
        self.table().insert(copy).await
    }

    /// Delete every copy
    pub async fn delete_all(&self) -> Envelope {
        self.table().neq("id", every_row()).remove().await
    }
}
