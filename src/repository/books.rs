//! Books and subjects repository

use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::StoreResult,
    models::book::{Book, BookTitle, CreateBook, Subject},
    store::{Envelope, RemoteStore, TableHandle},
};

use super::tables::{AVAILABLE_BOOKS_VIEW, BOOKS, SUBJECTS};

#[derive(Deserialize)]
struct RowId {
    id: String,
}

#[derive(Clone)]
pub struct BooksRepository {
    store: RemoteStore,
}

impl BooksRepository {
    pub fn new(store: RemoteStore) -> Self {
        Self { store }
    }

    fn table(&self) -> TableHandle {
        self.store.table(BOOKS)
    }

    /// List books
    pub async fn list(&self, limit: usize) -> Vec<Book> {
        self.table().limit(limit).fetch().await.decode()
    }

    /// Rows of the available-books view, passed through untouched
    pub async fn list_available(&self, limit: usize) -> Vec<Value> {
        self.store
            .table(AVAILABLE_BOOKS_VIEW)
            .limit(limit)
            .fetch()
            .await
            .rows
    }

    /// Title and author of a book, `None` when it cannot be resolved
    pub async fn title(&self, book_id: &str) -> Option<BookTitle> {
        self.table()
            .select("title,author")
            .eq("id", book_id)
            .fetch()
            .await
            .first()
    }

    /// IDs of every book
    pub async fn all_ids(&self) -> StoreResult<Vec<String>> {
        let envelope = self.table().select("id").try_fetch().await?;
        Ok(envelope.decode::<RowId>().into_iter().map(|r| r.id).collect())
    }

    /// Create a book
    pub async fn create(&self, book: &CreateBook) -> StoreResult<Vec<Book>> {
        Ok(self.table().try_insert(book).await?.decode())
    }

    /// Delete a book
    pub async fn delete(&self, id: &str) -> Envelope {
        self.table().eq("id", id).remove().await
    }

    /// List subjects
    pub async fn subjects(&self) -> StoreResult<Vec<Subject>> {
        Ok(self.store.table(SUBJECTS).try_fetch().await?.decode())
    }

    /// First subject on record, the default for books created without one
    pub async fn first_subject_id(&self) -> Option<String> {
        self.store
            .table(SUBJECTS)
            .select("id")
            .limit(1)
            .fetch()
            .await
            .first::<RowId>()
            .map(|r| r.id)
    }
}
