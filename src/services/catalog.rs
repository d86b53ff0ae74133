//! Catalog management: books, copies, members, subjects and admin upkeep

use serde_json::Value;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        admin::{CleanupReport, CopyInitReport},
        book::{Book, CreateBook, NewBookCopy, Subject},
        member::{CreateMember, Member},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_books(&self, limit: usize) -> Vec<Book> {
        self.repository.books.list(limit).await
    }

    pub async fn available_books(&self, limit: usize) -> Vec<Value> {
        self.repository.books.list_available(limit).await
    }

    /// Create a book and its first copy. Without a subject the first known
    /// subject is used.
    pub async fn add_book(&self, mut book: CreateBook) -> AppResult<Vec<Book>> {
        book.validate()?;

        if book.subject_id.is_none() {
            book.subject_id = self.repository.books.first_subject_id().await;
        }

        let created = self.repository.books.create(&book).await?;
        let Some(first) = created.first() else {
            return Err(AppError::Internal("Remote store did not return the new book".to_string()));
        };

        if self
            .repository
            .copies
            .create(&NewBookCopy::first_for(&first.id))
            .await
            .is_empty()
        {
            tracing::warn!("Book {} created without a copy", first.id);
        }

        tracing::info!("Added book {} ({})", first.id, first.title);
        Ok(created)
    }

    /// Delete a book, returning the removed rows
    pub async fn delete_book(&self, id: &str) -> Vec<Value> {
        self.repository.books.delete(id).await.rows
    }

    pub async fn list_members(&self, limit: usize) -> Vec<Member> {
        self.repository.members.list(limit).await
    }

    pub async fn add_member(&self, member: CreateMember) -> AppResult<Vec<Member>> {
        member.validate()?;
        Ok(self.repository.members.create(&member).await)
    }

    pub async fn delete_member(&self, id: &str) -> Vec<Value> {
        self.repository.members.delete(id).await.rows
    }

    pub async fn subjects(&self) -> AppResult<Vec<Subject>> {
        Ok(self.repository.books.subjects().await?)
    }

    /// Remove circulation data, members and non-admin accounts. Books and
    /// subjects are kept. Children go before parents.
    pub async fn clean_data(&self) -> CleanupReport {
        let transactions = self.repository.loans.delete_all().await.count;
        let book_copies = self.repository.copies.delete_all().await.count;
        let members = self.repository.members.delete_all().await.count;
        let users = self.repository.users.delete_non_admins().await.count;

        tracing::warn!(
            transactions,
            book_copies,
            members,
            users,
            "circulation data cleaned"
        );

        CleanupReport {
            transactions,
            book_copies,
            members,
            users,
            message: "Data cleaned successfully. Books preserved.".to_string(),
        }
    }

    /// Give every copy-less book its first copy
    pub async fn init_book_copies(&self) -> AppResult<CopyInitReport> {
        let book_ids = self.repository.books.all_ids().await?;
        let mut created = 0;

        for book_id in &book_ids {
            if self.repository.copies.has_copies(book_id).await? {
                continue;
            }
            if !self
                .repository
                .copies
                .create(&NewBookCopy::first_for(book_id))
                .await
                .is_empty()
            {
                created += 1;
            }
        }

        Ok(CopyInitReport {
            created,
            total_books: book_ids.len(),
            message: format!("Created {} book copies", created),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        repository::tables::{BOOKS, BOOK_COPIES, MEMBERS, SUBJECTS, TRANSACTIONS, USERS},
        store::{memory::MemoryTransport, transport::StoreMethod},
    };
    use serde_json::json;

    fn service(memory: &MemoryTransport) -> CatalogService {
        CatalogService::new(Repository::new(memory.store()))
    }

    fn create_book(subject_id: Option<&str>) -> CreateBook {
        CreateBook {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            isbn: None,
            language: "English".to_string(),
            subject_id: subject_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_add_book_defaults_subject_and_creates_copy() {
        let memory = MemoryTransport::new();
        memory.seed(SUBJECTS, vec![json!({"id": "s1", "name": "Fiction", "code": "FIC"})]);

        let created = service(&memory).add_book(create_book(None)).await.unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].subject_id.as_deref(), Some("s1"));

        let copies = memory.rows(BOOK_COPIES);
        assert_eq!(copies.len(), 1);
        assert_eq!(copies[0]["book_id"], json!(created[0].id));
        assert_eq!(copies[0]["copy_number"], 1);
        assert_eq!(copies[0]["is_available"], true);
    }

    #[tokio::test]
    async fn test_add_book_keeps_explicit_subject() {
        let memory = MemoryTransport::new();
        memory.seed(SUBJECTS, vec![json!({"id": "s1"})]);

        let created = service(&memory).add_book(create_book(Some("s9"))).await.unwrap();
        assert_eq!(created[0].subject_id.as_deref(), Some("s9"));
        assert_eq!(memory.count_calls(StoreMethod::Get, SUBJECTS), 0);
    }

    #[tokio::test]
    async fn test_add_book_requires_title() {
        let memory = MemoryTransport::new();
        let mut book = create_book(None);
        book.title.clear();

        let err = service(&memory).add_book(book).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(memory.rows(BOOKS).is_empty());
    }

    #[tokio::test]
    async fn test_clean_data_keeps_books_and_admins() {
        let memory = MemoryTransport::new();
        memory.seed(BOOKS, vec![json!({"id": "b1"})]);
        memory.seed(BOOK_COPIES, vec![json!({"id": "c1", "book_id": "b1"})]);
        memory.seed(MEMBERS, vec![json!({"id": "m1"}), json!({"id": "m2"})]);
        memory.seed(TRANSACTIONS, vec![json!({"id": "t1"})]);
        memory.seed(
            USERS,
            vec![
                json!({"id": "u1", "email": "admin@library.com", "role": "admin"}),
                json!({"id": "u2", "email": "ada@example.com", "role": "member"}),
            ],
        );

        let report = service(&memory).clean_data().await;
        assert_eq!(
            (report.transactions, report.book_copies, report.members, report.users),
            (1, 1, 2, 1)
        );
        assert_eq!(memory.rows(BOOKS).len(), 1);
        assert_eq!(memory.rows(USERS)[0]["email"], "admin@library.com");
        assert!(memory.rows(MEMBERS).is_empty());
    }

    #[tokio::test]
    async fn test_init_book_copies_only_fills_gaps() {
        let memory = MemoryTransport::new();
        memory.seed(BOOKS, vec![json!({"id": "b1"}), json!({"id": "b2"}), json!({"id": "b3"})]);
        memory.seed(BOOK_COPIES, vec![json!({"id": "c1", "book_id": "b2"})]);

        let report = service(&memory).init_book_copies().await.unwrap();
        assert_eq!(report.created, 2);
        assert_eq!(report.total_books, 3);
        assert_eq!(memory.rows(BOOK_COPIES).len(), 3);

        let again = service(&memory).init_book_copies().await.unwrap();
        assert_eq!(again.created, 0);
    }
}
