//! Repository layer over the remote tables

pub mod books;
pub mod copies;
pub mod loans;
pub mod members;
pub mod users;

use uuid::Uuid;

use crate::store::RemoteStore;

/// Remote table and view names
pub mod tables {
    pub const USERS: &str = "users";
    pub const MEMBERS: &str = "members";
    pub const BOOKS: &str = "books";
    pub const BOOK_COPIES: &str = "book_copies";
    pub const TRANSACTIONS: &str = "transactions";
    pub const SUBJECTS: &str = "subjects";
    pub const AVAILABLE_BOOKS_VIEW: &str = "available_books_view";
    pub const CURRENT_TRANSACTIONS_VIEW: &str = "current_transactions_view";
    pub const SUBJECT_PERFORMANCE_VIEW: &str = "subject_performance_view";
}

/// Predicate value matching every real row id (`id=neq.<nil uuid>`), used to
/// get past the unfiltered-mutation guard on deliberate bulk deletes
pub(crate) fn every_row() -> String {
    Uuid::nil().to_string()
}

/// Main repository struct holding the remote store
#[derive(Clone)]
pub struct Repository {
    pub store: RemoteStore,
    pub users: users::UsersRepository,
    pub members: members::MembersRepository,
    pub books: books::BooksRepository,
    pub copies: copies::CopiesRepository,
    pub loans: loans::LoansRepository,
}

impl Repository {
    /// Create a new repository over the given store
    pub fn new(store: RemoteStore) -> Self {
        Self {
            users: users::UsersRepository::new(store.clone()),
            members: members::MembersRepository::new(store.clone()),
            books: books::BooksRepository::new(store.clone()),
            copies: copies::CopiesRepository::new(store.clone()),
            loans: loans::LoansRepository::new(store.clone()),
            store,
        }
    }
}
