//! Data models for the library gateway

pub mod admin;
pub mod analytics;
pub mod book;
pub mod loan;
pub mod member;
pub mod timestamp;
pub mod user;

// Re-export commonly used types
pub use admin::{CleanupReport, CopyInitReport};
pub use analytics::{AnalyticsSummary, LibraryPulse};
pub use book::{Book, BookCopy, Subject};
pub use loan::{BorrowRecord, LoanDetails, LoanStatus};
pub use member::Member;
pub use user::{Role, UserClaims};
