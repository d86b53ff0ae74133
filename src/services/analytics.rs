//! Admin analytics, computed in memory from whole-table projections

use std::{collections::BTreeMap, time::Duration};

use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::{
    config::CacheConfig,
    error::AppResult,
    models::{analytics::{AnalyticsSummary, LibraryPulse}, timestamp},
    repository::{
        tables::{BOOKS, BOOK_COPIES, MEMBERS, SUBJECT_PERFORMANCE_VIEW, TRANSACTIONS},
        Repository,
    },
};

use super::cache::TtlCache;

const SUMMARY_KEY: &str = "analytics:summary";
const SUBJECTS_KEY: &str = "analytics:subjects";

#[derive(Clone)]
pub struct AnalyticsService {
    repository: Repository,
    summaries: TtlCache<AnalyticsSummary>,
    subjects: TtlCache<Vec<Value>>,
}

impl AnalyticsService {
    pub fn new(repository: Repository, config: &CacheConfig) -> Self {
        let ttl = Duration::from_secs(config.ttl_seconds);
        Self {
            repository,
            summaries: TtlCache::new(ttl),
            subjects: TtlCache::new(ttl),
        }
    }

    /// Library summary, memoized for the cache TTL
    pub async fn summary(&self) -> AppResult<AnalyticsSummary> {
        self.summaries
            .get_or_try_insert(SUMMARY_KEY, || self.compute_summary())
            .await
    }

    /// Rows of the subject performance view, memoized for the cache TTL
    pub async fn subject_performance(&self) -> AppResult<Vec<Value>> {
        self.subjects
            .get_or_try_insert(SUBJECTS_KEY, || async {
                let envelope = self
                    .repository
                    .store
                    .table(SUBJECT_PERFORMANCE_VIEW)
                    .try_fetch()
                    .await?;
                Ok(envelope.rows)
            })
            .await
    }

    async fn compute_summary(&self) -> AppResult<AnalyticsSummary> {
        let store = &self.repository.store;
        let books = store.table(BOOKS).select("id,language");
        let members = store.table(MEMBERS).select("id,member_type");
        let copies = store.table(BOOK_COPIES).select("id,is_available");
        let transactions = store.table(TRANSACTIONS).select("id,return_date,due_date");

        let (books, members, copies, transactions) = tokio::try_join!(
            books.try_fetch(),
            members.try_fetch(),
            copies.try_fetch(),
            transactions.try_fetch(),
        )?;

        tracing::debug!(
            books = books.count,
            members = members.count,
            copies = copies.count,
            transactions = transactions.count,
            "computing analytics summary"
        );

        Ok(summarize(
            &books.rows,
            &members.rows,
            &copies.rows,
            &transactions.rows,
            Utc::now().date_naive(),
        ))
    }
}

/// Aggregate the four projections. A copy row without an availability flag
/// counts as available; an explicit null does not.
pub fn summarize(
    books: &[Value],
    members: &[Value],
    copies: &[Value],
    transactions: &[Value],
    today: NaiveDate,
) -> AnalyticsSummary {
    let available_copies = copies
        .iter()
        .filter(|c| match c.get("is_available") {
            None => true,
            Some(flag) => flag.as_bool().unwrap_or(false),
        })
        .count();

    let overdue_count = transactions
        .iter()
        .filter(|t| is_overdue(t, today))
        .count();

    let pulse = LibraryPulse {
        total_books: books.len(),
        total_copies: copies.len(),
        available_copies,
        issued_copies: copies.len() - available_copies,
        overdue_count,
        active_members: members.len(),
    };

    AnalyticsSummary {
        pulse,
        total_books: books.len(),
        total_members: members.len(),
        by_member_type: tally(members, "member_type"),
        by_language: tally(books, "language"),
    }
}

fn is_overdue(transaction: &Value, today: NaiveDate) -> bool {
    let returned = match transaction.get("return_date") {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    };
    if returned {
        return false;
    }
    transaction
        .get("due_date")
        .and_then(Value::as_str)
        .and_then(timestamp::date::parse)
        .is_some_and(|due| due < today)
}

fn tally(rows: &[Value], column: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        let key = row
            .get(column)
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string();
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        store::{memory::MemoryTransport, transport::StoreMethod},
    };
    use serde_json::json;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_overdue_rules() {
        let transactions = vec![
            json!({"id": "t1", "due_date": "2024-01-01", "return_date": null}),
            json!({"id": "t2", "due_date": "2024-01-01", "return_date": "2024-01-05T10:00:00"}),
            json!({"id": "t3", "due_date": "2024-01-02", "return_date": null}),
            json!({"id": "t4", "due_date": null, "return_date": null}),
        ];
        let summary = summarize(&[], &[], &[], &transactions, day(2));
        assert_eq!(summary.pulse.overdue_count, 1);

        let summary = summarize(&[], &[], &[], &transactions, day(3));
        assert_eq!(summary.pulse.overdue_count, 2);
    }

    #[test]
    fn test_copy_and_bucket_counts() {
        let books = vec![
            json!({"id": "b1", "language": "English"}),
            json!({"id": "b2", "language": "French"}),
            json!({"id": "b3", "language": "English"}),
            json!({"id": "b4"}),
        ];
        let members = vec![
            json!({"id": "m1", "member_type": "Student"}),
            json!({"id": "m2", "member_type": null}),
        ];
        let copies = vec![
            json!({"id": "c1", "is_available": true}),
            json!({"id": "c2", "is_available": false}),
            json!({"id": "c3"}),
            json!({"id": "c4", "is_available": null}),
        ];

        let summary = summarize(&books, &members, &copies, &[], day(1));
        assert_eq!(summary.pulse.total_copies, 4);
        assert_eq!(summary.pulse.available_copies, 2);
        assert_eq!(summary.pulse.issued_copies, 2);
        assert_eq!(summary.pulse.active_members, 2);
        assert_eq!(summary.total_books, 4);
        assert_eq!(summary.by_language["English"], 2);
        assert_eq!(summary.by_language["Unknown"], 1);
        assert_eq!(summary.by_member_type["Student"], 1);
        assert_eq!(summary.by_member_type["Unknown"], 1);
    }

    #[tokio::test]
    async fn test_summary_is_memoized() {
        let memory = MemoryTransport::new();
        memory.seed(BOOKS, vec![json!({"id": "b1", "language": "English"})]);
        let analytics = AnalyticsService::new(Repository::new(memory.store()), &CacheConfig::default());

        let first = analytics.summary().await.unwrap();
        memory.seed(BOOKS, vec![json!({"id": "b2", "language": "English"})]);
        let second = analytics.summary().await.unwrap();

        assert_eq!(first.total_books, 1);
        assert_eq!(second, first);
        assert_eq!(memory.count_calls(StoreMethod::Get, BOOKS), 1);
    }

    #[tokio::test]
    async fn test_failed_summary_is_not_cached() {
        let memory = MemoryTransport::new();
        memory.fail(StoreMethod::Get, MEMBERS, 1);
        let analytics = AnalyticsService::new(Repository::new(memory.store()), &CacheConfig::default());

        let err = analytics.summary().await.unwrap_err();
        assert!(matches!(err, AppError::RemoteUnavailable(_)));

        assert!(analytics.summary().await.is_ok());
    }
}
