//! Persistent query builder over one remote table
//!
//! Every builder call returns a fresh [`TableHandle`]; the receiver is never
//! touched, so handles derived from a shared base can be branched freely.
//! Terminal verbs come in two flavours: `try_*` surfaces [`StoreError`], the
//! plain form logs the failure and yields an empty [`Envelope`].

use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use serde::Serialize;

use super::{
    envelope::Envelope,
    filter::{FilterOperator, OrderBy},
    transport::{CountMode, StoreMethod, StoreRequest, Transport},
};
use crate::error::{StoreError, StoreResult};

/// Accumulated projection, predicates, sort key and limit of a handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    select: String,
    filters: IndexMap<String, String>,
    order: Option<OrderBy>,
    limit: Option<usize>,
    count: Option<CountMode>,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            select: "*".to_string(),
            filters: IndexMap::new(),
            order: None,
            limit: None,
            count: None,
        }
    }
}

impl QueryParams {
    pub fn select(&self) -> &str {
        &self.select
    }

    /// Column → predicate (`eq.42`), in first-insertion order
    pub fn filters(&self) -> &IndexMap<String, String> {
        &self.filters
    }

    pub fn order(&self) -> Option<&OrderBy> {
        self.order.as_ref()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    fn filter_pairs(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.filters.iter().map(|(k, v)| (k.clone(), v.clone()))
    }

    /// Query string of a read: `select`, predicates, `order`, `limit`
    fn read_query(&self) -> Vec<(String, String)> {
        let mut query = vec![("select".to_string(), self.select.clone())];
        query.extend(self.filter_pairs());
        if let Some(order) = &self.order {
            query.push(("order".to_string(), order.to_param()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        query
    }

    /// Query string of a mutation: predicates only
    fn mutation_query(&self) -> Vec<(String, String)> {
        self.filter_pairs().collect()
    }
}

/// Immutable handle on a remote table
#[derive(Clone)]
pub struct TableHandle {
    transport: Arc<dyn Transport>,
    table: Arc<str>,
    params: QueryParams,
}

impl fmt::Debug for TableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableHandle")
            .field("table", &self.table)
            .field("params", &self.params)
            .finish()
    }
}

impl TableHandle {
    pub(crate) fn new(transport: Arc<dyn Transport>, table: &str) -> Self {
        Self {
            transport,
            table: Arc::from(table),
            params: QueryParams::default(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    fn derive(&self, apply: impl FnOnce(&mut QueryParams)) -> Self {
        let mut next = self.clone();
        apply(&mut next.params);
        next
    }

    /// Set the projection expression (`*` by default)
    pub fn select(&self, columns: &str) -> Self {
        let columns = columns.to_string();
        self.derive(|p| p.select = columns)
    }

    /// Set the projection and ask the remote for a row total
    pub fn select_with_count(&self, columns: &str, count: CountMode) -> Self {
        let columns = columns.to_string();
        self.derive(|p| {
            p.select = columns;
            p.count = Some(count);
        })
    }

    /// Add a predicate. A later predicate on the same column replaces the
    /// earlier one in place.
    pub fn filter(&self, column: &str, operator: FilterOperator, value: impl fmt::Display) -> Self {
        let column = column.to_string();
        let predicate = operator.predicate(value);
        self.derive(|p| {
            p.filters.insert(column, predicate);
        })
    }

    pub fn eq(&self, column: &str, value: impl fmt::Display) -> Self {
        self.filter(column, FilterOperator::Eq, value)
    }

    pub fn neq(&self, column: &str, value: impl fmt::Display) -> Self {
        self.filter(column, FilterOperator::Neq, value)
    }

    /// Single sort key; replaces any previous one
    pub fn order(&self, column: &str, descending: bool) -> Self {
        let order = OrderBy {
            column: column.to_string(),
            descending,
        };
        self.derive(|p| p.order = Some(order))
    }

    pub fn limit(&self, n: usize) -> Self {
        self.derive(|p| p.limit = Some(n))
    }

    // Strict terminal verbs

    pub async fn try_fetch(&self) -> StoreResult<Envelope> {
        self.execute(StoreMethod::Get, self.params.read_query(), None)
            .await
    }

    /// Insert one record or a list of records
    pub async fn try_insert<T: Serialize + ?Sized>(&self, records: &T) -> StoreResult<Envelope> {
        let body = serde_json::to_value(records).map_err(|e| StoreError::Encode(e.to_string()))?;
        self.execute(StoreMethod::Post, Vec::new(), Some(body)).await
    }

    pub async fn try_update<T: Serialize + ?Sized>(&self, changes: &T) -> StoreResult<Envelope> {
        self.require_filters("update")?;
        let body = serde_json::to_value(changes).map_err(|e| StoreError::Encode(e.to_string()))?;
        self.execute(StoreMethod::Patch, self.params.mutation_query(), Some(body))
            .await
    }

    pub async fn try_remove(&self) -> StoreResult<Envelope> {
        self.require_filters("delete")?;
        self.execute(StoreMethod::Delete, self.params.mutation_query(), None)
            .await
    }

    // Degrading terminal verbs

    pub async fn fetch(&self) -> Envelope {
        let result = self.try_fetch().await;
        self.degrade("fetch", result)
    }

    pub async fn insert<T: Serialize + ?Sized>(&self, records: &T) -> Envelope {
        let result = self.try_insert(records).await;
        self.degrade("insert", result)
    }

    pub async fn update<T: Serialize + ?Sized>(&self, changes: &T) -> Envelope {
        let result = self.try_update(changes).await;
        self.degrade("update", result)
    }

    pub async fn remove(&self) -> Envelope {
        let result = self.try_remove().await;
        self.degrade("delete", result)
    }

    fn require_filters(&self, verb: &'static str) -> StoreResult<()> {
        if self.params.filters.is_empty() {
            return Err(StoreError::Unfiltered {
                table: self.table.to_string(),
                verb,
            });
        }
        Ok(())
    }

    fn degrade(&self, operation: &str, result: StoreResult<Envelope>) -> Envelope {
        result.unwrap_or_else(|e| {
            tracing::warn!(
                table = %self.table,
                operation,
                error = %e,
                "Remote call failed, returning empty result"
            );
            Envelope::empty()
        })
    }

    async fn execute(
        &self,
        method: StoreMethod,
        query: Vec<(String, String)>,
        body: Option<serde_json::Value>,
    ) -> StoreResult<Envelope> {
        let request = StoreRequest {
            method,
            table: self.table.to_string(),
            query,
            body,
            count: self.params.count,
        };
        let description = request.describe();

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            let snippet: String = response.body.chars().take(200).collect();
            tracing::debug!("{} -> {}: {}", description, response.status, snippet);
            return Err(StoreError::Status {
                status: response.status,
                body: snippet,
            });
        }

        let envelope = Envelope::from_body(&response.body)?
            .with_content_range(response.content_range.as_deref());
        tracing::debug!("{} -> {} ({} rows)", description, response.status, envelope.count);
        Ok(envelope)
    }
}
