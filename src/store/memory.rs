//! In-memory stand-in for the remote endpoint, used by unit tests

use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{
    filter::FilterOperator,
    transport::{StoreMethod, StoreRequest, StoreResponse, Transport},
    RemoteStore,
};
use crate::error::{StoreError, StoreResult};

#[derive(Default)]
struct State {
    tables: HashMap<String, Vec<Value>>,
    calls: Vec<StoreRequest>,
    failures: Vec<(StoreMethod, String, usize)>,
    lost_responses: Vec<(StoreMethod, String, usize)>,
    next_id: u64,
}

/// Interprets the query grammar over in-memory tables
#[derive(Clone, Default)]
pub struct MemoryTransport {
    state: Arc<Mutex<State>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> RemoteStore {
        RemoteStore::new(Arc::new(self.clone()))
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut state = self.state.lock().unwrap();
        state.tables.entry(table.to_string()).or_default().extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        let state = self.state.lock().unwrap();
        state.tables.get(table).cloned().unwrap_or_default()
    }

    pub fn row(&self, table: &str, id: &str) -> Option<Value> {
        self.rows(table).into_iter().find(|r| r["id"] == id)
    }

    pub fn calls(&self) -> Vec<StoreRequest> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, method: StoreMethod, table: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.method == method && c.table == table)
            .count()
    }

    /// Answer the next `times` matching requests with a 503
    pub fn fail(&self, method: StoreMethod, table: &str, times: usize) {
        let mut state = self.state.lock().unwrap();
        state.failures.push((method, table.to_string(), times));
    }

    /// Apply the next `times` matching requests but report them as timed out
    pub fn lose_responses(&self, method: StoreMethod, table: &str, times: usize) {
        let mut state = self.state.lock().unwrap();
        state.lost_responses.push((method, table.to_string(), times));
    }

    fn response_lost(&self, request: &StoreRequest) -> bool {
        let mut state = self.state.lock().unwrap();
        match state
            .lost_responses
            .iter_mut()
            .find(|(m, t, n)| *m == request.method && *t == request.table && *n > 0)
        {
            Some(slot) => {
                slot.2 -= 1;
                true
            }
            None => false,
        }
    }

    fn handle(&self, request: StoreRequest) -> StoreResponse {
        let mut state = self.state.lock().unwrap();
        state.calls.push(request.clone());

        if let Some(slot) = state
            .failures
            .iter_mut()
            .find(|(m, t, n)| *m == request.method && *t == request.table && *n > 0)
        {
            slot.2 -= 1;
            return StoreResponse {
                status: 503,
                body: "injected failure".to_string(),
                content_range: None,
            };
        }

        let predicates: Vec<(String, String)> = request
            .query
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "select" | "order" | "limit"))
            .cloned()
            .collect();
        let param = |name: &str| {
            request
                .query
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        };

        match request.method {
            StoreMethod::Get => {
                let rows = state.tables.get(&request.table).cloned().unwrap_or_default();
                let mut rows: Vec<Value> =
                    rows.into_iter().filter(|r| matches_all(r, &predicates)).collect();
                if let Some(order) = param("order") {
                    let (column, descending) = match order.strip_suffix(".desc") {
                        Some(column) => (column.to_string(), true),
                        None => (order.clone(), false),
                    };
                    rows.sort_by(|a, b| compare(&a[&column], &b[&column]));
                    if descending {
                        rows.reverse();
                    }
                }
                if let Some(limit) = param("limit").and_then(|l| l.parse().ok()) {
                    rows.truncate(limit);
                }
                let select = param("select").unwrap_or_else(|| "*".to_string());
                let rows: Vec<Value> = rows.iter().map(|r| project(r, &select)).collect();
                respond(200, Value::Array(rows))
            }
            StoreMethod::Post => {
                let incoming = match request.body.clone() {
                    Some(Value::Array(rows)) => rows,
                    Some(row) => vec![row],
                    None => Vec::new(),
                };
                let mut created = Vec::new();
                for mut row in incoming {
                    if row.get("id").is_none() {
                        state.next_id += 1;
                        row["id"] = json!(format!("{}-{}", request.table, state.next_id));
                    }
                    created.push(row);
                }
                state
                    .tables
                    .entry(request.table.clone())
                    .or_default()
                    .extend(created.clone());
                respond(201, Value::Array(created))
            }
            StoreMethod::Patch => {
                let changes = request.body.clone().unwrap_or(Value::Null);
                let mut updated = Vec::new();
                if let Some(rows) = state.tables.get_mut(&request.table) {
                    for row in rows.iter_mut().filter(|r| matches_all(r, &predicates)) {
                        if let (Some(target), Some(changes)) = (row.as_object_mut(), changes.as_object()) {
                            for (k, v) in changes {
                                target.insert(k.clone(), v.clone());
                            }
                        }
                        updated.push(row.clone());
                    }
                }
                respond(200, Value::Array(updated))
            }
            StoreMethod::Delete => {
                let mut removed = Vec::new();
                if let Some(rows) = state.tables.get_mut(&request.table) {
                    let (gone, kept): (Vec<Value>, Vec<Value>) =
                        rows.drain(..).partition(|r| matches_all(r, &predicates));
                    *rows = kept;
                    removed = gone;
                }
                respond(200, Value::Array(removed))
            }
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, request: StoreRequest) -> StoreResult<StoreResponse> {
        let lost = self.response_lost(&request);
        let response = self.handle(request);
        if lost {
            return Err(StoreError::Timeout);
        }
        Ok(response)
    }
}

fn respond(status: u16, body: Value) -> StoreResponse {
    StoreResponse {
        status,
        body: body.to_string(),
        content_range: None,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => as_text(a).cmp(&as_text(b)),
    }
}

fn matches_all(row: &Value, predicates: &[(String, String)]) -> bool {
    predicates.iter().all(|(column, predicate)| {
        let Some((op, expected)) = FilterOperator::parse(predicate) else {
            return false;
        };
        let actual = row.get(column).cloned().unwrap_or(Value::Null);
        let expected_value = Value::String(expected.to_string());
        match op {
            FilterOperator::Eq => !actual.is_null() && as_text(&actual) == expected,
            FilterOperator::Neq => !actual.is_null() && as_text(&actual) != expected,
            FilterOperator::Is => as_text(&actual) == expected,
            FilterOperator::Gt => compare(&actual, &expected_value) == Ordering::Greater,
            FilterOperator::Gte => compare(&actual, &expected_value) != Ordering::Less,
            FilterOperator::Lt => compare(&actual, &expected_value) == Ordering::Less,
            FilterOperator::Lte => compare(&actual, &expected_value) != Ordering::Greater,
        }
    })
}

fn project(row: &Value, select: &str) -> Value {
    if select == "*" {
        return row.clone();
    }
    let mut out = serde_json::Map::new();
    for column in select.split(',').map(str::trim) {
        if let Some(v) = row.get(column) {
            out.insert(column.to_string(), v.clone());
        }
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_transport_speaks_the_grammar() {
        let memory = MemoryTransport::new();
        memory.seed(
            "book_copies",
            vec![
                json!({"id": "c1", "book_id": "b1", "copy_number": 2, "is_available": true}),
                json!({"id": "c2", "book_id": "b1", "copy_number": 1, "is_available": false}),
                json!({"id": "c3", "book_id": "b2", "copy_number": 1, "is_available": true}),
            ],
        );
        let copies = memory.store().table("book_copies");

        let envelope = copies
            .select("id")
            .eq("book_id", "b1")
            .order("copy_number", false)
            .fetch()
            .await;
        assert_eq!(envelope.rows, vec![json!({"id": "c2"}), json!({"id": "c1"})]);

        copies.eq("id", "c3").update(&json!({"is_available": false})).await;
        assert_eq!(memory.row("book_copies", "c3").unwrap()["is_available"], false);

        let removed = copies.neq("book_id", "b1").remove().await;
        assert_eq!(removed.count, 1);
        assert_eq!(memory.rows("book_copies").len(), 2);
    }
}
