//! Analytics summary types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Point-in-time circulation figures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LibraryPulse {
    pub total_books: usize,
    pub total_copies: usize,
    pub available_copies: usize,
    pub issued_copies: usize,
    pub overdue_count: usize,
    pub active_members: usize,
}

/// Response of `GET /analytics/summary`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsSummary {
    pub pulse: LibraryPulse,
    pub total_books: usize,
    pub total_members: usize,
    pub by_member_type: BTreeMap<String, usize>,
    pub by_language: BTreeMap<String, usize>,
}
