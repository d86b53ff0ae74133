//! Filter operators understood by the remote REST endpoint

use std::fmt;

/// Comparison operators of the `column=op.value` query grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equals
    Eq,
    /// Not equals
    Neq,
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// Identity check (`null`, `true`, `false`)
    Is,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Is => "is",
        }
    }

    /// Render the predicate string stored against a column, e.g. `eq.42`
    pub fn predicate(&self, value: impl fmt::Display) -> String {
        format!("{}.{}", self.as_str(), value)
    }

    /// Parse the operator prefix of a predicate string
    pub fn parse(predicate: &str) -> Option<(Self, &str)> {
        let (op, value) = predicate.split_once('.')?;
        let op = match op {
            "eq" => FilterOperator::Eq,
            "neq" => FilterOperator::Neq,
            "gt" => FilterOperator::Gt,
            "gte" => FilterOperator::Gte,
            "lt" => FilterOperator::Lt,
            "lte" => FilterOperator::Lte,
            "is" => FilterOperator::Is,
            _ => return None,
        };
        Some((op, value))
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column sort direction for `order=`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn to_param(&self) -> String {
        if self.descending {
            format!("{}.desc", self.column)
        } else {
            self.column.clone()
        }
    }
}
