//! Query filters and cursor options for the document store

use std::cmp::Ordering;

use serde_json::Value;

use super::Document;

/// A single field condition
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals value
    Eq(Value),
    /// Field is greater than or equal to value
    Gte(Value),
    /// Field is less than or equal to value
    Lte(Value),
    /// Field is a string containing the needle, ignoring case
    Contains(String),
}

impl Condition {
    fn matches(&self, field: Option<&Value>) -> bool {
        let Some(field) = field else {
            return false;
        };

        match self {
            Condition::Eq(expected) => field == expected,
            Condition::Gte(bound) => matches!(
                partial_compare(field, bound),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Condition::Lte(bound) => matches!(
                partial_compare(field, bound),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Condition::Contains(needle) => field
                .as_str()
                .map(|s| s.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
        }
    }
}

/// Conjunction of field conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Condition)>,
}

impl Filter {
    /// Empty filter matching every document
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .push((field.into(), Condition::Eq(value.into())));
        self
    }

    pub fn gte(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .push((field.into(), Condition::Gte(value.into())));
        self
    }

    pub fn lte(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .push((field.into(), Condition::Lte(value.into())));
        self
    }

    pub fn contains(mut self, field: impl Into<String>, needle: impl Into<String>) -> Self {
        self.conditions
            .push((field.into(), Condition::Contains(needle.into())));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Check whether a document satisfies every condition
    pub fn matches(&self, document: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(field, condition)| condition.matches(document.get(field)))
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Cursor options applied after filtering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// Sort keys, applied in order
    pub sort: Vec<(String, SortOrder)>,
    /// Number of documents to skip
    pub skip: usize,
    /// Maximum number of documents to return
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort.push((field.into(), order));
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Order two documents according to the sort keys
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        for (field, order) in &self.sort {
            let ordering = compare_values(a.get(field), b.get(field));
            let ordering = match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Total order over optional JSON values used for sorting
///
/// Missing and null sort first, then booleans, numbers and strings.
/// Values of other kinds compare equal.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(x), Some(y)) => partial_compare(x, y).unwrap_or_else(|| rank(a).cmp(&rank(b))),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn partial_compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        // RFC 3339 timestamps in the same offset order lexicographically
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
