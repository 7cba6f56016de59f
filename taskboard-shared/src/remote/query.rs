//! Document queries
//!
//! Only the query forms the application uses are supported: equality
//! filter, descending sort, search over a field (used to find tasks whose
//! assignee list mentions an email), and the page window (`limit` and
//! `cursorAfter`).
//!
//! Queries are sent to the service as JSON strings:
//!
//! ```text
//! {"method":"equal","attribute":"userId","values":["65a1e9..."]}
//! {"method":"orderDesc","attribute":"createdAt"}
//! {"method":"search","attribute":"assignees","values":["ada@example.com"]}
//! {"method":"limit","values":[100]}
//! {"method":"cursorAfter","values":["65a1f0..."]}
//! ```
//!
//! A list request without a `limit` gets [`DEFAULT_PAGE_SIZE`] documents.

use serde_json::{json, Value};
use std::cmp::Ordering;

/// Documents the service returns when a list request names no limit
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// One query clause
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Attribute equals one of the values
    Equal { attribute: String, values: Vec<Value> },

    /// Sort by attribute, newest/largest first
    OrderDesc { attribute: String },

    /// Attribute (string or list of strings) contains the term
    Search { attribute: String, term: String },

    /// At most this many documents
    Limit(usize),

    /// Only documents after the one with this id, in result order
    CursorAfter(String),
}

impl Query {
    pub fn equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Equal {
            attribute: attribute.into(),
            values: vec![value.into()],
        }
    }

    pub fn order_desc(attribute: impl Into<String>) -> Self {
        Query::OrderDesc {
            attribute: attribute.into(),
        }
    }

    pub fn search(attribute: impl Into<String>, term: impl Into<String>) -> Self {
        Query::Search {
            attribute: attribute.into(),
            term: term.into(),
        }
    }

    pub fn limit(limit: usize) -> Self {
        Query::Limit(limit)
    }

    pub fn cursor_after(document_id: impl Into<String>) -> Self {
        Query::CursorAfter(document_id.into())
    }

    /// Wire form sent as a `queries[]` parameter
    pub fn to_wire(&self) -> String {
        let value = match self {
            Query::Equal { attribute, values } => json!({
                "method": "equal",
                "attribute": attribute,
                "values": values,
            }),
            Query::OrderDesc { attribute } => json!({
                "method": "orderDesc",
                "attribute": attribute,
            }),
            Query::Search { attribute, term } => json!({
                "method": "search",
                "attribute": attribute,
                "values": [term],
            }),
            Query::Limit(limit) => json!({
                "method": "limit",
                "values": [limit],
            }),
            Query::CursorAfter(document_id) => json!({
                "method": "cursorAfter",
                "values": [document_id],
            }),
        };
        value.to_string()
    }

    /// Whether a document passes this clause (sorting and paging clauses
    /// always pass)
    pub fn matches(&self, document: &Value) -> bool {
        match self {
            Query::Equal { attribute, values } => document
                .get(attribute)
                .map(|field| values.iter().any(|v| v == field))
                .unwrap_or(false),
            Query::OrderDesc { .. } | Query::Limit(_) | Query::CursorAfter(_) => true,
            Query::Search { attribute, term } => match document.get(attribute) {
                Some(Value::String(text)) => text.contains(term.as_str()),
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|item| item.contains(term.as_str())),
                _ => false,
            },
        }
    }
}

/// Applies filters, then sorting clauses in order, then the page window
///
/// A cursor naming a document outside the result yields an empty page.
pub fn apply(queries: &[Query], documents: Vec<Value>) -> Vec<Value> {
    let mut selected: Vec<Value> = documents
        .into_iter()
        .filter(|doc| queries.iter().all(|q| q.matches(doc)))
        .collect();

    for query in queries.iter().rev() {
        if let Query::OrderDesc { attribute } = query {
            selected.sort_by(|a, b| compare_field(b.get(attribute), a.get(attribute)));
        }
    }

    let mut limit = DEFAULT_PAGE_SIZE;
    let mut start = 0;
    for query in queries {
        match query {
            Query::Limit(n) => limit = *n,
            Query::CursorAfter(cursor) => {
                start = match selected
                    .iter()
                    .position(|doc| doc.get("$id").and_then(Value::as_str) == Some(cursor.as_str()))
                {
                    Some(index) => index + 1,
                    None => selected.len(),
                };
            }
            _ => {}
        }
    }

    selected.into_iter().skip(start).take(limit).collect()
}

fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(query: &Query) -> Value {
        serde_json::from_str(&query.to_wire()).unwrap()
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(
            wire(&Query::equal("userId", "u1")),
            json!({"method": "equal", "attribute": "userId", "values": ["u1"]})
        );
        assert_eq!(
            wire(&Query::order_desc("createdAt")),
            json!({"method": "orderDesc", "attribute": "createdAt"})
        );
        assert_eq!(
            wire(&Query::search("assignees", "ada@example.com")),
            json!({"method": "search", "attribute": "assignees", "values": ["ada@example.com"]})
        );
        assert_eq!(wire(&Query::limit(100)), json!({"method": "limit", "values": [100]}));
        assert_eq!(
            wire(&Query::cursor_after("t9")),
            json!({"method": "cursorAfter", "values": ["t9"]})
        );
    }

    #[test]
    fn test_equal_on_bool() {
        let q = Query::equal("isRead", false);
        assert!(q.matches(&json!({"isRead": false})));
        assert!(!q.matches(&json!({"isRead": true})));
        assert!(!q.matches(&json!({})));
    }

    #[test]
    fn test_search_list_field() {
        let q = Query::search("assignees", "ada@example.com");
        assert!(q.matches(&json!({"assignees": ["bob@example.com", "ada@example.com"]})));
        assert!(!q.matches(&json!({"assignees": []})));
    }

    #[test]
    fn test_apply_filters_and_sorts() {
        let docs = vec![
            json!({"$id": "a", "userId": "u1", "createdAt": "2024-03-01T10:00:00Z"}),
            json!({"$id": "b", "userId": "u2", "createdAt": "2024-03-02T10:00:00Z"}),
            json!({"$id": "c", "userId": "u1", "createdAt": "2024-03-03T10:00:00Z"}),
        ];

        let out = apply(
            &[Query::equal("userId", "u1"), Query::order_desc("createdAt")],
            docs,
        );
        let ids: Vec<&str> = out.iter().map(|d| d["$id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    fn numbered(count: usize) -> Vec<Value> {
        (0..count).map(|i| json!({"$id": format!("t{}", i)})).collect()
    }

    fn ids(documents: &[Value]) -> Vec<&str> {
        documents.iter().map(|d| d["$id"].as_str().unwrap()).collect()
    }

    #[test]
    fn test_apply_without_limit_returns_first_page() {
        let out = apply(&[], numbered(30));
        assert_eq!(out.len(), DEFAULT_PAGE_SIZE);
        assert_eq!(out[0]["$id"], "t0");
    }

    #[test]
    fn test_apply_cursor_window() {
        let out = apply(&[Query::limit(3), Query::cursor_after("t4")], numbered(10));
        assert_eq!(ids(&out), vec!["t5", "t6", "t7"]);

        let tail = apply(&[Query::limit(3), Query::cursor_after("t8")], numbered(10));
        assert_eq!(ids(&tail), vec!["t9"]);

        let unknown = apply(&[Query::cursor_after("missing")], numbered(10));
        assert!(unknown.is_empty());
    }
}
