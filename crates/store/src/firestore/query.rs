//! Structured query builder.
//!
//! The service layer only ever needs equality and range filters over a single
//! collection with one fixed sort key, so the builder covers exactly that and
//! nothing more.

use serde_json::{Value as Json, json};

use super::value::Value;

/// Comparison operator for a field filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Equal,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl Op {
    const fn wire_name(self) -> &'static str {
        match self {
            Self::Equal => "EQUAL",
            Self::GreaterThan => "GREATER_THAN",
            Self::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            Self::LessThan => "LESS_THAN",
            Self::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    const fn wire_name(self) -> &'static str {
        match self {
            Self::Ascending => "ASCENDING",
            Self::Descending => "DESCENDING",
        }
    }
}

/// A single-collection structured query.
#[derive(Debug, Clone)]
pub struct Query {
    collection: String,
    filters: Vec<(String, Op, Value)>,
    order_by: Option<(String, Direction)>,
    limit: Option<u32>,
}

impl Query {
    /// Start a query over one collection.
    #[must_use]
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    /// Add a field filter. Multiple filters are ANDed.
    #[must_use]
    pub fn filter(mut self, field: impl Into<String>, op: Op, value: Value) -> Self {
        self.filters.push((field.into(), op, value));
        self
    }

    /// Set the sort key. Only one order-by is supported.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    /// Cap the number of returned documents.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render the `structuredQuery` JSON body.
    #[must_use]
    pub fn to_structured_query(&self) -> Json {
        let mut query = json!({
            "from": [{"collectionId": self.collection}],
        });

        if let Some(where_clause) = self.where_clause()
            && let Some(obj) = query.as_object_mut()
        {
            obj.insert("where".to_owned(), where_clause);
        }

        if let Some((field, direction)) = &self.order_by
            && let Some(obj) = query.as_object_mut()
        {
            obj.insert(
                "orderBy".to_owned(),
                json!([{
                    "field": {"fieldPath": field},
                    "direction": direction.wire_name(),
                }]),
            );
        }

        if let Some(limit) = self.limit
            && let Some(obj) = query.as_object_mut()
        {
            obj.insert("limit".to_owned(), json!(limit));
        }

        query
    }

    fn where_clause(&self) -> Option<Json> {
        let field_filters: Vec<Json> = self
            .filters
            .iter()
            .map(|(field, op, value)| {
                json!({
                    "fieldFilter": {
                        "field": {"fieldPath": field},
                        "op": op.wire_name(),
                        "value": value,
                    }
                })
            })
            .collect();

        match field_filters.len() {
            0 => None,
            1 => field_filters.into_iter().next(),
            _ => Some(json!({
                "compositeFilter": {
                    "op": "AND",
                    "filters": field_filters,
                }
            })),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_query() {
        let q = Query::collection("projects").to_structured_query();
        assert_eq!(q["from"][0]["collectionId"], "projects");
        assert!(q.get("where").is_none());
    }

    #[test]
    fn test_single_filter_has_no_composite() {
        let q = Query::collection("projects")
            .filter("ownerUid", Op::Equal, Value::string("u1"))
            .to_structured_query();

        assert_eq!(q["where"]["fieldFilter"]["field"]["fieldPath"], "ownerUid");
        assert_eq!(q["where"]["fieldFilter"]["op"], "EQUAL");
        assert!(q["where"].get("compositeFilter").is_none());
    }

    #[test]
    fn test_multiple_filters_are_anded() {
        let q = Query::collection("hackathons")
            .filter("status", Op::Equal, Value::string("published"))
            .filter(
                "startsAt",
                Op::GreaterThanOrEqual,
                Value::timestamp(chrono::Utc::now()),
            )
            .to_structured_query();

        assert_eq!(q["where"]["compositeFilter"]["op"], "AND");
        assert_eq!(
            q["where"]["compositeFilter"]["filters"]
                .as_array()
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_order_and_limit() {
        let q = Query::collection("hackathons")
            .order_by("startsAt", Direction::Ascending)
            .limit(20)
            .to_structured_query();

        assert_eq!(q["orderBy"][0]["field"]["fieldPath"], "startsAt");
        assert_eq!(q["orderBy"][0]["direction"], "ASCENDING");
        assert_eq!(q["limit"], 20);
    }
}
