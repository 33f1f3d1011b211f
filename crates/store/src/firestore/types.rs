//! Wire types for the document database REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value::{Fields, Value};

/// A stored document as returned by the API.
///
/// `create_time`/`update_time` are maintained server-side; the repository
/// layer maps them onto the records' `createdAt`/`updatedAt` fields so every
/// record carries server timestamps without client clock involvement.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name
    /// (`projects/{p}/databases/{d}/documents/{collection}/{id}`).
    pub name: String,
    #[serde(default)]
    pub fields: Fields,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl Document {
    /// The document id (last path segment of the resource name).
    #[must_use]
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Look up a field value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// A required string field.
    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// An optional string field (absent or null both map to `None`).
    #[must_use]
    pub fn opt_str_field(&self, key: &str) -> Option<String> {
        self.get(key)
            .filter(|v| !v.is_null())
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    /// An integer field, defaulting to 0 when absent.
    #[must_use]
    pub fn i64_field_or_zero(&self, key: &str) -> i64 {
        self.get(key).and_then(Value::as_i64).unwrap_or(0)
    }

    /// A boolean field, defaulting to `false` when absent.
    #[must_use]
    pub fn bool_field_or_false(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// A string-array field, defaulting to empty when absent.
    #[must_use]
    pub fn string_array_field(&self, key: &str) -> Vec<String> {
        self.get(key)
            .and_then(Value::as_string_array)
            .unwrap_or_default()
    }

    /// A timestamp field.
    #[must_use]
    pub fn timestamp_field(&self, key: &str) -> Option<DateTime<Utc>> {
        self.get(key).and_then(Value::as_timestamp)
    }
}

/// Request body for document create/patch.
#[derive(Debug, Clone, Serialize)]
pub struct WriteDocument {
    pub fields: Fields,
}

/// One element of a `runQuery` streamed response.
///
/// Elements without a `document` key (read-time only markers) are skipped.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryElement {
    pub document: Option<Document>,
}

/// One element of a `runAggregationQuery` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationElement {
    pub result: Option<AggregationResult>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    #[serde(default)]
    pub aggregate_fields: std::collections::BTreeMap<String, Value>,
}

/// Error envelope returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_from_name() {
        let doc: Document = serde_json::from_value(serde_json::json!({
            "name": "projects/demo/databases/(default)/documents/users/abc123",
            "fields": {"displayName": {"stringValue": "Ada"}},
            "createTime": "2025-06-01T12:00:00Z",
            "updateTime": "2025-06-02T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(doc.id(), "abc123");
        assert_eq!(doc.str_field("displayName"), Some("Ada"));
        assert_eq!(doc.opt_str_field("bio"), None);
    }

    #[test]
    fn test_null_field_reads_as_absent() {
        let doc: Document = serde_json::from_value(serde_json::json!({
            "name": "projects/demo/databases/(default)/documents/users/u1",
            "fields": {"bio": {"nullValue": null}},
            "createTime": "2025-06-01T12:00:00Z",
            "updateTime": "2025-06-01T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(doc.opt_str_field("bio"), None);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let doc: Document = serde_json::from_value(serde_json::json!({
            "name": "projects/demo/databases/(default)/documents/projects/p1",
            "createTime": "2025-06-01T12:00:00Z",
            "updateTime": "2025-06-01T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(doc.i64_field_or_zero("views"), 0);
        assert!(!doc.bool_field_or_false("featured"));
        assert!(doc.string_array_field("tech").is_empty());
    }
}
