//! Record Store and File Storage Abstractions
//!
//! The editor consumes two external capabilities:
//!
//! - [`RecordStore`] - schemaless records grouped in named collections
//!   (`create`, `update`, `get_one`, `get_full_list`)
//! - [`FileStorage`] - binary uploads that come back as a stable URL
//!
//! Both are `Send + Sync` traits used through `Arc<dyn ...>` so the
//! persistence layer never depends on a concrete backend. Two backends ship
//! with the crate: in-memory ([`MemoryRecordStore`], [`MemoryFileStorage`])
//! and the local filesystem ([`JsonFileRecordStore`], [`LocalFileStorage`]).
//!
//! # Examples
//!
//! ```rust,no_run
//! use folio_core::store::{MemoryRecordStore, RecordStore, SortSpec};
//! use serde_json::{json, Map};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = MemoryRecordStore::new();
//!     let mut fields = Map::new();
//!     fields.insert("title".to_string(), json!("Portfolio site"));
//!
//!     let record = store.create("projects", fields).await?;
//!     let listed = store
//!         .get_full_list("projects", Some(&SortSpec::newest_first()))
//!         .await?;
//!     assert_eq!(listed[0].id, record.id);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod local;
pub mod memory;

pub use error::{StoreError, UploadError};
pub use local::{JsonFileRecordStore, LocalFileStorage};
pub use memory::{MemoryFileStorage, MemoryRecordStore};

use crate::models::PendingUpload;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Named field values of one record
pub type Fields = Map<String, Value>;

/// One stored record: system metadata plus its schemaless fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub collection: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub fields: Fields,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// String value of `field`, if it holds one
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}

/// Sort order for [`RecordStore::get_full_list`], e.g. `-created`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    field: String,
    descending: bool,
}

impl SortSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    /// `-created`
    pub fn newest_first() -> Self {
        Self::descending("created")
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn is_descending(&self) -> bool {
        self.descending
    }

    /// Compare two records by this sort order
    ///
    /// `id`, `created` and `updated` read record metadata; anything else reads
    /// the named field. Records missing the field sort first.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ordering = match self.field.as_str() {
            "id" => a.id.cmp(&b.id),
            "created" => a.created.cmp(&b.created),
            "updated" => a.updated.cmp(&b.updated),
            field => compare_values(a.get(field), b.get(field)),
        };
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }

    /// Stable sort of `records` in place
    pub fn sort(&self, records: &mut [Record]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.field)
        } else {
            f.write_str(&self.field)
        }
    }
}

impl FromStr for SortSpec {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (descending, field) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        if field.is_empty() {
            return Err(StoreError::invalid_query(format!("invalid sort '{}'", s)));
        }
        Ok(Self {
            field: field.to_string(),
            descending,
        })
    }
}

/// Schemaless record persistence
///
/// `update` merges the given fields into the stored record; fields not named
/// are kept. Concurrent writers are not arbitrated: the last write wins.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record; the store assigns id and timestamps
    async fn create(&self, collection: &str, fields: Fields) -> Result<Record, StoreError>;

    /// Merge `fields` into record `id`
    async fn update(&self, collection: &str, id: &str, fields: Fields)
        -> Result<Record, StoreError>;

    async fn get_one(&self, collection: &str, id: &str) -> Result<Record, StoreError>;

    /// Every record of the collection, optionally sorted
    async fn get_full_list(
        &self,
        collection: &str,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Record>, StoreError>;
}

/// Binary upload capability used for image blocks
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store the file and return a URL it can be fetched from
    async fn upload(&self, file: &PendingUpload) -> Result<String, UploadError>;
}

/// Public URL of a file stored in a media collection record
pub fn media_url(backend_url: &str, collection: &str, record_id: &str, file_name: &str) -> String {
    format!(
        "{}/api/files/{}/{}/{}",
        backend_url.trim_end_matches('/'),
        collection,
        record_id,
        file_name
    )
}

/// Short random record id
pub(crate) fn new_record_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(15);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(id: &str, minutes: i64, title: Option<&str>) -> Record {
        let created = Utc.timestamp_opt(minutes * 60, 0).unwrap();
        let mut fields = Fields::new();
        if let Some(title) = title {
            fields.insert("title".to_string(), json!(title));
        }
        Record {
            id: id.to_string(),
            collection: "projects".to_string(),
            created,
            updated: created,
            fields,
        }
    }

    #[test]
    fn test_parse_sort_spec() {
        let spec: SortSpec = "-created".parse().unwrap();
        assert_eq!(spec, SortSpec::newest_first());
        assert_eq!(spec.to_string(), "-created");

        let spec: SortSpec = "title".parse().unwrap();
        assert!(!spec.is_descending());
        assert_eq!(spec.field(), "title");

        assert!("-".parse::<SortSpec>().is_err());
        assert!("".parse::<SortSpec>().is_err());
    }

    #[test]
    fn test_sort_newest_first() {
        let mut records = vec![
            record("a", 1, None),
            record("c", 3, None),
            record("b", 2, None),
        ];

        SortSpec::newest_first().sort(&mut records);

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_sort_by_field_puts_missing_first() {
        let mut records = vec![
            record("a", 1, Some("Zeta")),
            record("b", 2, None),
            record("c", 3, Some("Alpha")),
        ];

        SortSpec::ascending("title").sort(&mut records);

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_media_url_format() {
        assert_eq!(
            media_url("http://127.0.0.1:8090/", "media_library", "abc123", "shot.png"),
            "http://127.0.0.1:8090/api/files/media_library/abc123/shot.png"
        );
    }

    #[test]
    fn test_record_ids_are_short_and_distinct() {
        let a = new_record_id();
        let b = new_record_id();
        assert_eq!(a.len(), 15);
        assert_ne!(a, b);
    }
}
