//! Record Codec
//!
//! Maps a project to and from the flat field bag of a store record. The block
//! sequence travels as one JSON array in `content_blocks`; some backends hand
//! JSON fields back as strings, so a string holding an array is accepted too.

use crate::models::{ContentBlock, ProjectDocument, ProjectFields, ProjectStatus};
use crate::persistence::PersistenceError;
use crate::store::{Fields, Record};
use serde::Deserialize;
use serde_json::Value;

pub const TITLE_FIELD: &str = "title";
pub const SLUG_FIELD: &str = "slug";
pub const EXCERPT_FIELD: &str = "excerpt";
pub const STATUS_FIELD: &str = "status";
pub const CONTENT_BLOCKS_FIELD: &str = "content_blocks";

/// Parse the stored block sequence
///
/// Missing, `null`, `""` and `[]` all mean "no blocks". Blocks whose type is
/// unknown, not a string, or absent are kept as opaque blocks; only an element
/// that is not an object with a string id fails the whole sequence.
pub fn decode_blocks(value: Option<&Value>) -> Result<Vec<ContentBlock>, String> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(Vec::new()),
        Some(Value::String(s)) => {
            let parsed: Value =
                serde_json::from_str(s).map_err(|e| format!("not valid JSON: {}", e))?;
            match parsed {
                Value::String(_) => Err("doubly encoded string".to_string()),
                other => decode_blocks(Some(&other)),
            }
        }
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                ContentBlock::deserialize(item)
                    .map_err(|e| format!("block {}: {}", index, e))
            })
            .collect(),
        Some(other) => Err(format!("expected an array, found {}", json_kind(other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Serialize a block sequence into the `content_blocks` value
pub fn encode_blocks<'a, I>(blocks: I) -> Result<Value, serde_json::Error>
where
    I: IntoIterator<Item = &'a ContentBlock>,
{
    blocks
        .into_iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

/// Size of `value` once written as compact JSON
pub fn encoded_len(value: &Value) -> Result<usize, serde_json::Error> {
    serde_json::to_vec(value).map(|bytes| bytes.len())
}

/// Read the form fields of a project record
///
/// An empty excerpt reads as `None`; an unknown status falls back to draft.
pub fn decode_fields(record: &Record) -> ProjectFields {
    let text = |field: &str| record.get_str(field).unwrap_or_default().to_string();

    let excerpt = record
        .get_str(EXCERPT_FIELD)
        .filter(|e| !e.is_empty())
        .map(str::to_string);

    let status = match record.get_str(STATUS_FIELD) {
        None | Some("") => ProjectStatus::default(),
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            tracing::warn!("Project {}: {}, treating as draft", record.id, e);
            ProjectStatus::default()
        }),
    };

    ProjectFields {
        title: text(TITLE_FIELD),
        slug: text(SLUG_FIELD),
        excerpt,
        status,
    }
}

/// Field bag written on save
pub fn encode_fields(fields: &ProjectFields, content_blocks: Value) -> Fields {
    let mut out = Fields::new();
    out.insert(TITLE_FIELD.to_string(), Value::from(fields.title.as_str()));
    out.insert(SLUG_FIELD.to_string(), Value::from(fields.slug.as_str()));
    out.insert(
        EXCERPT_FIELD.to_string(),
        Value::from(fields.excerpt.as_deref().unwrap_or_default()),
    );
    out.insert(STATUS_FIELD.to_string(), Value::from(fields.status.as_str()));
    out.insert(CONTENT_BLOCKS_FIELD.to_string(), content_blocks);
    out
}

/// Full project from a store record
pub fn decode_project(record: &Record) -> Result<ProjectDocument, PersistenceError> {
    let blocks = decode_blocks(record.get(CONTENT_BLOCKS_FIELD))
        .map_err(|reason| PersistenceError::malformed(&record.id, reason))?;

    Ok(ProjectDocument {
        id: Some(record.id.clone()),
        fields: decode_fields(record),
        blocks,
    })
}
