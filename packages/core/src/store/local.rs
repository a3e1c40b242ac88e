//! Local Filesystem Backends
//!
//! [`JsonFileRecordStore`] keeps each collection in `<root>/<collection>.json`
//! and rewrites the whole file on every write, using the write-to-temp then
//! rename pattern so a crash never leaves a half-written collection behind.
//!
//! [`LocalFileStorage`] writes uploads to
//! `<root>/<collection>/<record_id>/<file_name>`, the same layout the backend
//! serves under `/api/files/`.

use crate::models::PendingUpload;
use crate::store::memory::Clock;
use crate::store::{
    media_url, new_record_id, Fields, FileStorage, Record, RecordStore, SortSpec, StoreError,
    UploadError,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

/// Record store persisting one JSON file per collection
#[derive(Debug)]
pub struct JsonFileRecordStore {
    root: PathBuf,
    clock: Clock,
    write_lock: Mutex<()>,
}

impl JsonFileRecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            clock: Clock::new(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, collection: &str) -> Result<PathBuf, StoreError> {
        let valid = !collection.is_empty()
            && collection
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::invalid_query(format!(
                "invalid collection name '{}'",
                collection
            )));
        }
        Ok(self.root.join(format!("{}.json", collection)))
    }

    async fn read_collection(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        let path = self.collection_path(collection)?;
        if !fs::try_exists(&path).await? {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&path).await?;
        let records: Vec<Record> =
            serde_json::from_str(&contents).map_err(|e| StoreError::corrupt(path.clone(), e))?;
        if let Some(latest) = records.iter().map(|r| r.created.max(r.updated)).max() {
            self.clock.observe(latest);
        }
        Ok(records)
    }

    async fn write_collection(
        &self,
        collection: &str,
        records: &[Record],
    ) -> Result<(), StoreError> {
        let path = self.collection_path(collection)?;
        let temp = self.root.join(format!("{}.json.tmp", collection));

        fs::create_dir_all(&self.root).await?;
        let serialized = serde_json::to_string_pretty(records)?;

        // Atomic write: write to temp file, then rename
        fs::write(&temp, serialized).await?;
        fs::rename(&temp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileRecordStore {
    async fn create(&self, collection: &str, fields: Fields) -> Result<Record, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_collection(collection).await?;

        let now = self.clock.tick();
        let record = Record {
            id: new_record_id(),
            collection: collection.to_string(),
            created: now,
            updated: now,
            fields,
        };
        records.push(record.clone());
        self.write_collection(collection, &records).await?;

        tracing::debug!("Created record {} in {}", record.id, collection);
        Ok(record)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Record, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_collection(collection).await?;

        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        record.fields.extend(fields);
        record.updated = self.clock.tick();
        let updated = record.clone();

        self.write_collection(collection, &records).await?;
        tracing::debug!("Updated record {} in {}", id, collection);
        Ok(updated)
    }

    async fn get_one(&self, collection: &str, id: &str) -> Result<Record, StoreError> {
        self.read_collection(collection)
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::not_found(collection, id))
    }

    async fn get_full_list(
        &self,
        collection: &str,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Record>, StoreError> {
        let mut records = self.read_collection(collection).await?;
        if let Some(sort) = sort {
            sort.sort(&mut records);
        }
        Ok(records)
    }
}

/// File storage writing uploads below a media directory
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
    backend_url: String,
    collection: String,
}

impl LocalFileStorage {
    pub fn new(
        root: impl Into<PathBuf>,
        backend_url: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            backend_url: backend_url.into(),
            collection: collection.into(),
        }
    }

    /// Filesystem location of a file previously returned by `upload`
    pub fn path_of(&self, record_id: &str, file_name: &str) -> PathBuf {
        self.root
            .join(&self.collection)
            .join(record_id)
            .join(sanitize_file_name(file_name))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn upload(&self, file: &PendingUpload) -> Result<String, UploadError> {
        if file.is_empty() {
            return Err(UploadError::empty(file.file_name()));
        }

        let record_id = new_record_id();
        let file_name = sanitize_file_name(file.file_name());
        let path = self.path_of(&record_id, &file_name);

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| UploadError::io(file.file_name(), e))?;
        }
        fs::write(&path, file.data())
            .await
            .map_err(|e| UploadError::io(file.file_name(), e))?;

        tracing::debug!("Stored upload {} ({} bytes)", path.display(), file.len());
        Ok(media_url(
            &self.backend_url,
            &self.collection,
            &record_id,
            &file_name,
        ))
    }
}

/// Make an uploaded file name safe to use as a single path component
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '<' | '>' | '|' | '"' | ' ' => '-',
            _ => c,
        })
        .collect();

    if cleaned.chars().all(|c| c == '.') {
        "upload".to_string()
    } else {
        cleaned
    }
}
