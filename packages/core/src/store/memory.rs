//! In-Memory Backends
//!
//! Process-local implementations of [`RecordStore`] and [`FileStorage`] used by
//! tests, benchmarks and throwaway sessions. Both expose a few knobs for
//! failure injection and for observing how they were called.

use crate::config::{DEFAULT_BACKEND_URL, DEFAULT_MEDIA_COLLECTION};
use crate::models::PendingUpload;
use crate::store::{
    media_url, new_record_id, Fields, FileStorage, Record, RecordStore, SortSpec, StoreError,
    UploadError,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::RwLock;

/// Hands out strictly increasing timestamps, so `-created` ordering is total
#[derive(Debug)]
pub(crate) struct Clock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl Clock {
    pub(crate) fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }

    pub(crate) fn tick(&self) -> DateTime<Utc> {
        let mut last = self.last.lock().unwrap_or_else(|p| p.into_inner());
        let now = Utc::now();
        let next = match *last {
            Some(prev) if now <= prev => prev + Duration::microseconds(1),
            _ => now,
        };
        *last = Some(next);
        next
    }

    /// Never hand out a timestamp at or before `floor`
    pub(crate) fn observe(&self, floor: DateTime<Utc>) {
        let mut last = self.last.lock().unwrap_or_else(|p| p.into_inner());
        if last.map_or(true, |prev| prev < floor) {
            *last = Some(floor);
        }
    }
}

/// Record store kept entirely in memory
#[derive(Debug)]
pub struct MemoryRecordStore {
    collections: RwLock<HashMap<String, Vec<Record>>>,
    clock: Clock,
    write_attempts: AtomicUsize,
    reject_writes: AtomicBool,
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            clock: Clock::new(),
            write_attempts: AtomicUsize::new(0),
            reject_writes: AtomicBool::new(false),
        }
    }

    /// Make every following `create`/`update` fail with [`StoreError::Rejected`]
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Number of `create` and `update` calls received, successful or not
    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }

    /// Insert a ready-made record, bypassing write accounting
    pub async fn insert_record(&self, record: Record) {
        self.clock.observe(record.created.max(record.updated));
        let mut collections = self.collections.write().await;
        let records = collections.entry(record.collection.clone()).or_default();
        records.retain(|existing| existing.id != record.id);
        records.push(record);
    }

    fn begin_write(&self, collection: &str) -> Result<(), StoreError> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StoreError::rejected(collection, "writes are disabled"));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create(&self, collection: &str, fields: Fields) -> Result<Record, StoreError> {
        self.begin_write(collection)?;

        let now = self.clock.tick();
        let record = Record {
            id: new_record_id(),
            collection: collection.to_string(),
            created: now,
            updated: now,
            fields,
        };

        tracing::debug!("Created record {} in {}", record.id, collection);
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Record, StoreError> {
        self.begin_write(collection)?;

        let mut collections = self.collections.write().await;
        let record = collections
            .get_mut(collection)
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        record.fields.extend(fields);
        record.updated = self.clock.tick();
        tracing::debug!("Updated record {} in {}", id, collection);
        Ok(record.clone())
    }

    async fn get_one(&self, collection: &str, id: &str) -> Result<Record, StoreError> {
        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|records| records.iter().find(|r| r.id == id))
            .cloned()
            .ok_or_else(|| StoreError::not_found(collection, id))
    }

    async fn get_full_list(
        &self,
        collection: &str,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Record>, StoreError> {
        let mut records = self
            .collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default();
        if let Some(sort) = sort {
            sort.sort(&mut records);
        }
        Ok(records)
    }
}

/// File storage kept in memory, returning media-library style URLs
#[derive(Debug)]
pub struct MemoryFileStorage {
    backend_url: String,
    collection: String,
    latency: Option<std::time::Duration>,
    failing: Mutex<HashSet<String>>,
    stored: Mutex<Vec<(String, PendingUpload)>>,
    attempts: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for MemoryFileStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFileStorage {
    pub fn new() -> Self {
        Self::with_base(DEFAULT_BACKEND_URL, DEFAULT_MEDIA_COLLECTION)
    }

    pub fn with_base(backend_url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            collection: collection.into(),
            latency: None,
            failing: Mutex::new(HashSet::new()),
            stored: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Delay every upload, so overlapping uploads can be observed
    pub fn with_latency(mut self, latency: std::time::Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail every upload of a file with this name
    pub fn fail_on(&self, file_name: impl Into<String>) {
        self.failing
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(file_name.into());
    }

    /// File names stored so far, in completion order
    pub fn uploaded(&self) -> Vec<String> {
        self.stored
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .map(|(_, file)| file.file_name().to_string())
            .collect()
    }

    /// Stored file behind `url`
    pub fn get(&self, url: &str) -> Option<PendingUpload> {
        self.stored
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .find(|(stored_url, _)| stored_url == url)
            .map(|(_, file)| file.clone())
    }

    pub fn upload_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Highest number of uploads that were running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn store(&self, file: &PendingUpload) -> Result<String, UploadError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let fails = self
            .failing
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains(file.file_name());
        if fails {
            return Err(UploadError::transport(
                file.file_name(),
                "connection reset by peer",
            ));
        }
        if file.is_empty() {
            return Err(UploadError::empty(file.file_name()));
        }

        let url = media_url(
            &self.backend_url,
            &self.collection,
            &new_record_id(),
            file.file_name(),
        );
        self.stored
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push((url.clone(), file.clone()));
        Ok(url)
    }
}

#[async_trait]
impl FileStorage for MemoryFileStorage {
    async fn upload(&self, file: &PendingUpload) -> Result<String, UploadError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let result = self.store(file).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
