//! Entity store reading a JSON snapshot file.
//!
//! The file holds a single object with `tours`, `contacts`,
//! `applications` and `enrollments` arrays. It is read and validated once
//! per store, on first access; every later read, including reads racing
//! the first one, is served from that snapshot. Clones share the cache.
//! A failed read is not cached, so the next access tries the file again.

use super::{EntityStore, Snapshot, StoreError};
use crate::models::{Application, Contact, Enrollment, Tour};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    snapshot: Arc<OnceCell<Snapshot>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            snapshot: Arc::new(OnceCell::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The snapshot served by this store, loading it on first use.
    pub async fn snapshot(&self) -> Result<&Snapshot, StoreError> {
        self.snapshot.get_or_try_init(|| self.load()).await
    }

    /// Read, parse and validate the snapshot file, bypassing the cache.
    pub async fn load(&self) -> Result<Snapshot, StoreError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| {
                warn!("Failed to read {}: {}", self.path.display(), source);
                StoreError::Io {
                    path: self.path.clone(),
                    source,
                }
            })?;

        let snapshot: Snapshot =
            serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;
        snapshot.validate()?;

        debug!(
            "Read snapshot from {}: {} tours, {} contacts, {} applications, {} enrollments",
            self.path.display(),
            snapshot.tours.len(),
            snapshot.contacts.len(),
            snapshot.applications.len(),
            snapshot.enrollments.len()
        );
        Ok(snapshot)
    }
}

impl EntityStore for JsonFileStore {
    async fn tours(&self) -> Result<Vec<Tour>, StoreError> {
        Ok(self.snapshot().await?.tours.clone())
    }

    async fn contacts(&self) -> Result<Vec<Contact>, StoreError> {
        Ok(self.snapshot().await?.contacts.clone())
    }

    async fn applications(&self) -> Result<Vec<Application>, StoreError> {
        Ok(self.snapshot().await?.applications.clone())
    }

    async fn enrollments(&self) -> Result<Vec<Enrollment>, StoreError> {
        Ok(self.snapshot().await?.enrollments.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"{
        "tours": [
            {"id": 1, "season": "SUMMER", "type": "BEACH", "totalSlots": 10,
             "availableSlots": 2, "startDate": "2025-07-01", "endDate": "2025-07-08"}
        ],
        "contacts": [
            {"id": 1, "ageGroup": "AGE_26_35", "gender": "MALE", "isClient": true}
        ],
        "enrollments": [
            {"id": 1, "contactId": 1, "tourId": 1, "createdAt": "2025-03-02T10:00:00Z"}
        ]
    }"#;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_reads_snapshot_file() {
        let file = write_temp(SAMPLE);
        let store = JsonFileStore::new(file.path());

        let tours = store.tours().await.unwrap();
        assert_eq!(tours.len(), 1);
        assert_eq!(store.contacts().await.unwrap().len(), 1);
        assert!(store.applications().await.unwrap().is_empty());

        let enrollments = store.enrollments().await.unwrap();
        assert!(enrollments[0].is_active);
    }

    #[tokio::test]
    async fn test_file_is_read_once_per_store() {
        let file = write_temp(SAMPLE);
        let store = JsonFileStore::new(file.path());
        let shared = store.clone();
        assert_eq!(store.tours().await.unwrap().len(), 1);

        std::fs::write(file.path(), r#"{"contacts": []}"#).unwrap();

        assert_eq!(store.tours().await.unwrap().len(), 1);
        assert_eq!(shared.contacts().await.unwrap().len(), 1);
        assert!(JsonFileStore::new(file.path()).tours().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_read_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.json");
        let store = JsonFileStore::new(&path);
        assert!(store.tours().await.is_err());

        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(store.tours().await.unwrap().len(), 1);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_load_logs_record_counts() {
        let file = write_temp(SAMPLE);
        let store = JsonFileStore::new(file.path());
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tokio_test::block_on(store.load()).unwrap();
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("1 tours, 1 contacts, 0 applications, 1 enrollments"));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("missing.json"));

        let err = store.tours().await.unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[tokio::test]
    async fn test_malformed_file_is_parse_error() {
        let file = write_temp("{ not json");
        let store = JsonFileStore::new(file.path());

        let err = store.contacts().await.unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }
}
