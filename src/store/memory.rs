//! In-memory entity store backed by a validated snapshot.

use super::{EntityStore, Snapshot, StoreError};
use crate::models::{Application, Contact, Enrollment, Tour};
use std::sync::Arc;
use tracing::debug;

/// Entity store serving clones of an immutable snapshot.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    snapshot: Arc<Snapshot>,
}

impl MemoryStore {
    /// Build a store from a snapshot, rejecting snapshots that break
    /// entity invariants.
    pub fn new(snapshot: Snapshot) -> Result<Self, StoreError> {
        snapshot.validate()?;
        debug!(
            "Loaded snapshot: {} tours, {} contacts, {} applications, {} enrollments",
            snapshot.tours.len(),
            snapshot.contacts.len(),
            snapshot.applications.len(),
            snapshot.enrollments.len()
        );
        Ok(Self {
            snapshot: Arc::new(snapshot),
        })
    }

    /// The snapshot this store serves.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

impl EntityStore for MemoryStore {
    async fn tours(&self) -> Result<Vec<Tour>, StoreError> {
        Ok(self.snapshot.tours.clone())
    }

    async fn contacts(&self) -> Result<Vec<Contact>, StoreError> {
        Ok(self.snapshot.contacts.clone())
    }

    async fn applications(&self) -> Result<Vec<Application>, StoreError> {
        Ok(self.snapshot.applications.clone())
    }

    async fn enrollments(&self) -> Result<Vec<Enrollment>, StoreError> {
        Ok(self.snapshot.enrollments.clone())
    }
}
