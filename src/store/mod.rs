//! Entity store contract.
//!
//! The analytics core only reads entity collections. Backends implement
//! [`EntityStore`]; the in-memory and JSON snapshot-file backends live in
//! the submodules.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::models::{Application, Contact, Enrollment, Tour};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading from an entity store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read data file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse data file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Entity store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the persisted business entities.
///
/// Every accessor returns the full unfiltered collection for its entity
/// kind. Implementations must be safe to call concurrently.
pub trait EntityStore: Send + Sync {
    fn tours(&self) -> impl Future<Output = Result<Vec<Tour>, StoreError>> + Send;

    fn contacts(&self) -> impl Future<Output = Result<Vec<Contact>, StoreError>> + Send;

    fn applications(&self) -> impl Future<Output = Result<Vec<Application>, StoreError>> + Send;

    fn enrollments(&self) -> impl Future<Output = Result<Vec<Enrollment>, StoreError>> + Send;

    /// Tours open for new enrollment on `today`.
    fn available_tours(
        &self,
        today: NaiveDate,
    ) -> impl Future<Output = Result<Vec<Tour>, StoreError>> + Send {
        async move {
            let mut tours = self.tours().await?;
            tours.retain(|tour| tour.is_available(today));
            Ok(tours)
        }
    }
}

/// A complete set of entity records, as stored in a data file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tours: Vec<Tour>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub applications: Vec<Application>,
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
}

impl Snapshot {
    /// Check the entity invariants the analytics rely on.
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut tour_ids = HashSet::new();
        for tour in &self.tours {
            if !tour_ids.insert(tour.id) {
                return Err(invalid(format!("duplicate tour id {}", tour.id)));
            }
            if tour.available_slots > tour.total_slots {
                return Err(invalid(format!(
                    "tour {} has {} available slots but only {} total",
                    tour.id, tour.available_slots, tour.total_slots
                )));
            }
            if tour.end_date < tour.start_date {
                return Err(invalid(format!("tour {} ends before it starts", tour.id)));
            }
        }

        for contact in &self.contacts {
            if contact.discount_percent > 100 {
                return Err(invalid(format!(
                    "contact {} has discount {}% (max 100)",
                    contact.id, contact.discount_percent
                )));
            }
        }

        for application in &self.applications {
            if !tour_ids.contains(&application.tour_id) {
                return Err(invalid(format!(
                    "application {} references unknown tour {}",
                    application.id, application.tour_id
                )));
            }
        }

        let mut pairs: HashMap<(u64, u64), u64> = HashMap::new();
        for enrollment in &self.enrollments {
            if !tour_ids.contains(&enrollment.tour_id) {
                return Err(invalid(format!(
                    "enrollment {} references unknown tour {}",
                    enrollment.id, enrollment.tour_id
                )));
            }
            if let Some(previous) =
                pairs.insert((enrollment.contact_id, enrollment.tour_id), enrollment.id)
            {
                return Err(invalid(format!(
                    "contact {} enrolled twice in tour {} (enrollments {} and {})",
                    enrollment.contact_id, enrollment.tour_id, previous, enrollment.id
                )));
            }
        }

        Ok(())
    }
}

fn invalid(message: String) -> StoreError {
    StoreError::InvalidSnapshot(message)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::models::Season;

    fn valid_snapshot() -> Snapshot {
        Snapshot {
            tours: vec![tour(1, Season::Summer, "BEACH"), tour(2, Season::Winter, "ACTIVE")],
            contacts: Vec::new(),
            applications: vec![application(1, 1)],
            enrollments: vec![enrollment(1, 10, 1, 2025, 1), enrollment(2, 10, 2, 2025, 1)],
        }
    }

    #[test]
    fn test_valid_snapshot() {
        assert!(valid_snapshot().validate().is_ok());
    }

    #[test]
    fn test_duplicate_enrollment_pair_rejected() {
        let mut snapshot = valid_snapshot();
        snapshot.enrollments.push(enrollment(3, 10, 1, 2025, 2));

        let err = snapshot.validate().unwrap_err();
        assert!(matches!(err, StoreError::InvalidSnapshot(_)));
        assert!(err.to_string().contains("enrolled twice"));
    }

    #[test]
    fn test_slot_overflow_rejected() {
        let mut snapshot = valid_snapshot();
        snapshot.tours[0].available_slots = 21;
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_dangling_application_rejected() {
        let mut snapshot = valid_snapshot();
        snapshot.applications.push(application(2, 99));

        let err = snapshot.validate().unwrap_err();
        assert!(err.to_string().contains("unknown tour 99"));
    }
}
