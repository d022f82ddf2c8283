//! TourStat - analytics and popularity forecasting for tour operators.
//!
//! The library reads tours, contacts, applications and enrollments from an
//! [`store::EntityStore`] and assembles distribution, ratio and forecast
//! reports through [`report::ReportAssembler`].

pub mod analysis;
pub mod cli;
pub mod config;
pub mod models;
pub mod report;
pub mod store;

pub use report::{AnalysisBundle, AnalysisSettings, FullReport, PredictiveBundle, ReportAssembler};
pub use store::{EntityStore, JsonFileStore, MemoryStore, Snapshot, StoreError};
