//! Report bundles assembled from concurrent entity store reads.
//!
//! Each aggregation reads what it needs from the store on its own. A
//! bundle issues its aggregations concurrently and succeeds only if all
//! of them do; the first store failure is returned unchanged.

use crate::analysis::aggregator::{
    self, ClientContactRatio, CrossDistribution, Distribution, RegularClientPercentage,
    DEFAULT_REGULAR_THRESHOLD,
};
use crate::analysis::forecast::{self, ForecastSettings, Trends};
use crate::models::{AgeGroup, ApplicationStatus, Enrollment, Gender, Season};
use crate::store::{EntityStore, StoreError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Tuning for the analytics computed by [`ReportAssembler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisSettings {
    /// Enrollments needed for a contact to count as regular.
    pub regular_client_threshold: usize,
    /// Ignore inactive enrollments in the regular-client share and trends.
    pub active_enrollments_only: bool,
    pub forecast: ForecastSettings,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            regular_client_threshold: DEFAULT_REGULAR_THRESHOLD,
            active_enrollments_only: false,
            forecast: ForecastSettings::default(),
        }
    }
}

/// Descriptive statistics over tours and contacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisBundle {
    pub season_distribution: Distribution<Season>,
    pub type_distribution: Distribution<String>,
    pub gender_distribution: Distribution<Gender>,
    pub age_group_distribution: Distribution<AgeGroup>,
    pub client_contact_ratio: ClientContactRatio,
    pub regular_client_percentage: RegularClientPercentage,
}

/// Demand analysis and popularity forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictiveBundle {
    pub applications_by_season: Distribution<Season>,
    pub age_group_by_tour_type: CrossDistribution,
    pub tour_type_popularity_trends: Trends,
}

/// Both bundles, stamped with the time the report was assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullReport {
    pub timestamp: DateTime<Utc>,
    pub analysis_data: AnalysisBundle,
    pub predictive_data: PredictiveBundle,
}

/// Headline counts for staff dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub date: NaiveDate,
    pub tour_count: usize,
    pub bookable_tour_count: usize,
    pub application_count: usize,
    pub pending_application_count: usize,
    pub contact_count: usize,
    pub client_count: usize,
}

/// Computes analytics against an [`EntityStore`].
pub struct ReportAssembler<S> {
    store: S,
    settings: AnalysisSettings,
}

impl<S: EntityStore> ReportAssembler<S> {
    pub fn new(store: S, settings: AnalysisSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn enrollments(&self) -> Result<Vec<Enrollment>, StoreError> {
        let mut enrollments = self.store.enrollments().await?;
        if self.settings.active_enrollments_only {
            enrollments.retain(|e| e.is_active);
        }
        Ok(enrollments)
    }

    pub async fn season_distribution(&self) -> Result<Distribution<Season>, StoreError> {
        let tours = self.store.tours().await?;
        Ok(aggregator::distribution_by_season(&tours))
    }

    pub async fn type_distribution(&self) -> Result<Distribution<String>, StoreError> {
        let tours = self.store.tours().await?;
        Ok(aggregator::distribution_by_type(&tours))
    }

    pub async fn gender_distribution(&self) -> Result<Distribution<Gender>, StoreError> {
        let contacts = self.store.contacts().await?;
        Ok(aggregator::distribution_by_gender(&contacts))
    }

    pub async fn age_group_distribution(&self) -> Result<Distribution<AgeGroup>, StoreError> {
        let contacts = self.store.contacts().await?;
        Ok(aggregator::distribution_by_age_group(&contacts))
    }

    pub async fn client_contact_ratio(&self) -> Result<ClientContactRatio, StoreError> {
        let contacts = self.store.contacts().await?;
        Ok(aggregator::client_contact_ratio(&contacts))
    }

    pub async fn regular_client_percentage(&self) -> Result<RegularClientPercentage, StoreError> {
        let (contacts, enrollments) =
            futures::try_join!(self.store.contacts(), self.enrollments())?;
        Ok(aggregator::regular_client_percentage(
            &contacts,
            &enrollments,
            self.settings.regular_client_threshold,
        ))
    }

    pub async fn applications_by_season(&self) -> Result<Distribution<Season>, StoreError> {
        let (applications, tours) =
            futures::try_join!(self.store.applications(), self.store.tours())?;
        Ok(aggregator::applications_by_season(&applications, &tours))
    }

    pub async fn age_group_by_tour_type(&self) -> Result<CrossDistribution, StoreError> {
        let contacts = self.store.contacts().await?;
        Ok(aggregator::cross_by_age_and_preferred_type(&contacts))
    }

    pub async fn popularity_trends(&self) -> Result<Trends, StoreError> {
        let (enrollments, tours) = futures::try_join!(self.enrollments(), self.store.tours())?;
        Ok(forecast::popularity_trends(
            &enrollments,
            &tours,
            &self.settings.forecast,
        ))
    }

    /// Distributions and ratios over tours and contacts.
    pub async fn get_analysis_bundle(&self) -> Result<AnalysisBundle, StoreError> {
        debug!("Assembling analysis bundle");

        let (
            season_distribution,
            type_distribution,
            gender_distribution,
            age_group_distribution,
            client_contact_ratio,
            regular_client_percentage,
        ) = futures::try_join!(
            self.season_distribution(),
            self.type_distribution(),
            self.gender_distribution(),
            self.age_group_distribution(),
            self.client_contact_ratio(),
            self.regular_client_percentage(),
        )
        .inspect_err(|e| warn!("Analysis bundle failed: {}", e))?;

        Ok(AnalysisBundle {
            season_distribution,
            type_distribution,
            gender_distribution,
            age_group_distribution,
            client_contact_ratio,
            regular_client_percentage,
        })
    }

    /// Seasonal demand, age/preference cross table and popularity forecast.
    pub async fn get_predictive_bundle(&self) -> Result<PredictiveBundle, StoreError> {
        debug!("Assembling predictive bundle");

        let (applications_by_season, age_group_by_tour_type, tour_type_popularity_trends) =
            futures::try_join!(
                self.applications_by_season(),
                self.age_group_by_tour_type(),
                self.popularity_trends(),
            )
            .inspect_err(|e| warn!("Predictive bundle failed: {}", e))?;

        Ok(PredictiveBundle {
            applications_by_season,
            age_group_by_tour_type,
            tour_type_popularity_trends,
        })
    }

    /// Both bundles in a single timestamped report.
    pub async fn get_full_report(&self) -> Result<FullReport, StoreError> {
        let (analysis_data, predictive_data) =
            futures::try_join!(self.get_analysis_bundle(), self.get_predictive_bundle())?;

        Ok(FullReport {
            timestamp: Utc::now(),
            analysis_data,
            predictive_data,
        })
    }

    /// Entity counts as of `today`.
    pub async fn get_overview(&self, today: NaiveDate) -> Result<Overview, StoreError> {
        let (tours, applications, contacts) = futures::try_join!(
            self.store.tours(),
            self.store.applications(),
            self.store.contacts(),
        )?;

        Ok(Overview {
            date: today,
            tour_count: tours.len(),
            bookable_tour_count: tours.iter().filter(|t| t.is_available(today)).count(),
            application_count: applications.len(),
            pending_application_count: applications
                .iter()
                .filter(|a| a.status == ApplicationStatus::Pending)
                .count(),
            contact_count: contacts.len(),
            client_count: contacts.iter().filter(|c| c.is_client).count(),
        })
    }
}
