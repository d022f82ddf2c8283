//! Categorical aggregation over entity collections.
//!
//! This module provides the distribution, cross-tabulation and ratio
//! computations behind the analysis and predictive bundles. Every
//! function is a pure single pass over records already read from the
//! entity store.

use crate::models::{AgeGroup, Application, Contact, Enrollment, Gender, Season, Tour, TourType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Default number of enrollments that makes a client "regular".
pub const DEFAULT_REGULAR_THRESHOLD: usize = 3;

/// Sparse count per category value. Categories with no records are absent.
pub type Distribution<K> = BTreeMap<K, usize>;

/// Dense age group x preferred tour type grid.
pub type CrossDistribution = BTreeMap<AgeGroup, BTreeMap<String, usize>>;

/// Converted clients versus leads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClientContactRatio {
    pub clients: usize,
    pub leads: usize,
    /// `clients / leads`, or 0 when there are no leads.
    pub ratio: f64,
}

/// Regular contacts measured against the number of clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegularClientPercentage {
    pub regular: usize,
    pub total: usize,
    /// `100 * regular / total`, or 0 when there are no clients.
    pub percentage: f64,
}

/// Count records by a grouping key. Records whose key is `None` are skipped.
pub fn count_by<T, K, F>(items: &[T], key: F) -> Distribution<K>
where
    K: Ord,
    F: Fn(&T) -> Option<K>,
{
    let mut dist: Distribution<K> = BTreeMap::new();

    for item in items {
        if let Some(k) = key(item) {
            *dist.entry(k).or_default() += 1;
        }
    }

    dist
}

/// Tours per season.
pub fn distribution_by_season(tours: &[Tour]) -> Distribution<Season> {
    count_by(tours, |t| t.season)
}

/// Tours per type, keyed by the literal type string.
pub fn distribution_by_type(tours: &[Tour]) -> Distribution<String> {
    count_by(tours, |t| t.type_key().map(str::to_string))
}

/// Contacts per gender.
pub fn distribution_by_gender(contacts: &[Contact]) -> Distribution<Gender> {
    count_by(contacts, |c| c.gender)
}

/// Contacts per age group.
pub fn distribution_by_age_group(contacts: &[Contact]) -> Distribution<AgeGroup> {
    count_by(contacts, |c| c.age_group)
}

/// Cross-tabulate contacts by age group and preferred tour type.
///
/// The result always holds every age group and every canonical tour type,
/// zero-filled. Contacts without an age group, without a preferred type,
/// or preferring a type outside the canonical set fill no cell. Preferred
/// types must match a canonical key exactly.
pub fn cross_by_age_and_preferred_type(contacts: &[Contact]) -> CrossDistribution {
    let mut grid: CrossDistribution = BTreeMap::new();

    for age_group in AgeGroup::ALL {
        let row = grid.entry(age_group).or_default();
        for tour_type in TourType::ALL {
            row.insert(tour_type.as_str().to_string(), 0);
        }
    }

    for contact in contacts {
        let (Some(age_group), Some(preferred)) =
            (contact.age_group, contact.preferred_tour_type.as_deref())
        else {
            continue;
        };

        let Ok(tour_type) = preferred.parse::<TourType>() else {
            continue;
        };

        if let Some(cell) = grid
            .get_mut(&age_group)
            .and_then(|row| row.get_mut(tour_type.as_str()))
        {
            *cell += 1;
        }
    }

    grid
}

/// Ratio of clients to leads.
pub fn client_contact_ratio(contacts: &[Contact]) -> ClientContactRatio {
    let clients = contacts.iter().filter(|c| c.is_client).count();
    let leads = contacts.len() - clients;

    let ratio = if leads > 0 {
        clients as f64 / leads as f64
    } else {
        0.0
    };

    ClientContactRatio {
        clients,
        leads,
        ratio,
    }
}

/// Share of regular contacts relative to the number of clients.
///
/// A contact is regular once it holds at least `threshold` enrollments,
/// whether or not it is flagged as a client. The denominator counts clients
/// only, so the percentage can exceed 100 when leads enroll repeatedly.
pub fn regular_client_percentage(
    contacts: &[Contact],
    enrollments: &[Enrollment],
    threshold: usize,
) -> RegularClientPercentage {
    let mut per_contact: HashMap<u64, usize> = HashMap::new();
    for enrollment in enrollments {
        *per_contact.entry(enrollment.contact_id).or_default() += 1;
    }

    let total = contacts.iter().filter(|c| c.is_client).count();
    let regular = contacts
        .iter()
        .filter(|c| per_contact.get(&c.id).copied().unwrap_or(0) >= threshold)
        .count();

    let percentage = if total > 0 {
        regular as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    RegularClientPercentage {
        regular,
        total,
        percentage,
    }
}

/// Applications per season of the tour they were made for.
///
/// Applications whose tour is unknown or has no season are not counted.
pub fn applications_by_season(applications: &[Application], tours: &[Tour]) -> Distribution<Season> {
    let seasons: HashMap<u64, Season> = tours
        .iter()
        .filter_map(|t| t.season.map(|s| (t.id, s)))
        .collect();

    count_by(applications, |a| seasons.get(&a.tour_id).copied())
}
