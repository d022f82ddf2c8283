//! Data models for tour analytics.
//!
//! This module contains the entity records supplied by the entity store
//! (tours, contacts, applications, enrollments), the categorical enums
//! used as grouping keys, and the pure derivation functions that the
//! write path invokes when persisting entities.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Season a tour runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Winter => write!(f, "WINTER"),
            Season::Spring => write!(f, "SPRING"),
            Season::Summer => write!(f, "SUMMER"),
            Season::Autumn => write!(f, "AUTUMN"),
        }
    }
}

/// Canonical tour types.
///
/// The tour type domain is open: tours store their type as a free-form
/// string and only these four values are known ahead of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TourType {
    Beach,
    Active,
    Family,
    Extreme,
}

impl TourType {
    pub const ALL: [TourType; 4] = [
        TourType::Beach,
        TourType::Active,
        TourType::Family,
        TourType::Extreme,
    ];

    /// Returns the string key used for this type in tour records.
    pub fn as_str(&self) -> &'static str {
        match self {
            TourType::Beach => "BEACH",
            TourType::Active => "ACTIVE",
            TourType::Family => "FAMILY",
            TourType::Extreme => "EXTREME",
        }
    }
}

impl fmt::Display for TourType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TourType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BEACH" => Ok(TourType::Beach),
            "ACTIVE" => Ok(TourType::Active),
            "FAMILY" => Ok(TourType::Family),
            "EXTREME" => Ok(TourType::Extreme),
            other => Err(format!("unknown tour type: {}", other)),
        }
    }
}

/// Age bucket of a contact, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "UNDER_18")]
    Under18,
    #[serde(rename = "AGE_18_20")]
    Age18To20,
    #[serde(rename = "AGE_21_25")]
    Age21To25,
    #[serde(rename = "AGE_26_35")]
    Age26To35,
    #[serde(rename = "AGE_36_50")]
    Age36To50,
    #[serde(rename = "OVER_50")]
    Over50,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 6] = [
        AgeGroup::Under18,
        AgeGroup::Age18To20,
        AgeGroup::Age21To25,
        AgeGroup::Age26To35,
        AgeGroup::Age36To50,
        AgeGroup::Over50,
    ];

    /// Human readable age range.
    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Under18 => "under 18",
            AgeGroup::Age18To20 => "18-20",
            AgeGroup::Age21To25 => "21-25",
            AgeGroup::Age26To35 => "26-35",
            AgeGroup::Age36To50 => "36-50",
            AgeGroup::Over50 => "over 50",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "MALE"),
            Gender::Female => write!(f, "FEMALE"),
            Gender::Other => write!(f, "OTHER"),
        }
    }
}

/// Lifecycle status of a booking application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

/// A tour offering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    /// Season the tour runs in; `None` for records without one.
    #[serde(default)]
    pub season: Option<Season>,
    /// Free-form tour type, usually one of the [`TourType`] keys.
    #[serde(rename = "type", default)]
    pub tour_type: Option<String>,
    pub total_slots: u32,
    pub available_slots: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub is_registration_closed: bool,
}

impl Tour {
    /// Whether the tour accepts new enrollments on `today`.
    ///
    /// Registration must be open, at least one slot must be free, and
    /// enrollment closes the day before departure.
    pub fn is_available(&self, today: NaiveDate) -> bool {
        let day_before_start = self.start_date.pred_opt().unwrap_or(self.start_date);
        !self.is_registration_closed && self.available_slots > 0 && today <= day_before_start
    }

    /// Duration of the tour in days, departure day included.
    pub fn duration_days(&self) -> i64 {
        tour_duration_days(self.start_date, self.end_date)
    }

    /// Tour type key exactly as stored; no trimming or case folding.
    pub fn type_key(&self) -> Option<&str> {
        self.tour_type.as_deref()
    }
}

/// Number of days a tour spans, counting both the departure and return day.
pub fn tour_duration_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().abs() + 1
}

/// A customer contact, either a converted client or a lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: u64,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub age_group: Option<AgeGroup>,
    #[serde(default)]
    pub gender: Option<Gender>,
    /// Free-form preferred tour type; expected to match a tour type key.
    #[serde(default)]
    pub preferred_tour_type: Option<String>,
    #[serde(default)]
    pub is_client: bool,
    #[serde(default)]
    pub discount_percent: u8,
}

/// A booking request for a tour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: u64,
    pub tour_id: u64,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

/// A confirmed contact-to-tour association.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: u64,
    pub contact_id: u64,
    pub tour_id: u64,
    #[serde(default)]
    pub application_id: Option<u64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Enrollment {
    /// First day of the calendar month the enrollment was created in.
    pub fn month(&self) -> NaiveDate {
        month_start(self.created_at.date_naive())
    }
}

/// Truncate a date to the first day of its month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
