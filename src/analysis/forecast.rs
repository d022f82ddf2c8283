//! Tour type popularity trends and short-horizon forecasting.
//!
//! Enrollments are bucketed by (tour type, calendar month) into sparse
//! monthly series. Series with enough history are extended with a linear
//! forecast whose slope is taken from the endpoints of a trailing window.
//! Months without enrollments are not synthesized, so the window is
//! positional: it spans the last available points regardless of calendar
//! gaps between them.

use crate::models::{Enrollment, Tour};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One month of a popularity series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// First day of the month.
    pub month: NaiveDate,
    pub count: u64,
    /// Set on forecast points only.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub predicted: bool,
}

impl TrendPoint {
    pub fn historical(month: NaiveDate, count: u64) -> Self {
        Self {
            month,
            count,
            predicted: false,
        }
    }

    pub fn predicted(month: NaiveDate, count: u64) -> Self {
        Self {
            month,
            count,
            predicted: true,
        }
    }
}

/// Popularity series per tour type.
pub type Trends = BTreeMap<String, Vec<TrendPoint>>;

/// Forecast tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastSettings {
    /// Number of future months appended to each forecast series.
    pub horizon: u32,
    /// Maximum number of trailing points used to estimate growth.
    pub window: usize,
    /// Minimum number of historical points required to forecast.
    pub min_history: usize,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            horizon: 3,
            window: 3,
            min_history: 2,
        }
    }
}

/// Bucket enrollments into monthly counts per tour type.
///
/// Enrollments whose tour cannot be resolved, or whose tour has no type,
/// are left out. Each series is sorted ascending by month.
pub fn monthly_history(enrollments: &[Enrollment], tours: &[Tour]) -> Trends {
    let types: HashMap<u64, &str> = tours
        .iter()
        .filter_map(|t| t.type_key().map(|k| (t.id, k)))
        .collect();

    let mut buckets: BTreeMap<String, BTreeMap<NaiveDate, u64>> = BTreeMap::new();
    for enrollment in enrollments {
        let Some(tour_type) = types.get(&enrollment.tour_id) else {
            continue;
        };
        *buckets
            .entry((*tour_type).to_string())
            .or_default()
            .entry(enrollment.month())
            .or_default() += 1;
    }

    buckets
        .into_iter()
        .map(|(tour_type, months)| {
            let series = months
                .into_iter()
                .map(|(month, count)| TrendPoint::historical(month, count))
                .collect();
            (tour_type, series)
        })
        .collect()
}

/// Average growth per point across the trailing window of `history`.
///
/// Uses the first and last point of the window only; 0 when the window
/// holds fewer than two points.
pub fn average_growth(history: &[TrendPoint], window: usize) -> f64 {
    let window_len = window.min(history.len());
    if window_len < 2 {
        return 0.0;
    }

    let trailing = &history[history.len() - window_len..];
    let first = trailing[0].count as f64;
    let last = trailing[window_len - 1].count as f64;

    (last - first) / (window_len - 1) as f64
}

/// Forecast points following `history`, or none when history is too short.
pub fn forecast(history: &[TrendPoint], settings: &ForecastSettings) -> Vec<TrendPoint> {
    let Some(last) = history.last() else {
        return Vec::new();
    };
    if history.len() < settings.min_history.max(1) {
        return Vec::new();
    }

    let growth = average_growth(history, settings.window);

    (1..=settings.horizon)
        .filter_map(|i| {
            let month = last.month.checked_add_months(Months::new(i))?;
            let projected = (last.count as f64 + growth * i as f64).round().max(0.0);
            Some(TrendPoint::predicted(month, projected as u64))
        })
        .collect()
}

/// Historical series per tour type, each followed by its forecast points.
pub fn popularity_trends(
    enrollments: &[Enrollment],
    tours: &[Tour],
    settings: &ForecastSettings,
) -> Trends {
    let mut trends = monthly_history(enrollments, tours);

    for series in trends.values_mut() {
        let predicted = forecast(series, settings);
        series.extend(predicted);
    }

    trends
}
