//! Markdown and JSON report generation.
//!
//! This module renders analysis bundles, predictive bundles and the
//! combined report for the command-line front end.

use super::assembler::{AnalysisBundle, FullReport, Overview, PredictiveBundle};
use crate::analysis::forecast::TrendPoint;
use crate::models::{AgeGroup, TourType};
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &FullReport) -> String {
    let mut output = String::new();

    output.push_str("# Tour Analytics Report\n\n");
    output.push_str(&format!(
        "*Generated: {}*\n\n",
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output.push_str("## Table of Contents\n\n");
    output.push_str("- [Analysis](#analysis)\n");
    output.push_str("- [Predictive Analytics](#predictive-analytics)\n\n");

    output.push_str(&generate_analysis_section(&report.analysis_data));
    output.push_str(&generate_predictive_section(&report.predictive_data));
    output.push_str(&generate_footer());

    output
}

/// Generate the analysis section.
pub fn generate_analysis_section(bundle: &AnalysisBundle) -> String {
    let mut section = String::new();

    section.push_str("## Analysis\n\n");

    section.push_str(&distribution_table(
        "Tours by Season",
        "Season",
        &bundle.season_distribution,
    ));
    section.push_str(&distribution_table(
        "Tours by Type",
        "Type",
        &bundle.type_distribution,
    ));
    section.push_str(&distribution_table(
        "Contacts by Gender",
        "Gender",
        &bundle.gender_distribution,
    ));
    section.push_str(&distribution_table(
        "Contacts by Age Group",
        "Age Group",
        &bundle.age_group_distribution,
    ));

    let ratio = &bundle.client_contact_ratio;
    section.push_str("### Clients and Leads\n\n");
    section.push_str(&format!("- **Clients:** {}\n", ratio.clients));
    section.push_str(&format!("- **Leads:** {}\n", ratio.leads));
    section.push_str(&format!("- **Client/Lead Ratio:** {:.2}\n\n", ratio.ratio));

    let regular = &bundle.regular_client_percentage;
    section.push_str("### Regular Clients\n\n");
    section.push_str(&format!(
        "{} regular contacts for {} clients (**{:.1}%**).\n\n",
        regular.regular, regular.total, regular.percentage
    ));

    section
}

/// Generate the predictive analytics section.
pub fn generate_predictive_section(bundle: &PredictiveBundle) -> String {
    let mut section = String::new();

    section.push_str("## Predictive Analytics\n\n");

    section.push_str(&distribution_table(
        "Applications by Season",
        "Season",
        &bundle.applications_by_season,
    ));
    section.push_str(&generate_cross_table(&bundle.age_group_by_tour_type));

    section.push_str("### Tour Type Popularity\n\n");
    if bundle.tour_type_popularity_trends.is_empty() {
        section.push_str("No enrollment history available.\n\n");
    }
    for (tour_type, points) in &bundle.tour_type_popularity_trends {
        section.push_str(&generate_trend_table(tour_type, points));
    }

    section
}

/// Generate the overview section shown for the `overview` report.
pub fn generate_overview_markdown(overview: &Overview) -> String {
    let mut output = String::new();

    output.push_str("# Tour Overview\n\n");
    output.push_str(&format!("*As of {}*\n\n", overview.date.format("%Y-%m-%d")));
    output.push_str("| Metric | Count |\n");
    output.push_str("|:---|:---:|\n");
    output.push_str(&format!("| Tours | {} |\n", overview.tour_count));
    output.push_str(&format!("| Bookable tours | {} |\n", overview.bookable_tour_count));
    output.push_str(&format!("| Applications | {} |\n", overview.application_count));
    output.push_str(&format!(
        "| Pending applications | {} |\n",
        overview.pending_application_count
    ));
    output.push_str(&format!("| Contacts | {} |\n", overview.contact_count));
    output.push_str(&format!("| Clients | {} |\n\n", overview.client_count));

    output
}

fn distribution_table<K: Display>(title: &str, column: &str, dist: &BTreeMap<K, usize>) -> String {
    let mut table = String::new();

    table.push_str(&format!("### {}\n\n", title));

    if dist.is_empty() {
        table.push_str("No data.\n\n");
        return table;
    }

    table.push_str(&format!("| {} | Count |\n", column));
    table.push_str("|:---|:---:|\n");
    for (key, count) in dist {
        table.push_str(&format!("| {} | {} |\n", key, count));
    }
    table.push('\n');

    table
}

fn generate_cross_table(grid: &BTreeMap<AgeGroup, BTreeMap<String, usize>>) -> String {
    let mut table = String::new();

    table.push_str("### Age Group by Preferred Tour Type\n\n");

    table.push_str("| Age Group |");
    for tour_type in TourType::ALL {
        table.push_str(&format!(" {} |", tour_type));
    }
    table.push('\n');
    table.push_str("|:---|");
    for _ in TourType::ALL {
        table.push_str(":---:|");
    }
    table.push('\n');

    for (age_group, row) in grid {
        table.push_str(&format!("| {} |", age_group));
        for tour_type in TourType::ALL {
            let count = row.get(tour_type.as_str()).copied().unwrap_or(0);
            table.push_str(&format!(" {} |", count));
        }
        table.push('\n');
    }
    table.push('\n');

    table
}

fn generate_trend_table(tour_type: &str, points: &[TrendPoint]) -> String {
    let mut table = String::new();

    table.push_str(&format!("#### {}\n\n", tour_type));
    table.push_str("| Month | Enrollments | |\n");
    table.push_str("|:---|:---:|:---|\n");
    for point in points {
        let marker = if point.predicted { "forecast" } else { "" };
        table.push_str(&format!(
            "| {} | {} | {} |\n",
            point.month.format("%Y-%m"),
            point.count,
            marker
        ));
    }
    table.push('\n');

    table
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by TourStat*\n".to_string()
}

/// Serialize any report structure as pretty-printed JSON.
pub fn generate_json_report<T: Serialize>(report: &T) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
