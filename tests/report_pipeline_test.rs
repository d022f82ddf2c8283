use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;
use tourstat::analysis::TrendPoint;
use tourstat::models::{AgeGroup, Season};
use tourstat::report::{generate_json_report, generate_markdown_report};
use tourstat::{AnalysisSettings, EntityStore, JsonFileStore, ReportAssembler, StoreError};

/// Snapshot with BEACH enrollments growing 1, 2, 3 over Jan-Mar and a
/// single month of FAMILY history.
fn sample_data() -> serde_json::Value {
    let mut enrollments = Vec::new();
    let mut id = 0;
    for (month, count) in [(1, 1), (2, 2), (3, 3)] {
        for _ in 0..count {
            id += 1;
            enrollments.push(json!({
                "id": id,
                "contactId": id,
                "tourId": 1,
                "createdAt": format!("2025-{:02}-15T08:00:00Z", month)
            }));
        }
    }
    enrollments.push(json!({
        "id": 100, "contactId": 1, "tourId": 2, "createdAt": "2025-02-01T00:00:00Z"
    }));
    enrollments.push(json!({
        "id": 101, "contactId": 1, "tourId": 3, "createdAt": "2025-03-20T00:00:00Z"
    }));

    json!({
        "tours": [
            {"id": 1, "season": "SUMMER", "type": "BEACH", "totalSlots": 30,
             "availableSlots": 10, "startDate": "2025-07-01", "endDate": "2025-07-14"},
            {"id": 2, "season": "WINTER", "type": "FAMILY", "totalSlots": 12,
             "availableSlots": 0, "startDate": "2025-12-20", "endDate": "2025-12-27"},
            {"id": 3, "season": "SUMMER", "type": "SAFARI", "totalSlots": 8,
             "availableSlots": 8, "startDate": "2025-08-01", "endDate": "2025-08-10"}
        ],
        "contacts": [
            {"id": 1, "ageGroup": "AGE_26_35", "gender": "FEMALE", "isClient": true,
             "preferredTourType": "BEACH"},
            {"id": 2, "ageGroup": "AGE_26_35", "gender": "MALE", "isClient": true},
            {"id": 3, "ageGroup": "OVER_50", "gender": "FEMALE", "isClient": false,
             "preferredTourType": "FAMILY"},
            {"id": 4, "ageGroup": "UNDER_18", "gender": "OTHER", "isClient": false}
        ],
        "applications": [
            {"id": 1, "tourId": 1, "status": "APPROVED", "createdAt": "2025-01-10T10:00:00Z"},
            {"id": 2, "tourId": 1, "createdAt": "2025-01-11T10:00:00Z"},
            {"id": 3, "tourId": 2, "status": "REJECTED", "createdAt": "2025-02-11T10:00:00Z"}
        ],
        "enrollments": enrollments
    })
}

fn write_data(value: &serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(value.to_string().as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_full_report_from_data_file() {
    let file = write_data(&sample_data());
    let assembler =
        ReportAssembler::new(JsonFileStore::new(file.path()), AnalysisSettings::default());

    let report = assembler.get_full_report().await.unwrap();

    let analysis = &report.analysis_data;
    assert_eq!(analysis.season_distribution.get(&Season::Summer), Some(&2));
    assert_eq!(analysis.type_distribution.get("SAFARI"), Some(&1));
    assert_eq!(analysis.client_contact_ratio.clients, 2);
    assert_eq!(analysis.client_contact_ratio.ratio, 1.0);
    // Contact 1 has three enrollments (tours 1, 2 and 3).
    assert_eq!(analysis.regular_client_percentage.regular, 1);
    assert_eq!(analysis.regular_client_percentage.percentage, 50.0);

    let predictive = &report.predictive_data;
    assert_eq!(predictive.applications_by_season.get(&Season::Summer), Some(&2));
    assert_eq!(predictive.applications_by_season.get(&Season::Winter), Some(&1));
    assert_eq!(predictive.age_group_by_tour_type[&AgeGroup::Age26To35]["BEACH"], 1);
    assert_eq!(predictive.age_group_by_tour_type[&AgeGroup::Over50]["FAMILY"], 1);

    let beach = &predictive.tour_type_popularity_trends["BEACH"];
    let forecast: Vec<&TrendPoint> = beach.iter().filter(|p| p.predicted).collect();
    assert_eq!(forecast.len(), 3);
    assert_eq!(forecast[0].month.to_string(), "2025-04-01");
    assert_eq!(
        forecast.iter().map(|p| p.count).collect::<Vec<_>>(),
        vec![4, 5, 6]
    );
    assert_eq!(predictive.tour_type_popularity_trends["FAMILY"].len(), 1);

    let markdown = generate_markdown_report(&report);
    assert!(markdown.contains("#### BEACH"));

    let json: serde_json::Value =
        serde_json::from_str(&generate_json_report(&report).unwrap()).unwrap();
    assert_eq!(json["predictiveData"]["applicationsBySeason"]["SUMMER"], json!(2));
    assert_eq!(json["analysisData"]["clientContactRatio"]["leads"], json!(2));
}

#[tokio::test]
async fn test_overview_respects_availability() {
    let file = write_data(&sample_data());
    let store = JsonFileStore::new(file.path());

    let today = chrono::NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
    let available = store.available_tours(today).await.unwrap();
    assert_eq!(available.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3]);

    let assembler = ReportAssembler::new(store, AnalysisSettings::default());
    let overview = assembler.get_overview(today).await.unwrap();
    assert_eq!(overview.tour_count, 3);
    assert_eq!(overview.bookable_tour_count, 1);
    assert_eq!(overview.pending_application_count, 1);
}

#[tokio::test]
async fn test_invalid_snapshot_fails_every_bundle() {
    let mut data = sample_data();
    data["enrollments"]
        .as_array_mut()
        .unwrap()
        .push(json!({"id": 200, "contactId": 1, "tourId": 1, "createdAt": "2025-01-15T08:00:00Z"}));
    let file = write_data(&data);
    let assembler =
        ReportAssembler::new(JsonFileStore::new(file.path()), AnalysisSettings::default());

    let err = assembler.get_analysis_bundle().await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidSnapshot(_)));
    assert!(assembler.get_predictive_bundle().await.is_err());
}

#[test]
fn test_missing_data_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let assembler = ReportAssembler::new(
        JsonFileStore::new(dir.path().join("absent.json")),
        AnalysisSettings::default(),
    );

    let result = tokio_test::block_on(assembler.get_full_report());
    assert!(matches!(result, Err(StoreError::Io { .. })));
}
