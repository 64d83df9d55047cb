mod common;

use common::{write_file, CITIES_CSV};
use std::fs;
use tallyplot::dataset::load_csv;
use tallyplot::labels::ColorGenerator;
use tallyplot::project::{self, ChartSettings, ChartType, Project, TitleAlignment};
use tempfile::TempDir;

fn cities_project(dir: &TempDir) -> Project {
    let path = write_file(dir.path(), "cities.csv", CITIES_CSV);
    let rows = load_csv(&path).unwrap();
    let mut project = Project::default();
    assert!(project.replace_dataset(path, rows));
    project
}

#[test]
fn test_replace_dataset_selects_first_column_and_marks_dirty() {
    let dir = TempDir::new().unwrap();
    let project = cities_project(&dir);

    assert_eq!(project.chart_settings.selected_column(), Some("city"));
    assert!(project.is_dirty());
    assert_eq!(project.display_name(), "cities.csv");
    assert_eq!(project.dataset.len(), 3);
}

#[test]
fn test_replace_dataset_keeps_existing_column() {
    let dir = TempDir::new().unwrap();
    let mut project = cities_project(&dir);
    project.select_column(Some("country".to_string()));

    let other = write_file(dir.path(), "more.csv", "id,country\n1,DE\n2,FR\n");
    let rows = load_csv(&other).unwrap();
    assert!(project.replace_dataset(other, rows));
    assert_eq!(project.chart_settings.selected_column(), Some("country"));
}

#[test]
fn test_empty_dataset_leaves_project_untouched() {
    let dir = TempDir::new().unwrap();
    let mut project = cities_project(&dir);
    let before = project.clone();

    assert!(!project.replace_dataset(dir.path().join("empty.csv"), Vec::new()));
    assert_eq!(project, before);
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let mut project = cities_project(&dir);
    project.apply_settings(ChartSettings {
        selected_key: Some("city".to_string()),
        chart_type: ChartType::Pie,
        top_n: 0,
        width: 800,
        height: 500,
        chart_title: "Where".to_string(),
        title_alignment: TitleAlignment::Right,
    });
    let mut colors = ColorGenerator::with_seed(9);
    project.recompute_chart(&mut colors);
    project.update_label("Paris", Some("City of Light"), Some("#112233"));

    let path = dir.path().join("saved").join("cities.json");
    project::save(&mut project, &path).unwrap();
    assert!(!project.is_dirty());

    let loaded = project::load(&path).unwrap();
    assert!(!loaded.is_dirty());
    assert_eq!(loaded.dataset, project.dataset);
    assert_eq!(loaded.chart_settings, project.chart_settings);
    assert_eq!(loaded.labels, project.labels);
    assert_eq!(loaded.csv_file_path, project.csv_file_path);
    assert_eq!(loaded.labels["Paris"].display_name, "City of Light");
    assert_eq!(loaded.labels["Paris"].color, "#112233");
}

#[test]
fn test_saved_json_uses_pascal_case() {
    let dir = TempDir::new().unwrap();
    let mut project = cities_project(&dir);
    let path = dir.path().join("cities.json");
    project::save(&mut project, &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"ChartSettings\""));
    assert!(text.contains("\"SelectedKey\""));
    assert!(text.contains("\"ChartType\": \"Bar\""));
    assert!(!text.contains("is_dirty"));
    assert!(!text.contains("IsDirty"));
}

#[test]
fn test_load_accepts_any_key_case_and_missing_fields() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "hand.json",
        r##"{
            "csvFilePath": "data/cities.csv",
            "DATASET": [
                {"Values": {"city": "Paris"}},
                {"values": {"city": "Lyon"}}
            ],
            "chartsettings": {"selectedkey": "city", "charttype": "Pie", "TOPN": 3},
            "Labels": {"Paris": {"displayname": "Paname", "COLOR": "#ff0000"}}
        }"##,
    );

    let loaded = project::load(&path).unwrap();
    assert_eq!(loaded.dataset.len(), 2);
    assert_eq!(loaded.dataset[1].get("city"), "Lyon");
    assert_eq!(loaded.chart_settings.selected_column(), Some("city"));
    assert_eq!(loaded.chart_settings.chart_type, ChartType::Pie);
    assert_eq!(loaded.chart_settings.top_n, 3);
    // Absent settings fall back to defaults
    assert_eq!(loaded.chart_settings.width, 600);
    assert_eq!(loaded.chart_settings.title_alignment, TitleAlignment::Center);
    assert_eq!(loaded.labels["Paris"].display_name, "Paname");
    assert_eq!(loaded.labels["Paris"].color, "#ff0000");
}

#[test]
fn test_load_unknown_enum_values_fall_back() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "odd.json",
        r#"{"ChartSettings": {"ChartType": null, "TitleAlignment": "Sideways"}}"#,
    );

    let loaded = project::load(&path).unwrap();
    assert_eq!(loaded.chart_settings.chart_type, ChartType::Bar);
    assert_eq!(loaded.chart_settings.title_alignment, TitleAlignment::Left);
    assert!(loaded.dataset.is_empty());
}

#[test]
fn test_load_errors() {
    let dir = TempDir::new().unwrap();

    let missing = project::load(&dir.path().join("missing.json")).unwrap_err();
    assert!(missing.to_string().contains("not found"));

    let garbage = write_file(dir.path(), "garbage.json", "{ not json");
    assert!(project::load(&garbage).is_err());

    let array = write_file(dir.path(), "array.json", "[1, 2, 3]");
    assert!(project::load(&array).is_err());
}

#[test]
fn test_failed_save_keeps_dirty_flag() {
    let dir = TempDir::new().unwrap();
    let mut project = cities_project(&dir);
    // A directory cannot be opened as the output file
    let target = dir.path().join("taken");
    fs::create_dir(&target).unwrap();

    assert!(project::save(&mut project, &target).is_err());
    assert!(project.is_dirty());
}

#[test]
fn test_reset_labels_clears_overrides() {
    let dir = TempDir::new().unwrap();
    let mut project = cities_project(&dir);
    let mut colors = ColorGenerator::with_seed(5);
    project.recompute_chart(&mut colors);
    project.update_label("Lyon", Some("Lugdunum"), None);

    project.reset_labels();
    assert!(project.labels.is_empty());

    let view = project.recompute_chart(&mut colors);
    assert_eq!(view.find("Lyon").unwrap().label, "Lyon");
}
