mod common;

use common::{fruit_csv, headless_args, write_file, CITIES_CSV};
use std::fs;
use tallyplot::project::{self, ChartType};
use tallyplot::{run_headless, AppConfig, Args};
use tempfile::TempDir;

#[test]
fn test_export_and_save_from_csv() {
    let dir = TempDir::new().unwrap();
    let csv = write_file(dir.path(), "cities.csv", CITIES_CSV);
    let png = dir.path().join("cities.png");
    let json = dir.path().join("cities.json");
    let args = Args {
        export: Some(png.clone()),
        save_project: Some(json.clone()),
        ..headless_args(csv)
    };

    let outcome = run_headless(&args, &AppConfig::default()).unwrap();

    assert_eq!(outcome.view.items.len(), 2);
    assert_eq!(outcome.view.summary.mean, 1.5);
    assert_eq!(outcome.exported.as_deref(), Some(png.as_path()));
    assert_eq!(outcome.saved.as_deref(), Some(json.as_path()));
    assert!(png.exists());
    assert!(!outcome.project.is_dirty());

    let saved = project::load(&json).unwrap();
    assert_eq!(saved.dataset.len(), 3);
    assert_eq!(saved.chart_settings.selected_column(), Some("city"));
    assert_eq!(saved.labels.len(), 2);
}

#[test]
fn test_config_chart_settings_apply_to_csv_input() {
    let dir = TempDir::new().unwrap();
    let csv = fruit_csv(dir.path());
    let eps = dir.path().join("fruit.eps");
    let mut config = AppConfig::default();
    let args = Args {
        column: Some("fruit".to_string()),
        chart: Some(tallyplot_cli::ChartKind::Pie),
        top_n: Some(3),
        export: Some(eps.clone()),
        ..headless_args(csv)
    };
    config.chart.apply_args(&args);

    let outcome = run_headless(&args, &config).unwrap();

    assert_eq!(outcome.project.chart_settings.chart_type, ChartType::Pie);
    assert_eq!(outcome.view.items.len(), 3);
    let keys: Vec<&str> = outcome.view.items.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(keys, vec!["apple", "pear", "plum"]);
    let text = fs::read_to_string(&eps).unwrap();
    assert_eq!(text.matches(" arcn closepath").count(), 3);
}

#[test]
fn test_arguments_override_saved_project() {
    let dir = TempDir::new().unwrap();
    let csv = fruit_csv(dir.path());
    let json = dir.path().join("fruit.json");
    let first = Args {
        save_project: Some(json.clone()),
        ..headless_args(csv)
    };
    run_headless(&first, &AppConfig::default()).unwrap();

    let args = Args {
        top_n: Some(0),
        title: Some("All fruit".to_string()),
        column: Some("size".to_string()),
        save_project: Some(json.clone()),
        ..headless_args(json.clone())
    };
    let outcome = run_headless(&args, &AppConfig::default()).unwrap();

    assert_eq!(outcome.project.chart_settings.top_n, 0);
    assert_eq!(outcome.project.chart_settings.chart_title, "All fruit");
    assert_eq!(outcome.project.chart_settings.selected_column(), Some("size"));
    assert_eq!(outcome.view.items.len(), 2);
    // Labels created for the first column are kept
    assert!(outcome.project.labels.contains_key("apple"));
    assert!(outcome.project.labels.contains_key("small"));
}

#[test]
fn test_unknown_column_lists_available_ones() {
    let dir = TempDir::new().unwrap();
    let csv = write_file(dir.path(), "cities.csv", CITIES_CSV);
    let args = Args {
        column: Some("region".to_string()),
        export: Some(dir.path().join("out.png")),
        ..headless_args(csv)
    };

    let err = run_headless(&args, &AppConfig::default()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Column 'region' not found"));
    assert!(message.contains("city, country"));
    assert!(!dir.path().join("out.png").exists());
}

#[test]
fn test_missing_input_is_an_error() {
    let dir = TempDir::new().unwrap();
    let args = Args {
        export: Some(dir.path().join("out.png")),
        ..Args::default()
    };
    assert!(run_headless(&args, &AppConfig::default()).is_err());

    let missing = Args {
        export: Some(dir.path().join("out.png")),
        ..headless_args(dir.path().join("absent.csv"))
    };
    assert!(run_headless(&missing, &AppConfig::default()).is_err());
}

#[test]
fn test_csv_without_rows_is_an_error() {
    let dir = TempDir::new().unwrap();
    let csv = write_file(dir.path(), "empty.csv", "city,country\n");
    let args = Args {
        save_project: Some(dir.path().join("empty.json")),
        ..headless_args(csv)
    };

    let err = run_headless(&args, &AppConfig::default()).unwrap_err();
    assert!(err.to_string().contains("no data rows"));
    assert!(!dir.path().join("empty.json").exists());
}
