//! The project: dataset, chart settings and label overrides, persisted as JSON.

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use fs2::FileExt;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::chart_model::{compute_chart, ChartView};
use crate::dataset::{available_columns, Dataset};
use crate::labels::{update_label, ColorGenerator, LabelMap};

pub const DEFAULT_TOP_N: i32 = 5;
pub const DEFAULT_WIDTH: i32 = 600;
pub const DEFAULT_HEIGHT: i32 = 400;
pub const DEFAULT_TITLE: &str = "Data Chart";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartType {
    #[default]
    Bar,
    Pie,
}

impl ChartType {
    pub const ALL: [Self; 2] = [Self::Bar, Self::Pie];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "Bar",
            Self::Pie => "Pie",
        }
    }

    /// Case-insensitive; only "pie" selects a pie, anything else is a bar chart.
    pub fn parse_lenient(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("pie") {
            Self::Pie
        } else {
            Self::Bar
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Bar => Self::Pie,
            Self::Pie => Self::Bar,
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ChartType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::parse_lenient).unwrap_or_default())
    }
}

impl From<tallyplot_cli::ChartKind> for ChartType {
    fn from(kind: tallyplot_cli::ChartKind) -> Self {
        match kind {
            tallyplot_cli::ChartKind::Bar => Self::Bar,
            tallyplot_cli::ChartKind::Pie => Self::Pie,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TitleAlignment {
    Left,
    #[default]
    Center,
    Right,
}

impl TitleAlignment {
    pub const ALL: [Self; 3] = [Self::Left, Self::Center, Self::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Center => "Center",
            Self::Right => "Right",
        }
    }

    /// Case-insensitive; unrecognized values align left.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "center" => Self::Center,
            "right" => Self::Right,
            _ => Self::Left,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Left => Self::Center,
            Self::Center => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl fmt::Display for TitleAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TitleAlignment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .map(Self::parse_lenient)
            .unwrap_or(Self::Left))
    }
}

impl From<tallyplot_cli::Alignment> for TitleAlignment {
    fn from(align: tallyplot_cli::Alignment) -> Self {
        match align {
            tallyplot_cli::Alignment::Left => Self::Left,
            tallyplot_cli::Alignment::Center => Self::Center,
            tallyplot_cli::Alignment::Right => Self::Right,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ChartSettings {
    /// Column the dataset is grouped by.
    pub selected_key: Option<String>,
    pub chart_type: ChartType,
    /// Number of categories kept; 0 or negative keeps all.
    pub top_n: i32,
    pub width: i32,
    pub height: i32,
    pub chart_title: String,
    pub title_alignment: TitleAlignment,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            selected_key: None,
            chart_type: ChartType::Bar,
            top_n: DEFAULT_TOP_N,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            chart_title: DEFAULT_TITLE.to_string(),
            title_alignment: TitleAlignment::Center,
        }
    }
}

impl ChartSettings {
    pub fn selected_column(&self) -> Option<&str> {
        self.selected_key.as_deref().filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Project {
    pub csv_file_path: Option<PathBuf>,
    pub dataset: Dataset,
    pub chart_settings: ChartSettings,
    pub labels: LabelMap,
    #[serde(skip)]
    is_dirty: bool,
}

impl Project {
    /// An empty, clean project using `settings`.
    pub fn new_with_settings(settings: ChartSettings) -> Self {
        Self {
            chart_settings: settings,
            ..Self::default()
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// File name shown in the header.
    pub fn display_name(&self) -> String {
        self.csv_file_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string())
    }

    pub fn available_columns(&self) -> Vec<String> {
        available_columns(&self.dataset)
    }

    /// Replace the dataset with rows loaded from `path`.
    ///
    /// An empty `rows` leaves the project untouched and returns `false`. The
    /// selected column is kept when the new data has it, otherwise the first
    /// column is selected.
    pub fn replace_dataset(&mut self, path: PathBuf, rows: Dataset) -> bool {
        if rows.is_empty() {
            return false;
        }
        let columns = available_columns(&rows);
        self.dataset = rows;
        self.csv_file_path = Some(path);
        self.is_dirty = true;

        let keep = self
            .chart_settings
            .selected_column()
            .is_some_and(|selected| columns.iter().any(|c| c == selected));
        if !keep {
            self.chart_settings.selected_key = columns.into_iter().next();
        }
        true
    }

    /// Select the grouping column. Returns whether the selection changed.
    pub fn select_column(&mut self, column: Option<String>) -> bool {
        if self.chart_settings.selected_key == column {
            return false;
        }
        self.chart_settings.selected_key = column;
        self.is_dirty = true;
        true
    }

    pub fn apply_settings(&mut self, settings: ChartSettings) {
        self.chart_settings = settings;
        self.is_dirty = true;
    }

    /// Count, cut to top-N, resolve labels (creating missing ones) and build the view.
    pub fn recompute_chart(&mut self, colors: &mut ColorGenerator) -> ChartView {
        compute_chart(
            &self.dataset,
            self.chart_settings.selected_column(),
            self.chart_settings.top_n,
            &mut self.labels,
            colors,
        )
    }

    /// Write a legend edit through to the label of `key`.
    pub fn update_label(&mut self, key: &str, display_name: Option<&str>, color: Option<&str>) {
        update_label(&mut self.labels, key, display_name, color);
        self.is_dirty = true;
    }

    /// Forget every label override.
    pub fn reset_labels(&mut self) {
        self.labels.clear();
        self.is_dirty = true;
    }
}

/// Save `project` to `path` as pretty-printed JSON.
///
/// The dirty flag is cleared only when the whole file was written.
pub fn save(project: &mut Project, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(project)?;

    let mut file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .wrap_err_with(|| format!("Failed to save project {}", path.display()))?;
    file.lock_exclusive()?;
    file.write_all(json.as_bytes())?;
    file.flush()?;
    file.unlock()?;

    project.is_dirty = false;
    tracing::info!(path = %path.display(), rows = project.dataset.len(), "saved project");
    Ok(())
}

/// Load a project file. Field names match case-insensitively; the result is clean.
pub fn load(path: &Path) -> Result<Project> {
    if !path.exists() {
        return Err(eyre!("Project file not found: {}", path.display()));
    }
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read project {}", path.display()))?;
    let mut value: Value = serde_json::from_str(&text)
        .wrap_err_with(|| format!("Failed to load project {}", path.display()))?;
    if !value.is_object() {
        return Err(eyre!(
            "Failed to load project {}: expected a JSON object",
            path.display()
        ));
    }
    canonicalize_project_keys(&mut value);

    let project: Project = serde_json::from_value(value)
        .wrap_err_with(|| format!("Failed to load project {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        rows = project.dataset.len(),
        labels = project.labels.len(),
        "loaded project"
    );
    Ok(project)
}

const PROJECT_FIELDS: [&str; 4] = ["CsvFilePath", "Dataset", "ChartSettings", "Labels"];
const SETTINGS_FIELDS: [&str; 7] = [
    "SelectedKey",
    "ChartType",
    "TopN",
    "Width",
    "Height",
    "ChartTitle",
    "TitleAlignment",
];
const LABEL_FIELDS: [&str; 3] = ["Name", "DisplayName", "Color"];
const ROW_FIELDS: [&str; 1] = ["Values"];

/// Rename struct field keys to their canonical spelling. Map keys (row
/// columns, label keys) are data and keep their case.
fn canonicalize_project_keys(value: &mut Value) {
    let Some(root) = value.as_object_mut() else {
        return;
    };
    canonicalize_keys(root, &PROJECT_FIELDS);

    if let Some(settings) = root.get_mut("ChartSettings").and_then(Value::as_object_mut) {
        canonicalize_keys(settings, &SETTINGS_FIELDS);
    }
    if let Some(labels) = root.get_mut("Labels").and_then(Value::as_object_mut) {
        for label in labels.values_mut().filter_map(Value::as_object_mut) {
            canonicalize_keys(label, &LABEL_FIELDS);
        }
    }
    if let Some(rows) = root.get_mut("Dataset").and_then(Value::as_array_mut) {
        for row in rows.iter_mut().filter_map(Value::as_object_mut) {
            canonicalize_keys(row, &ROW_FIELDS);
        }
    }
}

fn canonicalize_keys(object: &mut Map<String, Value>, canonical: &[&str]) {
    let renames: Vec<(String, &str)> = object
        .keys()
        .filter_map(|key| {
            canonical
                .iter()
                .find(|name| name.eq_ignore_ascii_case(key) && **name != key.as_str())
                .map(|name| (key.clone(), *name))
        })
        .collect();
    for (from, to) in renames {
        if let Some(v) = object.remove(&from) {
            object.insert(to.to_string(), v);
        }
    }
}
