//! Tabular rows loaded from CSV. Every cell is a normalized string.

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use indexmap::IndexMap;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Value substituted for empty and null-like cells, and for columns a row does not have.
pub const UNKNOWN: &str = "unknown";

const NULL_TOKENS: [&str; 3] = ["null", "none", "undefined"];

/// Normalize a raw cell: empty, whitespace-only and null-like tokens become
/// [`UNKNOWN`], everything else is trimmed.
pub fn normalize_value(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return UNKNOWN.to_string();
    };
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || NULL_TOKENS
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
    {
        return UNKNOWN.to_string();
    }
    trimmed.to_string()
}

/// One record: column name to normalized value, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Row {
    pub values: IndexMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from raw pairs, normalizing each value.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), normalize_value(Some(v.as_ref()))))
            .collect();
        Self { values }
    }

    /// Value under `column`, or [`UNKNOWN`] when the row has no such column.
    pub fn get(&self, column: &str) -> &str {
        self.values
            .get(column)
            .map(String::as_str)
            .unwrap_or(UNKNOWN)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

pub type Dataset = Vec<Row>;

/// Column names of the first row, in header order.
pub fn available_columns(dataset: &[Row]) -> Vec<String> {
    dataset
        .first()
        .map(|row| row.columns().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Read a CSV file with a header row into normalized rows.
///
/// Every column is read as text. Ragged lines are truncated or padded with
/// nulls (which normalize to [`UNKNOWN`]); rows that fail to parse are skipped.
pub fn load_csv(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Err(eyre!("File not found: {}", path.display()));
    }

    let mut read_options = CsvReadOptions::default();
    read_options.has_header = true;
    // Schema inference over zero rows reads every column as String.
    read_options.infer_schema_length = Some(0);
    read_options.ignore_errors = true;
    read_options = read_options.map_parse_options(|opts| {
        opts.with_truncate_ragged_lines(true)
            .with_missing_is_null(true)
    });

    let df = match read_options
        .try_into_reader_with_file_path(Some(path.into()))
        .and_then(|reader| reader.finish())
    {
        Ok(df) => df,
        Err(PolarsError::NoData(_)) => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).wrap_err_with(|| format!("Failed to parse CSV {}", path.display()))
        }
    };

    let rows = rows_from_frame(&df)
        .wrap_err_with(|| format!("Failed to parse CSV {}", path.display()))?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded csv");
    Ok(rows)
}

fn rows_from_frame(df: &DataFrame) -> Result<Dataset> {
    let columns = df.get_columns();
    let mut text_columns = Vec::with_capacity(columns.len());
    for column in columns {
        let name = column.name().trim().to_string();
        let as_text = column.cast(&DataType::String)?;
        text_columns.push((name, as_text));
    }

    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let mut values = IndexMap::with_capacity(text_columns.len());
        for (name, column) in &text_columns {
            let cell = column.str()?.get(i);
            values.insert(name.clone(), normalize_value(cell));
        }
        rows.push(Row { values });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_null_like_tokens() {
        assert_eq!(normalize_value(Some(" NULL ")), UNKNOWN);
        assert_eq!(normalize_value(Some("None")), UNKNOWN);
        assert_eq!(normalize_value(Some("undefined")), UNKNOWN);
        assert_eq!(normalize_value(Some("   ")), UNKNOWN);
        assert_eq!(normalize_value(Some("")), UNKNOWN);
        assert_eq!(normalize_value(None), UNKNOWN);
    }

    #[test]
    fn test_normalize_trims() {
        assert_eq!(normalize_value(Some("  Paris ")), "Paris");
        assert_eq!(normalize_value(Some("nullable")), "nullable");
    }

    #[test]
    fn test_row_missing_column_is_unknown() {
        let row = Row::from_pairs([("city", "Lyon")]);
        assert_eq!(row.get("city"), "Lyon");
        assert_eq!(row.get("country"), UNKNOWN);
    }

    #[test]
    fn test_available_columns_follow_first_row() {
        let rows = vec![
            Row::from_pairs([("b", "1"), ("a", "2")]),
            Row::from_pairs([("c", "3")]),
        ];
        assert_eq!(available_columns(&rows), vec!["b", "a"]);
        assert!(available_columns(&[]).is_empty());
    }
}
