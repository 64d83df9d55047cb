//! Joining aggregated counts with labels into renderable chart items.

use crate::aggregate::{apply_top_n, count_by_key, CategoryCounts};
use crate::color::DEFAULT_LABEL_COLOR;
use crate::dataset::Row;
use crate::labels::{get_or_create, ColorGenerator, LabelMap};
use crate::statistics::Summary;

/// One bar or pie slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartItem {
    pub label: String,
    pub value: u64,
    pub color: String,
    /// Category key the item was built from; edits are written back under it.
    pub key: String,
}

/// Build chart items in the iteration order of `counts`.
///
/// Labels are only read here: a key without a label is shown under its raw
/// key in [`DEFAULT_LABEL_COLOR`]. An empty display name also falls back to
/// the raw key.
pub fn build_chart_items(counts: &CategoryCounts, labels: &LabelMap) -> Vec<ChartItem> {
    counts
        .iter()
        .map(|(key, &value)| {
            let info = labels.get(key);
            let label = info
                .map(|i| i.display_name.as_str())
                .filter(|name| !name.is_empty())
                .unwrap_or(key)
                .to_string();
            let color = info
                .map(|i| i.color.clone())
                .unwrap_or_else(|| DEFAULT_LABEL_COLOR.to_string());
            ChartItem {
                label,
                value,
                color,
                key: key.clone(),
            }
        })
        .collect()
}

/// Make sure every key in `counts` has a label, generating colors for new ones.
pub fn ensure_labels(counts: &CategoryCounts, labels: &mut LabelMap, colors: &mut ColorGenerator) {
    for key in counts.keys() {
        get_or_create(labels, key, colors);
    }
}

/// Current chart contents and the summary shown alongside it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartView {
    pub items: Vec<ChartItem>,
    pub summary: Summary,
}

impl ChartView {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn values(&self) -> Vec<u64> {
        self.items.iter().map(|item| item.value).collect()
    }

    pub fn find(&self, key: &str) -> Option<&ChartItem> {
        self.items.iter().find(|item| item.key == key)
    }
}

/// Count `column`, cut to `top_n`, create missing labels and build the items.
///
/// Returns an empty view when no column is selected or there are no rows.
pub fn compute_chart(
    rows: &[Row],
    column: Option<&str>,
    top_n: i32,
    labels: &mut LabelMap,
    colors: &mut ColorGenerator,
) -> ChartView {
    let Some(column) = column.filter(|c| !c.is_empty()) else {
        return ChartView::default();
    };
    if rows.is_empty() {
        return ChartView::default();
    }

    let counts = apply_top_n(count_by_key(rows, column), top_n);
    ensure_labels(&counts, labels, colors);
    let items = build_chart_items(&counts, labels);
    let values: Vec<u64> = items.iter().map(|item| item.value).collect();
    tracing::debug!(column, categories = items.len(), top_n, "recomputed chart");

    ChartView {
        summary: Summary::from_counts(&values),
        items,
    }
}
