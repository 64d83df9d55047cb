//! Counting category occurrences and the top-N cutoff.

use indexmap::IndexMap;

use crate::dataset::Row;

/// Category key to occurrence count, in first-encountered order.
pub type CategoryCounts = IndexMap<String, u64>;

/// Count how many rows carry each value of `column`.
///
/// Rows without the column count towards [`crate::dataset::UNKNOWN`]. Keys keep
/// the order in which they are first seen, so identical input always yields
/// identical output. An empty column name yields no counts.
pub fn count_by_key(rows: &[Row], column: &str) -> CategoryCounts {
    let mut counts = CategoryCounts::new();
    if column.is_empty() {
        return counts;
    }
    for row in rows {
        *counts.entry(row.get(column).to_string()).or_insert(0) += 1;
    }
    counts
}

/// Keep only the `n` most frequent entries.
///
/// `n <= 0` returns the counts unchanged. Otherwise the result is ordered by
/// descending count; ties keep their first-encountered order (stable sort).
pub fn apply_top_n(counts: CategoryCounts, n: i32) -> CategoryCounts {
    if n <= 0 {
        return counts;
    }
    let mut entries: Vec<(String, u64)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(n as usize);
    entries.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::UNKNOWN;

    fn rows(values: &[&str]) -> Vec<Row> {
        values
            .iter()
            .map(|v| Row::from_pairs([("city", *v)]))
            .collect()
    }

    #[test]
    fn test_count_sums_to_row_count() {
        let data = rows(&["Paris", "Paris", "Lyon", "Nice", "Lyon", "Paris"]);
        let counts = count_by_key(&data, "city");
        assert_eq!(counts.values().sum::<u64>(), data.len() as u64);
        assert_eq!(counts["Paris"], 3);
        assert_eq!(counts["Lyon"], 2);
        assert_eq!(counts["Nice"], 1);
    }

    #[test]
    fn test_count_keeps_first_seen_order() {
        let counts = count_by_key(&rows(&["b", "a", "b", "c"]), "city");
        let keys: Vec<&str> = counts.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_missing_column_counts_as_unknown() {
        let data = vec![
            Row::from_pairs([("city", "Paris")]),
            Row::from_pairs([("country", "FR")]),
        ];
        let counts = count_by_key(&data, "city");
        assert_eq!(counts[UNKNOWN], 1);
        assert_eq!(counts["Paris"], 1);
    }

    #[test]
    fn test_empty_column_name_yields_nothing() {
        assert!(count_by_key(&rows(&["Paris"]), "").is_empty());
    }

    #[test]
    fn test_top_n_non_positive_is_identity() {
        let counts = count_by_key(&rows(&["a", "b", "b"]), "city");
        assert_eq!(apply_top_n(counts.clone(), 0), counts);
        assert_eq!(apply_top_n(counts.clone(), -3), counts);
    }

    #[test]
    fn test_top_n_keeps_largest() {
        let counts = count_by_key(&rows(&["a", "b", "b", "c", "c", "c", "d"]), "city");
        let top = apply_top_n(counts.clone(), 2);
        assert_eq!(top.len(), 2);
        let min_kept = top.values().min().copied().unwrap_or(0);
        for (key, value) in &counts {
            if !top.contains_key(key) {
                assert!(*value <= min_kept);
            }
        }
        let keys: Vec<&str> = top.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["c", "b"]);
    }

    #[test]
    fn test_top_n_ties_keep_first_seen() {
        let counts = count_by_key(&rows(&["x", "y", "z", "y", "x", "z"]), "city");
        let top = apply_top_n(counts, 2);
        let keys: Vec<&str> = top.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["x", "y"]);
    }

    #[test]
    fn test_top_n_larger_than_len() {
        let counts = count_by_key(&rows(&["a", "b"]), "city");
        assert_eq!(apply_top_n(counts, 10).len(), 2);
    }
}
