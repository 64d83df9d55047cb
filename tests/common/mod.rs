#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tallyplot::Args;

/// Cities with two Paris rows, one Lyon row.
pub const CITIES_CSV: &str = "city,country\nParis,FR\nParis,FR\nLyon,FR\n";

/// Write `content` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

/// CSV where `fruit` has counts apple=4, pear=3, plum=2, fig=1 and
/// `size` has small=5, large=5.
pub fn fruit_csv(dir: &Path) -> PathBuf {
    let mut content = String::from("fruit,size\n");
    let fruits = [("apple", 4), ("pear", 3), ("plum", 2), ("fig", 1)];
    let mut i = 0;
    for (fruit, count) in fruits {
        for _ in 0..count {
            let size = if i % 2 == 0 { "small" } else { "large" };
            content.push_str(&format!("{},{}\n", fruit, size));
            i += 1;
        }
    }
    write_file(dir, "fruit.csv", &content)
}

/// Arguments for a non-interactive run on `path`.
pub fn headless_args(path: PathBuf) -> Args {
    Args {
        path: Some(path),
        ..Args::default()
    }
}
