//! Per-category display names and colors.

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::color::DEFAULT_LABEL_COLOR;

/// Lowest and highest channel value for generated colors. Keeps generated
/// colors away from black (the text color) and white (the background).
pub const GENERATED_CHANNEL_MIN: u8 = 50;
pub const GENERATED_CHANNEL_MAX: u8 = 200;

/// Display overrides for one category key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LabelInfo {
    /// The raw category key this label belongs to.
    pub name: String,
    pub display_name: String,
    /// Hex color string as entered by the user; may be unparsable.
    pub color: String,
}

impl Default for LabelInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            display_name: String::new(),
            color: DEFAULT_LABEL_COLOR.to_string(),
        }
    }
}

impl LabelInfo {
    /// Label shown for `key` until the user renames it.
    pub fn for_key(key: &str, color: String) -> Self {
        Self {
            name: key.to_string(),
            display_name: key.to_string(),
            color,
        }
    }
}

/// Category key to label, in creation order.
pub type LabelMap = IndexMap<String, LabelInfo>;

/// Source of colors for newly seen categories.
pub struct ColorGenerator {
    rng: StdRng,
}

impl ColorGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic sequence, for tests and reproducible exports.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// `#rrggbb` with each channel drawn uniformly from
    /// `GENERATED_CHANNEL_MIN..=GENERATED_CHANNEL_MAX`.
    pub fn next_color(&mut self) -> String {
        let mut channel = || {
            self.rng
                .gen_range(GENERATED_CHANNEL_MIN..=GENERATED_CHANNEL_MAX)
        };
        let (r, g, b) = (channel(), channel(), channel());
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }
}

impl Default for ColorGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Return the label for `key`, creating it on first sight with
/// display name = key and a freshly generated color.
pub fn get_or_create<'a>(
    labels: &'a mut LabelMap,
    key: &str,
    colors: &mut ColorGenerator,
) -> &'a mut LabelInfo {
    labels
        .entry(key.to_string())
        .or_insert_with(|| LabelInfo::for_key(key, colors.next_color()))
}

/// Apply a user edit to the label of `key`.
///
/// A missing entry is created first with the label defaults (empty display
/// name, default gray) and then overwritten with the edited fields.
pub fn update_label(
    labels: &mut LabelMap,
    key: &str,
    display_name: Option<&str>,
    color: Option<&str>,
) {
    let info = labels.entry(key.to_string()).or_insert_with(|| LabelInfo {
        name: key.to_string(),
        ..LabelInfo::default()
    });
    if let Some(display_name) = display_name {
        info.display_name = display_name.to_string();
    }
    if let Some(color) = color {
        info.color = color.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::parse_color;

    #[test]
    fn test_generated_colors_stay_in_range() {
        let mut colors = ColorGenerator::with_seed(7);
        for _ in 0..500 {
            let c = parse_color(&colors.next_color()).unwrap();
            for channel in [c.r, c.g, c.b] {
                assert!((GENERATED_CHANNEL_MIN..=GENERATED_CHANNEL_MAX).contains(&channel));
            }
            assert_eq!(c.a, 255);
        }
    }

    #[test]
    fn test_seeded_generators_agree() {
        let mut a = ColorGenerator::with_seed(42);
        let mut b = ColorGenerator::with_seed(42);
        assert_eq!(a.next_color(), b.next_color());
        assert_eq!(a.next_color(), b.next_color());
    }

    #[test]
    fn test_get_or_create_is_stable() {
        let mut labels = LabelMap::new();
        let mut colors = ColorGenerator::with_seed(1);
        let first = get_or_create(&mut labels, "Paris", &mut colors).clone();
        assert_eq!(first.name, "Paris");
        assert_eq!(first.display_name, "Paris");
        let again = get_or_create(&mut labels, "Paris", &mut colors).clone();
        assert_eq!(first, again);
        assert_eq!(labels.len(), 1);
    }

    #[test]
    fn test_update_creates_missing_entry() {
        let mut labels = LabelMap::new();
        update_label(&mut labels, "Lyon", None, Some("#112233"));
        let info = &labels["Lyon"];
        assert_eq!(info.name, "Lyon");
        assert_eq!(info.display_name, "");
        assert_eq!(info.color, "#112233");
    }

    #[test]
    fn test_update_overwrites_only_given_fields() {
        let mut labels = LabelMap::new();
        labels.insert("Nice".into(), LabelInfo::for_key("Nice", "#010203".into()));
        update_label(&mut labels, "Nice", Some("Nizza"), None);
        assert_eq!(labels["Nice"].display_name, "Nizza");
        assert_eq!(labels["Nice"].color, "#010203");
    }
}
