use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum FeedbackCategory {
    Academic,
    Behavior,
    Homework,
    #[default]
    Other,
}

impl FeedbackCategory {
    pub const ALL: [FeedbackCategory; 4] = [
        FeedbackCategory::Academic,
        FeedbackCategory::Behavior,
        FeedbackCategory::Homework,
        FeedbackCategory::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FeedbackCategory::Academic => "أكاديمي",
            FeedbackCategory::Behavior => "سلوك",
            FeedbackCategory::Homework => "واجبات",
            FeedbackCategory::Other => "أخرى",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            FeedbackCategory::Academic => "blue",
            FeedbackCategory::Behavior => "purple",
            FeedbackCategory::Homework => "amber",
            FeedbackCategory::Other => "gray",
        }
    }
}

impl fmt::Display for FeedbackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const CATEGORY_ALIASES: &[(&str, FeedbackCategory)] = &[
    ("academic", FeedbackCategory::Academic),
    ("academics", FeedbackCategory::Academic),
    ("أكاديمي", FeedbackCategory::Academic),
    ("اكاديمي", FeedbackCategory::Academic),
    ("دراسي", FeedbackCategory::Academic),
    ("behavior", FeedbackCategory::Behavior),
    ("behaviour", FeedbackCategory::Behavior),
    ("behavioral", FeedbackCategory::Behavior),
    ("conduct", FeedbackCategory::Behavior),
    ("سلوك", FeedbackCategory::Behavior),
    ("سلوكي", FeedbackCategory::Behavior),
    ("homework", FeedbackCategory::Homework),
    ("assignment", FeedbackCategory::Homework),
    ("assignments", FeedbackCategory::Homework),
    ("واجبات", FeedbackCategory::Homework),
    ("واجب", FeedbackCategory::Homework),
    ("other", FeedbackCategory::Other),
    ("general", FeedbackCategory::Other),
    ("أخرى", FeedbackCategory::Other),
    ("اخرى", FeedbackCategory::Other),
];

fn alias_table() -> &'static HashMap<&'static str, FeedbackCategory> {
    static TABLE: OnceLock<HashMap<&'static str, FeedbackCategory>> = OnceLock::new();
    TABLE.get_or_init(|| CATEGORY_ALIASES.iter().copied().collect())
}

/// Map a raw backend category to its canonical bucket. Matching is trimmed
/// and case-insensitive; anything unknown, empty or missing is `Other`.
pub fn normalize(raw: Option<&str>) -> FeedbackCategory {
    let key = match raw.map(str::trim) {
        Some(key) if !key.is_empty() => key.to_lowercase(),
        _ => return FeedbackCategory::Other,
    };

    alias_table()
        .get(key.as_str())
        .copied()
        .unwrap_or(FeedbackCategory::Other)
}

impl<'de> Deserialize<'de> for FeedbackCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(raw)) => normalize(Some(&raw)),
            _ => FeedbackCategory::Other,
        })
    }
}

impl Serialize for FeedbackCategory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: FeedbackCategory,
    pub count: usize,
}

/// Count per category, most frequent first; ties keep canonical order.
/// Categories with no items are omitted.
pub fn category_mix<I>(categories: I) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = FeedbackCategory>,
{
    let mut counts: HashMap<FeedbackCategory, usize> = HashMap::new();
    for category in categories {
        *counts.entry(category).or_insert(0) += 1;
    }

    let mut mix: Vec<CategoryCount> = FeedbackCategory::ALL
        .iter()
        .filter_map(|category| {
            counts.get(category).map(|count| CategoryCount {
                category: *category,
                count: *count,
            })
        })
        .collect();

    mix.sort_by(|a, b| b.count.cmp(&a.count));
    mix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values_map_case_insensitively() {
        assert_eq!(normalize(Some("ACADEMIC")), FeedbackCategory::Academic);
        assert_eq!(normalize(Some("  Behaviour ")), FeedbackCategory::Behavior);
        assert_eq!(normalize(Some("واجبات")), FeedbackCategory::Homework);
        assert_eq!(normalize(Some("سلوك")), FeedbackCategory::Behavior);
        assert_eq!(normalize(Some("ACADEMIC")).label(), "أكاديمي");
    }

    #[test]
    fn missing_or_unknown_values_fall_back_to_other() {
        assert_eq!(normalize(None), FeedbackCategory::Other);
        assert_eq!(normalize(Some("")), FeedbackCategory::Other);
        assert_eq!(normalize(Some("   ")), FeedbackCategory::Other);
        assert_eq!(normalize(Some("sports")), FeedbackCategory::Other);
        assert_eq!(normalize(None).label(), "أخرى");
    }

    #[test]
    fn deserializes_from_raw_backend_values() {
        let parsed: Vec<FeedbackCategory> =
            serde_json::from_str(r#"["Homework", null, 3, "misc"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                FeedbackCategory::Homework,
                FeedbackCategory::Other,
                FeedbackCategory::Other,
                FeedbackCategory::Other,
            ]
        );
    }

    #[test]
    fn mix_orders_by_count_then_canonical_order() {
        let mix = category_mix(vec![
            FeedbackCategory::Other,
            FeedbackCategory::Homework,
            FeedbackCategory::Homework,
            FeedbackCategory::Academic,
        ]);
        assert_eq!(mix.len(), 3);
        assert_eq!(mix[0].category, FeedbackCategory::Homework);
        assert_eq!(mix[0].count, 2);
        assert_eq!(mix[1].category, FeedbackCategory::Academic);
        assert_eq!(mix[2].category, FeedbackCategory::Other);
    }
}
