use serde::{Deserialize, Serialize};

pub const CANONICAL_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub min: f64,
    pub label: String,
    pub color: String,
}

// rank is 0 for the top tier and tier_count for the fallback band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'a> {
    pub label: &'a str,
    pub color: &'a str,
    pub rank: usize,
    pub tier_count: usize,
}

impl Classification<'_> {
    pub fn is_top(&self) -> bool {
        self.rank == 0 && self.tier_count > 0
    }

    pub fn is_fallback(&self) -> bool {
        self.rank >= self.tier_count
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationTable {
    version: String,
    tiers: Vec<Tier>,
    fallback: Band,
}

fn tier(min: f64, label: &str, color: &str) -> Tier {
    Tier {
        min,
        label: label.to_string(),
        color: color.to_string(),
    }
}

fn band(label: &str, color: &str) -> Band {
    Band {
        label: label.to_string(),
        color: color.to_string(),
    }
}

impl ClassificationTable {
    pub fn new(version: impl Into<String>, mut tiers: Vec<Tier>, fallback: Band) -> Self {
        tiers.retain(|tier| tier.min.is_finite());
        tiers.sort_by(|a, b| b.min.total_cmp(&a.min));
        Self {
            version: version.into(),
            tiers,
            fallback,
        }
    }

    pub fn v1() -> Self {
        Self::new(
            "v1",
            vec![
                tier(90.0, "ممتاز", "green"),
                tier(75.0, "جيد جداً", "teal"),
                tier(60.0, "جيد", "blue"),
                tier(50.0, "مقبول", "amber"),
            ],
            band("ضعيف", "red"),
        )
    }

    pub fn v2() -> Self {
        Self::new(
            "v2",
            vec![
                tier(90.0, "ممتاز", "green"),
                tier(80.0, "جيد جداً", "teal"),
                tier(70.0, "جيد", "blue"),
                tier(60.0, "مقبول", "amber"),
            ],
            band("يحتاج تحسين", "red"),
        )
    }

    pub fn builtin(version: &str) -> Option<Self> {
        match version.trim().to_lowercase().as_str() {
            "v1" | "grade-table" => Some(Self::v1()),
            "v2" | "ai-analysis" => Some(Self::v2()),
            _ => None,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn fallback(&self) -> &Band {
        &self.fallback
    }

    // NaN and anything below the lowest threshold land in the fallback band.
    pub fn classify(&self, percentage: f64) -> Classification<'_> {
        let tier_count = self.tiers.len();
        for (rank, tier) in self.tiers.iter().enumerate() {
            if percentage >= tier.min {
                return Classification {
                    label: &tier.label,
                    color: &tier.color,
                    rank,
                    tier_count,
                };
            }
        }

        Classification {
            label: &self.fallback.label,
            color: &self.fallback.color,
            rank: tier_count,
            tier_count,
        }
    }
}

impl Default for ClassificationTable {
    fn default() -> Self {
        Self::v1()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v1_boundaries() {
        let table = ClassificationTable::v1();
        assert_eq!(table.classify(95.0).label, "ممتاز");
        assert_eq!(table.classify(90.0).label, "ممتاز");
        assert_eq!(table.classify(89.9).label, "جيد جداً");
        assert_eq!(table.classify(75.0).label, "جيد جداً");
        assert_eq!(table.classify(60.0).label, "جيد");
        assert_eq!(table.classify(50.0).label, "مقبول");
        assert_eq!(table.classify(49.9).label, "ضعيف");
    }

    #[test]
    fn v2_boundaries() {
        let table = ClassificationTable::v2();
        assert_eq!(table.classify(95.0).label, "ممتاز");
        assert_eq!(table.classify(80.0).label, "جيد جداً");
        assert_eq!(table.classify(79.9).label, "جيد");
        assert_eq!(table.classify(60.0).label, "مقبول");
        assert_eq!(table.classify(59.9).label, "يحتاج تحسين");
    }

    #[test]
    fn out_of_range_values_land_in_extreme_tiers() {
        for table in [ClassificationTable::v1(), ClassificationTable::v2()] {
            let high = table.classify(150.0);
            assert!(high.is_top());
            assert_eq!(high.color, "green");

            let low = table.classify(-5.0);
            assert!(low.is_fallback());
            assert_eq!(low.color, "red");

            assert!(table.classify(f64::NAN).is_fallback());
            assert!(table.classify(f64::INFINITY).is_top());
        }
    }

    #[test]
    fn custom_tables_are_sorted_and_ignore_bad_thresholds() {
        let table = ClassificationTable::new(
            "school-2026",
            vec![
                tier(50.0, "pass", "blue"),
                tier(f64::NAN, "broken", "black"),
                tier(85.0, "distinction", "green"),
            ],
            band("fail", "red"),
        );

        assert_eq!(table.tiers().len(), 2);
        assert_eq!(table.tiers()[0].label, "distinction");
        assert_eq!(table.classify(70.0).label, "pass");
        assert_eq!(table.classify(70.0).rank, 1);
        assert_eq!(table.classify(10.0).label, "fail");
    }

    #[test]
    fn builtin_lookup_accepts_names_and_versions() {
        assert_eq!(ClassificationTable::builtin("V1").unwrap().version(), "v1");
        assert_eq!(ClassificationTable::builtin("ai-analysis").unwrap().version(), "v2");
        assert!(ClassificationTable::builtin("v3").is_none());
        assert_eq!(ClassificationTable::default().version(), CANONICAL_VERSION);
    }
}
