use inventory_table::{Field, ItemTable};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Coarse condition of an item, derived from its free-text status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    Good,
    Faulty,
    InRepair,
    Unknown,
}

static GOOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)mới|tốt|new").expect("status pattern must compile"));
static FAULTY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)hỏng|lỗi|hư").expect("status pattern must compile"));
static IN_REPAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)bảo hành|sửa").expect("status pattern must compile"));

impl StatusClass {
    /// First matching class wins, checked good → faulty → in repair.
    #[must_use]
    pub fn classify(status: &str) -> Self {
        if GOOD.is_match(status) {
            Self::Good
        } else if FAULTY.is_match(status) {
            Self::Faulty
        } else if IN_REPAIR.is_match(status) {
            Self::InRepair
        } else {
            Self::Unknown
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Faulty => "faulty",
            Self::InRepair => "in_repair",
            Self::Unknown => "unknown",
        }
    }
}

/// Headline numbers for a loaded table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InventoryStats {
    pub total: usize,
    /// `None` when the table has no status column
    pub good: Option<usize>,
}

impl InventoryStats {
    #[must_use]
    pub fn collect(table: &ItemTable) -> Self {
        let good = table.has(Field::Status).then(|| {
            table
                .records()
                .iter()
                .filter_map(|r| table.field(r, Field::Status))
                .filter(|s| StatusClass::classify(s) == StatusClass::Good)
                .count()
        });
        Self {
            total: table.len(),
            good,
        }
    }
}
