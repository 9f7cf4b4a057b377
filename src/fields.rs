//! Enumerations and field types for tasks.
//!
//! This module defines the structured data types used to categorise tasks:
//! priority levels and recurrence periods. Both are persisted as their
//! symbolic upper-case names, and decoding an unknown name is an error.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Priority classification for task importance.
///
/// Sorting treats Urgent as the highest priority and Low as the lowest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Priority {
    /// Rank for sorting. Higher means more urgent.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
            Priority::Urgent => 3,
        }
    }
}

/// Repeat period for recurring tasks.
///
/// Present as data only; no expansion schedule is derived from it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecurringType {
    Daily,
    Weekly,
    Monthly,
}

/// Format a priority level for display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::Low => "Low",
        Priority::Medium => "Medium",
        Priority::High => "High",
        Priority::Urgent => "Urgent",
    }
}

/// Format a recurrence period for display.
pub fn format_recurring(r: Option<RecurringType>) -> &'static str {
    match r {
        Some(RecurringType::Daily) => "Daily",
        Some(RecurringType::Weekly) => "Weekly",
        Some(RecurringType::Monthly) => "Monthly",
        None => "-",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_codec() {
        assert_eq!(serde_json::to_string(&Priority::Urgent).unwrap(), "\"URGENT\"");
        assert_eq!(serde_json::from_str::<Priority>("\"LOW\"").unwrap(), Priority::Low);
        // Unknown names must fail to decode rather than fall back.
        assert!(serde_json::from_str::<Priority>("\"CRITICAL\"").is_err());
        assert!(serde_json::from_str::<Priority>("\"low\"").is_err());
    }

    #[test]
    fn test_recurring_codec() {
        assert_eq!(serde_json::to_string(&RecurringType::Weekly).unwrap(), "\"WEEKLY\"");
        assert_eq!(
            serde_json::from_str::<RecurringType>("\"MONTHLY\"").unwrap(),
            RecurringType::Monthly
        );
        assert!(serde_json::from_str::<RecurringType>("\"YEARLY\"").is_err());
    }

    #[test]
    fn test_priority_rank_order() {
        assert!(Priority::Urgent.rank() > Priority::High.rank());
        assert!(Priority::High.rank() > Priority::Medium.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
    }
}
