//! Point policy table.
//!
//! # Responsibility
//! - Map note-type labels to point weights.
//! - Normalize labels so lookups tolerate case and spacing differences.
//!
//! # Invariants
//! - Lookup keys are normalized with [`normalize_label`].
//! - Unknown labels resolve to `None`; callers decide how to degrade.

use crate::model::event::PointValue;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

pub const CALLOUT: &str = "Callout";
pub const NO_CALL_NO_SHOW: &str = "No Call No Show";
pub const TARDY_UNDER_15: &str = "Tardy (Under 15 Minutes)";
pub const TARDY_15_PLUS: &str = "Tardy (15+ Minutes)";
pub const LEFT_EARLY_UNDER_2H: &str = "Left Early (Under 2 Hours)";
pub const LEFT_EARLY_2H_PLUS: &str = "Left Early (2+ Hours)";
pub const VERBAL_WARNING: &str = "Verbal";
pub const WRITTEN_WARNING: &str = "Written";
pub const FINAL_WARNING: &str = "Final";
pub const BEREAVEMENT: &str = "Bereavement";

const STANDARD_POLICY: &[(&str, PointValue)] = &[
    (CALLOUT, PointValue::Weighted(2.0)),
    (NO_CALL_NO_SHOW, PointValue::Weighted(4.0)),
    (TARDY_UNDER_15, PointValue::Weighted(0.5)),
    (TARDY_15_PLUS, PointValue::Weighted(1.0)),
    (LEFT_EARLY_UNDER_2H, PointValue::Weighted(0.5)),
    (LEFT_EARLY_2H_PLUS, PointValue::Weighted(1.0)),
    (VERBAL_WARNING, PointValue::Unweighted),
    (WRITTEN_WARNING, PointValue::Unweighted),
    (FINAL_WARNING, PointValue::Unweighted),
    (BEREAVEMENT, PointValue::Weighted(0.0)),
];

/// Normalizes a note-type label for lookup: trimmed, single-spaced, lowercase.
pub fn normalize_label(label: &str) -> String {
    WHITESPACE_RE
        .replace_all(label.trim(), " ")
        .to_lowercase()
}

#[derive(Debug, Clone, PartialEq)]
struct PolicyEntry {
    label: String,
    value: PointValue,
}

/// Label-to-points table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointPolicy {
    entries: BTreeMap<String, PolicyEntry>,
}

impl PointPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in attendance policy.
    pub fn standard() -> Self {
        let mut policy = Self::new();
        for (label, value) in STANDARD_POLICY {
            policy.insert(*label, *value);
        }
        policy
    }

    /// Inserts or replaces one label, returning the previous value.
    ///
    /// Blank labels are ignored.
    pub fn insert(&mut self, label: impl Into<String>, value: PointValue) -> Option<PointValue> {
        let label = label.into();
        let key = normalize_label(&label);
        if key.is_empty() {
            return None;
        }
        self.entries
            .insert(
                key,
                PolicyEntry {
                    label: label.trim().to_string(),
                    value,
                },
            )
            .map(|previous| previous.value)
    }

    /// Resolves the point weight for `label`.
    pub fn resolve(&self, label: &str) -> Option<PointValue> {
        self.entries
            .get(&normalize_label(label))
            .map(|entry| entry.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(display label, value)` pairs ordered by normalized label.
    pub fn iter(&self) -> impl Iterator<Item = (&str, PointValue)> {
        self.entries
            .values()
            .map(|entry| (entry.label.as_str(), entry.value))
    }
}
