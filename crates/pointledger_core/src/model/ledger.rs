//! Per-employee ledger projection.
//!
//! # Responsibility
//! - Hold the chronological sequence of notes and synthesized rollbacks.
//! - Derive the presentation summary and table rows.
//!
//! # Invariants
//! - Entries are sorted by date; rollbacks precede notes on the same date.
//! - `running_total` after any rollback entry is `>= 0`.
//! - The display total is clamped at zero independently of the decay floor.

use crate::model::event::{format_points, EmployeeId, NoteEvent, NoteId, PointValue};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Label carried by every synthesized rollback entry.
pub const ROLLBACK_NOTE_TYPE: &str = "Rollback";

/// Label of the trailing summary row produced by [`Ledger::rows`].
pub const TOTAL_ROW_LABEL: &str = "Total";

/// Origin of one ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Recorded note from the event source.
    Note,
    /// Decay entry synthesized by the calculator.
    Rollback,
}

impl EntryKind {
    /// Sort rank for entries sharing one date.
    pub(crate) fn same_day_rank(self) -> u8 {
        match self {
            Self::Rollback => 0,
            Self::Note => 1,
        }
    }
}

/// One ledger line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub kind: EntryKind,
    pub note_id: Option<NoteId>,
    pub date: NaiveDate,
    pub note_type: String,
    pub points: PointValue,
    /// Balance after this entry has been applied.
    pub running_total: f64,
}

impl LedgerEntry {
    pub(crate) fn from_event(event: &NoteEvent) -> Self {
        Self {
            kind: EntryKind::Note,
            note_id: event.note_id,
            date: event.date,
            note_type: event.note_type.clone(),
            points: event.points,
            running_total: 0.0,
        }
    }

    pub(crate) fn rollback(date: NaiveDate, amount: f64) -> Self {
        Self {
            kind: EntryKind::Rollback,
            note_id: None,
            date,
            note_type: ROLLBACK_NOTE_TYPE.to_string(),
            points: PointValue::Weighted(amount),
            running_total: 0.0,
        }
    }

    pub fn is_rollback(&self) -> bool {
        self.kind == EntryKind::Rollback
    }
}

/// Ordered ledger for one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub employee_id: EmployeeId,
    pub entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn empty(employee_id: impl Into<EmployeeId>) -> Self {
        Self {
            employee_id: employee_id.into(),
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates synthesized rollback entries only.
    pub fn rollbacks(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().filter(|entry| entry.is_rollback())
    }

    /// Balance after the last entry, or `0` for an empty ledger.
    pub fn final_running_total(&self) -> f64 {
        self.entries.last().map_or(0.0, |entry| entry.running_total)
    }

    /// Computes the presentation summary.
    pub fn summary(&self) -> LedgerSummary {
        let raw_total = self
            .entries
            .iter()
            .map(|entry| entry.points.contribution())
            .sum::<f64>();
        let rollback_count = self.rollbacks().count();
        LedgerSummary {
            employee_id: self.employee_id.clone(),
            note_count: self.entries.len() - rollback_count,
            rollback_count,
            raw_total,
            display_total: display_clamp(raw_total),
        }
    }

    /// Renders entry rows followed by one trailing total row.
    pub fn rows(&self) -> Vec<LedgerRow> {
        let mut rows = self
            .entries
            .iter()
            .map(|entry| LedgerRow {
                date: entry.date.to_string(),
                note_type: entry.note_type.clone(),
                points: entry.points.display_label(),
                running_total: format_points(entry.running_total),
            })
            .collect::<Vec<_>>();
        let summary = self.summary();
        rows.push(LedgerRow {
            date: String::new(),
            note_type: TOTAL_ROW_LABEL.to_string(),
            points: format_points(summary.display_total),
            running_total: String::new(),
        });
        rows
    }
}

/// Presentation summary of one ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub employee_id: EmployeeId,
    pub note_count: usize,
    pub rollback_count: usize,
    /// Unclamped sum of every weighted contribution.
    pub raw_total: f64,
    /// `raw_total` clamped at zero for display.
    pub display_total: f64,
}

/// Table row rendered for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub date: String,
    pub note_type: String,
    pub points: String,
    pub running_total: String,
}

/// Presentation floor: totals are never displayed below zero.
pub fn display_clamp(total: f64) -> f64 {
    if total > 0.0 {
        total
    } else {
        0.0
    }
}
