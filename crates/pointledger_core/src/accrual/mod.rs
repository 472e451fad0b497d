//! Rollback-adjusted points accrual.
//!
//! # Responsibility
//! - Turn one employee's unordered notes into an ordered ledger with
//!   synthesized rollback entries and running totals.
//!
//! # Invariants
//! - Computation is pure: same input, same ledger.
//! - Rollbacks never drive the running total below zero.
//! - No rollback is synthesized after the most recent note.
//! - Rules without a positive `rollback_step` produce no rollbacks.

pub mod calculator;
pub mod calendar;

use calendar::MonthRule;
use serde::{Deserialize, Serialize};

/// Standard decay step applied once per elapsed month.
pub const DEFAULT_ROLLBACK_STEP: f64 = 2.0;

/// Tunables for the accrual calculator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccrualRules {
    /// Points removed per elapsed month while the balance is positive.
    pub rollback_step: f64,
    /// Calendar rule for adding one month to a date.
    pub month_rule: MonthRule,
}

impl AccrualRules {
    /// Whether `rollback_step` is a finite, positive amount.
    pub fn has_valid_step(&self) -> bool {
        self.rollback_step.is_finite() && self.rollback_step > 0.0
    }
}

impl Default for AccrualRules {
    fn default() -> Self {
        Self {
            rollback_step: DEFAULT_ROLLBACK_STEP,
            month_rule: MonthRule::Clamp,
        }
    }
}
