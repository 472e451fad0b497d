//! Ledger calculator state machine.
//!
//! Walks one employee's notes in date order with two pieces of state: the
//! running balance and the date of the last positive-points note. Before
//! each note, the gap since that date is filled with monthly rollbacks while
//! the balance stays positive.

use crate::accrual::calendar::add_one_month;
use crate::accrual::AccrualRules;
use crate::model::event::{EmployeeId, NoteEvent};
use crate::model::ledger::{Ledger, LedgerEntry};
use chrono::NaiveDate;
use log::{debug, warn};

/// Balances within this distance of zero are treated as settled.
const BALANCE_EPSILON: f64 = 1e-9;

/// Computes the ledger for one employee.
///
/// `events` may arrive in any order; ties on date keep their input order.
/// A non-positive or non-finite `rollback_step` disables decay entirely.
/// Events belonging to other employees are the caller's responsibility to
/// filter out; they are accrued as given.
pub fn compute_ledger(
    employee_id: impl Into<EmployeeId>,
    mut events: Vec<NoteEvent>,
    rules: &AccrualRules,
) -> Ledger {
    let employee_id = employee_id.into();
    events.sort_by_key(|event| event.date);
    if !rules.has_valid_step() {
        warn!(
            "event=ledger_compute module=accrual status=degraded employee_id={} rollback_step={} reason=non_positive_step",
            employee_id, rules.rollback_step
        );
    }

    let mut state = AccrualState::default();
    let mut entries = Vec::with_capacity(events.len());
    for event in &events {
        state.fill_gap(event.date, rules, &mut entries);
        state.apply(event);
        entries.push(LedgerEntry::from_event(event));
    }

    order_entries(&mut entries);
    apply_running_totals(&mut entries);

    debug!(
        "event=ledger_compute module=accrual status=ok employee_id={} notes={} rollbacks={}",
        employee_id,
        events.len(),
        entries.len() - events.len()
    );

    Ledger {
        employee_id,
        entries,
    }
}

#[derive(Debug, Default)]
struct AccrualState {
    running_total: f64,
    last_positive_date: Option<NaiveDate>,
}

impl AccrualState {
    /// Emits rollbacks dated strictly before `until`.
    fn fill_gap(&mut self, until: NaiveDate, rules: &AccrualRules, out: &mut Vec<LedgerEntry>) {
        let Some(mut anchor) = self.last_positive_date else {
            return;
        };
        if !rules.has_valid_step() {
            return;
        }

        while self.running_total > BALANCE_EPSILON {
            let Some(candidate) = add_one_month(anchor, rules.month_rule) else {
                break;
            };
            if candidate >= until {
                break;
            }

            let amount = rollback_amount(self.running_total, rules.rollback_step);
            out.push(LedgerEntry::rollback(candidate, amount));
            self.running_total += amount;
            if self.running_total.abs() <= BALANCE_EPSILON {
                self.running_total = 0.0;
            }
            anchor = candidate;
        }

        self.last_positive_date = Some(anchor);
    }

    fn apply(&mut self, event: &NoteEvent) {
        self.running_total += event.points.contribution();
        if event.points.is_positive() {
            self.last_positive_date = Some(event.date);
        }
    }
}

/// Decay for one elapsed month: the full step, or whatever balance is left.
pub fn rollback_amount(running_total: f64, step: f64) -> f64 {
    if running_total >= step {
        -step
    } else {
        -running_total
    }
}

/// Stable date order with rollbacks ahead of notes on the same day.
fn order_entries(entries: &mut [LedgerEntry]) {
    entries.sort_by_key(|entry| (entry.date, entry.kind.same_day_rank()));
}

fn apply_running_totals(entries: &mut [LedgerEntry]) {
    let mut running_total = 0.0;
    for entry in entries.iter_mut() {
        running_total += entry.points.contribution();
        if running_total.abs() <= BALANCE_EPSILON {
            running_total = 0.0;
        }
        entry.running_total = running_total;
    }
}
