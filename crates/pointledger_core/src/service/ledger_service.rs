//! Ledger recomputation service.
//!
//! # Responsibility
//! - Load every note from a source, resolve dates and point weights, and
//!   compute one ledger per employee from scratch.
//! - Turn per-record data problems into warnings instead of failures.
//!
//! # Invariants
//! - Notes with a missing or malformed date are excluded from the ledger.
//! - Unknown note types resolve to `PointValue::Unweighted`.
//! - Employees are computed independently; iteration order never changes a
//!   ledger.
//! - Every employee known to the source gets a ledger, empty when it has no
//!   usable notes.

use crate::accrual::calculator::compute_ledger;
use crate::accrual::AccrualRules;
use crate::config::LedgerConfig;
use crate::model::event::{EmployeeId, NoteEvent, NoteId, PointValue, RawNote};
use crate::model::ledger::{Ledger, LedgerSummary};
use crate::policy::PointPolicy;
use crate::repo::{NoteSource, RepoError};
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Per-record data quality problem found during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityWarning {
    /// Note excluded because its date is missing or not `YYYY-MM-DD`.
    InvalidDate {
        employee_id: EmployeeId,
        note_id: Option<NoteId>,
        source_key: Option<String>,
        raw_date: Option<String>,
    },
    /// Note kept as unweighted because its type has no policy entry.
    UnknownNoteType {
        employee_id: EmployeeId,
        note_type: String,
    },
}

impl Display for DataQualityWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate {
                employee_id,
                raw_date,
                ..
            } => match raw_date {
                Some(raw) => write!(f, "employee {employee_id}: invalid note date `{raw}`"),
                None => write!(f, "employee {employee_id}: note without date"),
            },
            Self::UnknownNoteType {
                employee_id,
                note_type,
            } => write!(
                f,
                "employee {employee_id}: unknown note type `{note_type}` treated as unweighted"
            ),
        }
    }
}

/// Result of one recomputation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerReport {
    pub ledgers: BTreeMap<EmployeeId, Ledger>,
    pub warnings: Vec<DataQualityWarning>,
}

impl LedgerReport {
    pub fn ledger(&self, employee_id: &str) -> Option<&Ledger> {
        self.ledgers.get(employee_id)
    }

    /// Summaries ordered by employee id.
    pub fn summaries(&self) -> Vec<LedgerSummary> {
        self.ledgers.values().map(Ledger::summary).collect()
    }
}

/// Service error for recomputation.
#[derive(Debug)]
pub enum ServiceError {
    Source(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source(err) => write!(f, "failed to load notes: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Source(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Source(value)
    }
}

/// Ledger facade over a note source.
pub struct LedgerService<S: NoteSource> {
    source: S,
    policy: PointPolicy,
    rules: AccrualRules,
}

impl<S: NoteSource> LedgerService<S> {
    pub fn new(source: S, policy: PointPolicy, rules: AccrualRules) -> Self {
        Self {
            source,
            policy,
            rules,
        }
    }

    /// Creates a service with the policy and rules described by `config`.
    pub fn from_config(source: S, config: &LedgerConfig) -> Self {
        Self::new(source, config.point_policy(), config.accrual)
    }

    pub fn policy(&self) -> &PointPolicy {
        &self.policy
    }

    pub fn rules(&self) -> &AccrualRules {
        &self.rules
    }

    /// Recomputes every employee's ledger from the current source state.
    pub fn recompute(&self) -> Result<LedgerReport, ServiceError> {
        let started_at = Instant::now();
        let raw_notes = match self.source.load_notes() {
            Ok(notes) => notes,
            Err(err) => {
                warn!("event=ledger_recompute module=service status=error error={err}");
                return Err(err.into());
            }
        };
        let known_employees = self.source.known_employees()?;
        let note_count = raw_notes.len();
        let mut report = build_report(raw_notes, &self.policy, &self.rules);
        for employee_id in known_employees {
            report
                .ledgers
                .entry(employee_id.clone())
                .or_insert_with(|| Ledger::empty(employee_id));
        }

        info!(
            "event=ledger_recompute module=service status=ok employees={} notes={} warnings={} duration_ms={}",
            report.ledgers.len(),
            note_count,
            report.warnings.len(),
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    /// Computes one employee's ledger; unknown employees get an empty ledger.
    pub fn ledger_for(&self, employee_id: &str) -> Result<Ledger, ServiceError> {
        let raw_notes = self
            .source
            .load_notes()?
            .into_iter()
            .filter(|note| note.employee_id == employee_id)
            .collect::<Vec<_>>();
        let report = build_report(raw_notes, &self.policy, &self.rules);
        Ok(report
            .ledgers
            .into_iter()
            .next()
            .map(|(_, ledger)| ledger)
            .unwrap_or_else(|| Ledger::empty(employee_id)))
    }
}

/// Resolves raw notes and computes every ledger. Pure apart from logging.
pub fn build_report(
    raw_notes: Vec<RawNote>,
    policy: &PointPolicy,
    rules: &AccrualRules,
) -> LedgerReport {
    let (events_by_employee, warnings) = resolve_notes(raw_notes, policy);
    let ledgers = events_by_employee
        .into_iter()
        .map(|(employee_id, events)| {
            let ledger = compute_ledger(employee_id.clone(), events, rules);
            (employee_id, ledger)
        })
        .collect();
    LedgerReport { ledgers, warnings }
}

/// Groups raw notes by employee, parsing dates and resolving points.
///
/// Employees whose notes are all excluded still get an (empty) entry.
pub fn resolve_notes(
    raw_notes: Vec<RawNote>,
    policy: &PointPolicy,
) -> (BTreeMap<EmployeeId, Vec<NoteEvent>>, Vec<DataQualityWarning>) {
    let mut grouped: BTreeMap<EmployeeId, Vec<NoteEvent>> = BTreeMap::new();
    let mut warnings = Vec::new();

    for raw in raw_notes {
        let events = grouped.entry(raw.employee_id.clone()).or_default();

        let Some(date) = raw.parsed_date() else {
            let warning = DataQualityWarning::InvalidDate {
                employee_id: raw.employee_id,
                note_id: raw.note_id,
                source_key: raw.source_key,
                raw_date: raw.date,
            };
            warn!("event=note_resolve module=service status=skipped warning=\"{warning}\"");
            warnings.push(warning);
            continue;
        };

        let points = match policy.resolve(&raw.note_type) {
            Some(points) => points,
            None => {
                let warning = DataQualityWarning::UnknownNoteType {
                    employee_id: raw.employee_id.clone(),
                    note_type: raw.note_type.clone(),
                };
                warn!("event=note_resolve module=service status=degraded warning=\"{warning}\"");
                warnings.push(warning);
                PointValue::Unweighted
            }
        };

        events.push(NoteEvent {
            note_id: raw.note_id,
            employee_id: raw.employee_id,
            date,
            note_type: raw.note_type,
            points,
        });
    }

    (grouped, warnings)
}
