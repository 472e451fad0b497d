//! Attendance point ledgers with monthly rollback decay.
//!
//! Notes recorded per employee are weighted by a point policy and folded
//! into a chronological ledger; every full month without a new
//! positive-points note rolls the balance back, never below zero.

pub mod accrual;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod policy;
pub mod repo;
pub mod service;

pub use accrual::calculator::compute_ledger;
pub use accrual::calendar::{add_one_month, MonthRule};
pub use accrual::AccrualRules;
pub use config::{ConfigError, LedgerConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::event::{EmployeeId, NoteEvent, NoteId, PointValue, RawNote};
pub use model::ledger::{EntryKind, Ledger, LedgerEntry, LedgerRow, LedgerSummary};
pub use policy::PointPolicy;
pub use repo::note_repo::{
    ImportSummary, NewNote, NoteListQuery, NoteRepository, SqliteNoteRepository, StoredNote,
};
pub use repo::snapshot::SnapshotSource;
pub use repo::{NoteSource, RepoError, RepoResult};
pub use service::ledger_service::{
    build_report, DataQualityWarning, LedgerReport, LedgerService, ServiceError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
