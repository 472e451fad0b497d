//! Domain model for disciplinary notes and their point ledgers.
//!
//! # Responsibility
//! - Define the note shapes handed over by event sources (`RawNote`) and the
//!   resolved shape consumed by the accrual calculator (`NoteEvent`).
//! - Define the ledger projection produced per employee.
//!
//! # Invariants
//! - Every note belongs to exactly one employee.
//! - Ledgers are projections; they are never persisted.

pub mod event;
pub mod ledger;
