//! Event sources and note persistence.
//!
//! # Responsibility
//! - Define the `NoteSource` contract consumed by the ledger service.
//! - Provide a JSON snapshot source and a SQLite-backed note store.
//!
//! # Invariants
//! - Sources hand over notes unresolved; date parsing and policy lookup
//!   happen in the service so bad records degrade to warnings.
//! - Write paths validate notes before persistence.

pub mod note_repo;
pub mod snapshot;

use crate::db::DbError;
use crate::model::event::{EmployeeId, NoteId, NoteValidationError, RawNote};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for source loading and note persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(NoteValidationError),
    Db(DbError),
    NotFound(NoteId),
    InvalidData(String),
    Snapshot(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::Snapshot(message) => write!(f, "invalid note snapshot: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Read side of any event source: the full, unordered note set.
pub trait NoteSource {
    fn load_notes(&self) -> RepoResult<Vec<RawNote>>;

    /// Employees the source knows about even without notes.
    fn known_employees(&self) -> RepoResult<Vec<EmployeeId>> {
        Ok(Vec::new())
    }
}

impl<S: NoteSource + ?Sized> NoteSource for &S {
    fn load_notes(&self) -> RepoResult<Vec<RawNote>> {
        (**self).load_notes()
    }

    fn known_employees(&self) -> RepoResult<Vec<EmployeeId>> {
        (**self).known_employees()
    }
}

impl NoteSource for Vec<RawNote> {
    fn load_notes(&self) -> RepoResult<Vec<RawNote>> {
        Ok(self.clone())
    }
}
