//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist disciplinary notes per employee in the local store.
//! - Import snapshot notes idempotently, keyed by their source child key.
//!
//! # Invariants
//! - Write paths validate employee id, note type and date before SQL.
//! - Stored dates are `YYYY-MM-DD` text; rows edited outside this crate
//!   are read back as-is so the service can flag them.
//! - Lists are ordered by `note_date ASC, created_at ASC, rowid ASC`.
//! - Only `list_notes` is capped; `load_notes` returns the whole store.

use crate::model::event::{
    parse_note_date, EmployeeId, NoteId, NoteValidationError, RawNote, NOTE_DATE_FORMAT,
};
use crate::repo::{NoteSource, RepoError, RepoResult};
use chrono::NaiveDate;
use log::{info, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    employee_id,
    note_date,
    note_type,
    source_key,
    created_at
FROM notes";

const NOTES_LIMIT_MAX: u32 = 10_000;

/// Input for recording one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub note_type: String,
}

impl NewNote {
    /// Builds a note from textual input, validating every field.
    pub fn parse(
        employee_id: &str,
        date: &str,
        note_type: &str,
    ) -> Result<Self, NoteValidationError> {
        let note = Self {
            employee_id: employee_id.trim().to_string(),
            date: parse_note_date(date)
                .ok_or_else(|| NoteValidationError::InvalidDate(date.to_string()))?,
            note_type: note_type.trim().to_string(),
        };
        note.validate()?;
        Ok(note)
    }

    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.employee_id.trim().is_empty() {
            return Err(NoteValidationError::EmptyEmployeeId);
        }
        if self.note_type.trim().is_empty() {
            return Err(NoteValidationError::EmptyNoteType);
        }
        Ok(())
    }
}

/// Persisted note row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNote {
    pub id: NoteId,
    pub employee_id: EmployeeId,
    /// Raw stored text; normally `YYYY-MM-DD`.
    pub date: String,
    pub note_type: String,
    pub source_key: Option<String>,
    /// Insert timestamp in epoch milliseconds.
    pub created_at: i64,
}

impl From<StoredNote> for RawNote {
    fn from(value: StoredNote) -> Self {
        Self {
            note_id: Some(value.id),
            source_key: value.source_key,
            employee_id: value.employee_id,
            date: Some(value.date),
            note_type: value.note_type,
        }
    }
}

/// Query options for listing notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteListQuery {
    /// Restrict to one employee.
    pub employee_id: Option<EmployeeId>,
    /// Maximum rows; `None` returns everything up to the hard cap.
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Counters reported by snapshot import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Newly inserted rows.
    pub imported: usize,
    /// Rows already present under the same source key.
    pub duplicates: usize,
    /// Rows rejected by validation.
    pub rejected: usize,
}

/// Repository interface for note persistence.
pub trait NoteRepository {
    /// Records one note and returns its stable id.
    fn create_note(&self, note: &NewNote) -> RepoResult<NoteId>;
    fn get_note(&self, id: NoteId) -> RepoResult<Option<StoredNote>>;
    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<StoredNote>>;
    /// Removes one note permanently.
    fn delete_note(&self, id: NoteId) -> RepoResult<()>;
    /// Distinct employee ids with at least one note, sorted.
    fn list_employees(&self) -> RepoResult<Vec<EmployeeId>>;
    /// Copies snapshot notes in a single transaction.
    fn import_notes(&mut self, notes: &[RawNote]) -> RepoResult<ImportSummary>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        if !table_exists(conn, "notes")? {
            return Err(RepoError::MissingRequiredTable("notes"));
        }
        Ok(Self { conn })
    }

    /// Every stored note in list order, without the listing cap.
    fn list_all(&self) -> RepoResult<Vec<StoredNote>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL} ORDER BY note_date ASC, created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&self, note: &NewNote) -> RepoResult<NoteId> {
        note.validate()?;
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO notes (id, employee_id, note_date, note_type)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                note.employee_id.trim(),
                note.date.format(NOTE_DATE_FORMAT).to_string(),
                note.note_type.trim(),
            ],
        )?;
        Ok(id)
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<StoredNote>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_note_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<StoredNote>> {
        let mut sql = String::from(NOTE_SELECT_SQL);
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(employee_id) = query.employee_id.as_ref() {
            sql.push_str(" WHERE employee_id = ?");
            bind_values.push(Value::Text(employee_id.trim().to_string()));
        }

        sql.push_str(" ORDER BY note_date ASC, created_at ASC, rowid ASC LIMIT ?");
        let limit = query.limit.unwrap_or(NOTES_LIMIT_MAX).min(NOTES_LIMIT_MAX);
        bind_values.push(Value::Integer(i64::from(limit)));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn list_employees(&self) -> RepoResult<Vec<EmployeeId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT employee_id FROM notes ORDER BY employee_id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(row.get(0)?);
        }
        Ok(employees)
    }

    fn import_notes(&mut self, notes: &[RawNote]) -> RepoResult<ImportSummary> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut summary = ImportSummary::default();

        for raw in notes {
            let new_note = match NewNote::parse(
                &raw.employee_id,
                raw.date.as_deref().unwrap_or_default(),
                &raw.note_type,
            ) {
                Ok(note) => note,
                Err(err) => {
                    warn!(
                        "event=note_import module=repo status=skipped employee_id={} source_key={} reason={err}",
                        raw.employee_id,
                        raw.source_key.as_deref().unwrap_or("-")
                    );
                    summary.rejected += 1;
                    continue;
                }
            };

            let inserted = tx.execute(
                "INSERT OR IGNORE INTO notes (id, employee_id, note_date, note_type, source_key)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    Uuid::new_v4().to_string(),
                    new_note.employee_id,
                    new_note.date.format(NOTE_DATE_FORMAT).to_string(),
                    new_note.note_type,
                    raw.source_key.as_deref(),
                ],
            )?;
            if inserted == 0 {
                summary.duplicates += 1;
            } else {
                summary.imported += 1;
            }
        }

        tx.commit()?;
        info!(
            "event=note_import module=repo status=ok imported={} duplicates={} rejected={}",
            summary.imported, summary.duplicates, summary.rejected
        );
        Ok(summary)
    }
}

impl NoteSource for SqliteNoteRepository<'_> {
    fn load_notes(&self) -> RepoResult<Vec<RawNote>> {
        let notes = self.list_all()?;
        Ok(notes.into_iter().map(RawNote::from).collect())
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<StoredNote> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{id_text}` in notes.id")))?;
    Ok(StoredNote {
        id,
        employee_id: row.get("employee_id")?,
        date: row.get("note_date")?,
        note_type: row.get("note_type")?,
        source_key: row.get("source_key")?,
        created_at: row.get("created_at")?,
    })
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
