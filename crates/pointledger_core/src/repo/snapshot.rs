//! JSON snapshot source.
//!
//! Reads an exported realtime-database tree shaped as
//! `{ "<employeeId>": [ {"date": "YYYY-MM-DD", "noteType": "..."} ] }`.
//! Each employee's notes may also be a keyed object of pushed children
//! (`{"<pushKey>": {...}}`); `null` holes left by deleted list children are
//! skipped. Employee keys holding no notes are still reported by
//! `known_employees`.

use crate::model::event::{EmployeeId, RawNote};
use crate::repo::{NoteSource, RepoError, RepoResult};
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SnapshotNote {
    #[serde(default)]
    date: Option<Value>,
    #[serde(default, rename = "noteType", alias = "note_type", alias = "type")]
    note_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EmployeeNotes {
    List(Vec<Option<SnapshotNote>>),
    Keyed(BTreeMap<String, Option<SnapshotNote>>),
}

/// In-memory note set parsed from one snapshot document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotSource {
    employees: Vec<EmployeeId>,
    notes: Vec<RawNote>,
}

impl SnapshotSource {
    /// Parses a snapshot document.
    ///
    /// # Errors
    /// - Returns `RepoError::Snapshot` when the document is not an object of
    ///   employee note collections.
    pub fn from_json_str(source: &str) -> RepoResult<Self> {
        let tree: BTreeMap<String, Option<EmployeeNotes>> = serde_json::from_str(source)
            .map_err(|err| RepoError::Snapshot(err.to_string()))?;

        let employees = tree.keys().cloned().collect::<Vec<_>>();
        let mut notes = Vec::new();
        for (employee_id, children) in tree {
            let children = match children {
                Some(EmployeeNotes::List(items)) => items
                    .into_iter()
                    .enumerate()
                    .filter_map(|(index, item)| item.map(|note| (index.to_string(), note)))
                    .collect::<Vec<_>>(),
                Some(EmployeeNotes::Keyed(items)) => items
                    .into_iter()
                    .filter_map(|(key, item)| item.map(|note| (key, note)))
                    .collect::<Vec<_>>(),
                None => Vec::new(),
            };

            for (source_key, child) in children {
                notes.push(RawNote {
                    note_id: None,
                    source_key: Some(source_key),
                    employee_id: employee_id.clone(),
                    date: child.date.and_then(date_text),
                    note_type: child.note_type.unwrap_or_default(),
                });
            }
        }

        info!(
            "event=snapshot_load module=repo status=ok notes={}",
            notes.len()
        );
        Ok(Self { employees, notes })
    }

    /// Reads and parses a snapshot file.
    pub fn from_path(path: impl AsRef<Path>) -> RepoResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|err| {
            warn!(
                "event=snapshot_load module=repo status=error path={} error={err}",
                path.display()
            );
            RepoError::Snapshot(format!("failed to read `{}`: {err}", path.display()))
        })?;
        Self::from_json_str(&source)
    }

    pub fn notes(&self) -> &[RawNote] {
        &self.notes
    }

    pub fn into_notes(self) -> Vec<RawNote> {
        self.notes
    }
}

impl NoteSource for SnapshotSource {
    fn load_notes(&self) -> RepoResult<Vec<RawNote>> {
        Ok(self.notes.clone())
    }

    fn known_employees(&self) -> RepoResult<Vec<EmployeeId>> {
        Ok(self.employees.clone())
    }
}

/// Keeps non-string dates as text so they surface as invalid, not missing.
fn date_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::SnapshotSource;
    use crate::repo::{NoteSource, RepoError};

    #[test]
    fn parses_list_and_keyed_children() {
        let source = SnapshotSource::from_json_str(
            r#"{
                "emp-1": [
                    {"date": "2024-01-10", "noteType": "Callout"},
                    null,
                    {"date": "2024-02-01", "noteType": "Written"}
                ],
                "emp-2": {
                    "-Nabc": {"date": "2024-03-05", "type": "Tardy (15+ Minutes)"}
                }
            }"#,
        )
        .unwrap();

        let notes = source.load_notes().unwrap();
        assert_eq!(notes.len(), 3);
        assert_eq!(notes[0].employee_id, "emp-1");
        assert_eq!(notes[0].source_key.as_deref(), Some("0"));
        assert_eq!(notes[1].source_key.as_deref(), Some("2"));
        assert_eq!(notes[1].note_type, "Written");
        assert_eq!(notes[2].employee_id, "emp-2");
        assert_eq!(notes[2].source_key.as_deref(), Some("-Nabc"));
        assert_eq!(notes[2].note_type, "Tardy (15+ Minutes)");
    }

    #[test]
    fn keeps_missing_and_non_string_dates_for_reporting() {
        let source = SnapshotSource::from_json_str(
            r#"{"emp-1": [{"noteType": "Callout"}, {"date": 20240110, "noteType": "Callout"}]}"#,
        )
        .unwrap();

        let notes = source.into_notes();
        assert_eq!(notes[0].date, None);
        assert_eq!(notes[1].date.as_deref(), Some("20240110"));
        assert_eq!(notes[1].parsed_date(), None);
    }

    #[test]
    fn rejects_non_object_documents() {
        let err = SnapshotSource::from_json_str("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, RepoError::Snapshot(_)));
    }

    #[test]
    fn employee_without_notes_yields_nothing() {
        let source = SnapshotSource::from_json_str(r#"{"emp-1": null, "emp-2": []}"#).unwrap();
        assert!(source.notes().is_empty());
        assert_eq!(source.known_employees().unwrap(), vec!["emp-1", "emp-2"]);
    }
}
