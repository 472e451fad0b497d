//! Note event model.
//!
//! # Responsibility
//! - Define the unresolved source record (`RawNote`) and the resolved event
//!   (`NoteEvent`) with its policy weight.
//! - Own date parsing for the `YYYY-MM-DD` wire format.
//!
//! # Invariants
//! - `NoteEvent::date` is always a valid calendar date.
//! - `PointValue::Unweighted` contributes nothing to any total.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque employee identifier, foreign key into the external roster.
pub type EmployeeId = String;

/// Stable identifier for notes kept in the local store.
pub type NoteId = Uuid;

/// Date-only wire format used by every source.
pub const NOTE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Resolved point weight of one note type.
///
/// Serialized as a bare number, or as the string `"unweighted"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PointValueRepr", into = "PointValueRepr")]
pub enum PointValue {
    /// Numeric contribution to the running total.
    Weighted(f64),
    /// Recorded for visibility only; no automatic contribution.
    Unweighted,
}

impl PointValue {
    /// Returns the numeric contribution of this value (`0` when unweighted).
    pub fn contribution(self) -> f64 {
        match self {
            Self::Weighted(value) => value,
            Self::Unweighted => 0.0,
        }
    }

    /// Returns whether this value starts a new decay interval.
    pub fn is_positive(self) -> bool {
        matches!(self, Self::Weighted(value) if value > 0.0)
    }

    /// Presentation label: the number, or `N/A` for unweighted values.
    pub fn display_label(self) -> String {
        match self {
            Self::Weighted(value) => format_points(value),
            Self::Unweighted => "N/A".to_string(),
        }
    }
}

impl Display for PointValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum PointValueRepr {
    Number(f64),
    Label(String),
}

impl TryFrom<PointValueRepr> for PointValue {
    type Error = String;

    fn try_from(value: PointValueRepr) -> Result<Self, Self::Error> {
        match value {
            PointValueRepr::Number(number) if number.is_finite() => Ok(Self::Weighted(number)),
            PointValueRepr::Number(number) => Err(format!("point value must be finite, got {number}")),
            PointValueRepr::Label(label) => match label.trim().to_ascii_lowercase().as_str() {
                "unweighted" | "n/a" => Ok(Self::Unweighted),
                other => Err(format!(
                    "unsupported point value `{other}`; expected a number or `unweighted`"
                )),
            },
        }
    }
}

impl From<PointValue> for PointValueRepr {
    fn from(value: PointValue) -> Self {
        match value {
            PointValue::Weighted(number) => Self::Number(number),
            PointValue::Unweighted => Self::Label("unweighted".to_string()),
        }
    }
}

/// Formats a point amount without a trailing `.0` for whole numbers.
pub fn format_points(value: f64) -> String {
    // -0 would otherwise render as "-0".
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

/// Parses one `YYYY-MM-DD` date. Returns `None` for anything else.
pub fn parse_note_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, NOTE_DATE_FORMAT).ok()
}

/// Validation errors for notes entering the local store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyEmployeeId,
    EmptyNoteType,
    InvalidDate(String),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyEmployeeId => write!(f, "employee id cannot be empty"),
            Self::EmptyNoteType => write!(f, "note type cannot be empty"),
            Self::InvalidDate(raw) => write!(f, "invalid note date `{raw}`; expected YYYY-MM-DD"),
        }
    }
}

impl Error for NoteValidationError {}

/// Unresolved note as delivered by an event source.
///
/// `date` stays textual so that malformed values can be reported as data
/// quality warnings instead of failing the whole load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNote {
    /// Present only for notes read from the local store.
    pub note_id: Option<NoteId>,
    /// Child key in the source tree (push key or list index), when known.
    pub source_key: Option<String>,
    pub employee_id: EmployeeId,
    pub date: Option<String>,
    pub note_type: String,
}

impl RawNote {
    pub fn new(
        employee_id: impl Into<EmployeeId>,
        date: impl Into<String>,
        note_type: impl Into<String>,
    ) -> Self {
        Self {
            note_id: None,
            source_key: None,
            employee_id: employee_id.into(),
            date: Some(date.into()),
            note_type: note_type.into(),
        }
    }

    /// Parses `date`, returning `None` when it is missing or malformed.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_note_date)
    }
}

/// Note resolved against the point policy, ready for accrual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub note_id: Option<NoteId>,
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub note_type: String,
    pub points: PointValue,
}

impl NoteEvent {
    pub fn new(
        employee_id: impl Into<EmployeeId>,
        date: NaiveDate,
        note_type: impl Into<String>,
        points: PointValue,
    ) -> Self {
        Self {
            note_id: None,
            employee_id: employee_id.into(),
            date,
            note_type: note_type.into(),
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{format_points, parse_note_date, PointValue};
    use chrono::NaiveDate;

    #[test]
    fn parse_note_date_accepts_iso_dates_only() {
        assert_eq!(
            parse_note_date(" 2024-02-29 "),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(parse_note_date("2023-02-29"), None);
        assert_eq!(parse_note_date("02/10/2024"), None);
        assert_eq!(parse_note_date(""), None);
    }

    #[test]
    fn unweighted_points_display_as_na_and_contribute_nothing() {
        assert_eq!(PointValue::Unweighted.display_label(), "N/A");
        assert_eq!(PointValue::Unweighted.contribution(), 0.0);
        assert!(!PointValue::Unweighted.is_positive());
        assert!(!PointValue::Weighted(0.0).is_positive());
        assert!(PointValue::Weighted(0.5).is_positive());
    }

    #[test]
    fn format_points_drops_trailing_zero_fraction() {
        assert_eq!(format_points(2.0), "2");
        assert_eq!(format_points(-2.0), "-2");
        assert_eq!(format_points(0.5), "0.5");
        assert_eq!(format_points(-0.0), "0");
    }

    #[test]
    fn point_value_serializes_as_number_or_label() {
        assert_eq!(
            serde_json::to_value(PointValue::Weighted(2.0)).unwrap(),
            serde_json::json!(2.0)
        );
        assert_eq!(
            serde_json::to_value(PointValue::Unweighted).unwrap(),
            serde_json::json!("unweighted")
        );
        let decoded: PointValue = serde_json::from_str("\"Unweighted\"").unwrap();
        assert_eq!(decoded, PointValue::Unweighted);
        assert!(serde_json::from_str::<PointValue>("\"lots\"").is_err());
    }
}
