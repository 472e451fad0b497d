//! Text and JSON rendering of ledger reports.

use pointledger_core::{DataQualityWarning, Ledger, LedgerReport, LedgerRow, LedgerSummary};
use serde::Serialize;
use std::collections::BTreeMap;

const HEADERS: [&str; 4] = ["Date", "Type", "Points", "Running"];

#[derive(Serialize)]
struct LedgerView<'a> {
    employee_id: &'a str,
    rows: Vec<LedgerRow>,
    summary: LedgerSummary,
}

#[derive(Serialize)]
struct ReportView<'a> {
    ledgers: Vec<LedgerView<'a>>,
    warnings: &'a [DataQualityWarning],
}

/// Narrows a report to one employee; an unknown id yields an empty ledger.
pub fn only_employee(report: LedgerReport, employee_id: &str) -> LedgerReport {
    let ledger = report
        .ledgers
        .get(employee_id)
        .cloned()
        .unwrap_or_else(|| Ledger::empty(employee_id));
    let warnings = report
        .warnings
        .into_iter()
        .filter(|warning| warning_employee(warning) == employee_id)
        .collect();
    LedgerReport {
        ledgers: BTreeMap::from([(employee_id.to_string(), ledger)]),
        warnings,
    }
}

fn warning_employee(warning: &DataQualityWarning) -> &str {
    match warning {
        DataQualityWarning::InvalidDate { employee_id, .. }
        | DataQualityWarning::UnknownNoteType { employee_id, .. } => employee_id,
    }
}

/// Pretty JSON with rows, summary and warnings.
pub fn json(report: &LedgerReport) -> serde_json::Result<String> {
    let view = ReportView {
        ledgers: report
            .ledgers
            .values()
            .map(|ledger| LedgerView {
                employee_id: &ledger.employee_id,
                rows: ledger.rows(),
                summary: ledger.summary(),
            })
            .collect(),
        warnings: &report.warnings,
    };
    serde_json::to_string_pretty(&view)
}

/// Plain-text tables, one per employee, followed by warnings.
pub fn table(report: &LedgerReport) -> String {
    let mut out = String::new();
    for ledger in report.ledgers.values() {
        out.push_str(&format!("== {} ==\n", ledger.employee_id));
        out.push_str(&ledger_table(&ledger.rows()));
        out.push('\n');
    }
    if !report.warnings.is_empty() {
        out.push_str("warnings:\n");
        for warning in &report.warnings {
            out.push_str(&format!("  - {warning}\n"));
        }
    }
    out.trim_end().to_string()
}

fn ledger_table(rows: &[LedgerRow]) -> String {
    let cells = rows
        .iter()
        .map(|row| {
            [
                row.date.as_str(),
                row.note_type.as_str(),
                row.points.as_str(),
                row.running_total.as_str(),
            ]
        })
        .collect::<Vec<_>>();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = format_line(&HEADERS, &widths);
    for row in &cells {
        out.push_str(&format_line(row, &widths));
    }
    out
}

fn format_line(cells: &[&str; 4], widths: &[usize; 4]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    format!("{}\n", line.trim_end())
}
