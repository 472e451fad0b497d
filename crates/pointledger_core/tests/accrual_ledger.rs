use chrono::NaiveDate;
use pointledger_core::policy::{CALLOUT, NO_CALL_NO_SHOW, TARDY_15_PLUS, WRITTEN_WARNING};
use pointledger_core::{
    build_report, compute_ledger, AccrualRules, EntryKind, Ledger, MonthRule, NoteEvent,
    PointPolicy, PointValue, RawNote,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn note(d: NaiveDate, note_type: &str) -> NoteEvent {
    let points = PointPolicy::standard()
        .resolve(note_type)
        .expect("label should exist in the standard policy");
    NoteEvent::new("emp-1", d, note_type, points)
}

fn shape(ledger: &Ledger) -> Vec<(EntryKind, NaiveDate, String, f64)> {
    ledger
        .entries
        .iter()
        .map(|entry| {
            (
                entry.kind,
                entry.date,
                entry.points.display_label(),
                entry.running_total,
            )
        })
        .collect()
}

#[test]
fn single_note_produces_no_rollback() {
    let ledger = compute_ledger(
        "emp-1",
        vec![note(date(2024, 1, 10), CALLOUT)],
        &AccrualRules::default(),
    );

    assert_eq!(
        shape(&ledger),
        vec![(EntryKind::Note, date(2024, 1, 10), "2".to_string(), 2.0)]
    );
    assert_eq!(ledger.summary().display_total, 2.0);
}

#[test]
fn three_month_gap_rolls_back_once_then_stops_at_zero() {
    let ledger = compute_ledger(
        "emp-1",
        vec![
            note(date(2024, 4, 10), CALLOUT),
            note(date(2024, 1, 10), CALLOUT),
        ],
        &AccrualRules::default(),
    );

    assert_eq!(
        shape(&ledger),
        vec![
            (EntryKind::Note, date(2024, 1, 10), "2".to_string(), 2.0),
            (EntryKind::Rollback, date(2024, 2, 10), "-2".to_string(), 0.0),
            (EntryKind::Note, date(2024, 4, 10), "2".to_string(), 2.0),
        ]
    );
    assert_eq!(ledger.entries[1].note_type, "Rollback");
}

#[test]
fn partial_balance_rolls_back_by_remaining_amount() {
    let ledger = compute_ledger(
        "emp-1",
        vec![
            note(date(2024, 1, 10), CALLOUT),
            note(date(2024, 1, 10), TARDY_15_PLUS),
            note(date(2024, 5, 1), CALLOUT),
        ],
        &AccrualRules::default(),
    );

    let rollbacks = ledger
        .rollbacks()
        .map(|entry| (entry.date, entry.points, entry.running_total))
        .collect::<Vec<_>>();
    assert_eq!(
        rollbacks,
        vec![
            (date(2024, 2, 10), PointValue::Weighted(-2.0), 1.0),
            (date(2024, 3, 10), PointValue::Weighted(-1.0), 0.0),
        ]
    );
    assert_eq!(ledger.final_running_total(), 2.0);
}

#[test]
fn unweighted_note_is_listed_but_does_not_move_anchor_or_total() {
    let ledger = compute_ledger(
        "emp-1",
        vec![
            note(date(2024, 1, 10), CALLOUT),
            note(date(2024, 2, 5), WRITTEN_WARNING),
            note(date(2024, 3, 1), CALLOUT),
        ],
        &AccrualRules::default(),
    );

    assert_eq!(
        shape(&ledger),
        vec![
            (EntryKind::Note, date(2024, 1, 10), "2".to_string(), 2.0),
            (EntryKind::Note, date(2024, 2, 5), "N/A".to_string(), 2.0),
            (EntryKind::Rollback, date(2024, 2, 10), "-2".to_string(), 0.0),
            (EntryKind::Note, date(2024, 3, 1), "2".to_string(), 2.0),
        ]
    );
    assert_eq!(ledger.rows()[1].points, "N/A");
}

#[test]
fn disjoint_employees_are_independent_of_processing_order() {
    let notes = vec![
        RawNote::new("emp-a", "2024-01-10", CALLOUT),
        RawNote::new("emp-b", "2024-02-01", NO_CALL_NO_SHOW),
        RawNote::new("emp-a", "2024-04-10", CALLOUT),
        RawNote::new("emp-b", "2024-06-15", CALLOUT),
    ];
    let mut reversed = notes.clone();
    reversed.reverse();

    let policy = PointPolicy::standard();
    let rules = AccrualRules::default();
    let forward = build_report(notes.clone(), &policy, &rules);
    let backward = build_report(reversed, &policy, &rules);
    assert_eq!(forward, backward);

    let only_a = build_report(
        notes
            .iter()
            .filter(|note| note.employee_id == "emp-a")
            .cloned()
            .collect(),
        &policy,
        &rules,
    );
    assert_eq!(only_a.ledger("emp-a"), forward.ledger("emp-a"));

    let emp_b = forward.ledger("emp-b").unwrap();
    assert_eq!(emp_b.rollbacks().count(), 2);
    assert_eq!(emp_b.final_running_total(), 2.0);
}

#[test]
fn employee_without_notes_has_empty_ledger() {
    let ledger = compute_ledger("emp-1", Vec::new(), &AccrualRules::default());
    assert!(ledger.is_empty());
    assert_eq!(ledger.summary().display_total, 0.0);
}

#[test]
fn rollback_sharing_a_date_with_a_note_is_ordered_first() {
    let ledger = compute_ledger(
        "emp-1",
        vec![
            note(date(2024, 1, 10), NO_CALL_NO_SHOW),
            note(date(2024, 2, 10), WRITTEN_WARNING),
            note(date(2024, 3, 20), CALLOUT),
        ],
        &AccrualRules::default(),
    );

    assert_eq!(
        shape(&ledger),
        vec![
            (EntryKind::Note, date(2024, 1, 10), "4".to_string(), 4.0),
            (EntryKind::Rollback, date(2024, 2, 10), "-2".to_string(), 2.0),
            (EntryKind::Note, date(2024, 2, 10), "N/A".to_string(), 2.0),
            (EntryKind::Rollback, date(2024, 3, 10), "-2".to_string(), 0.0),
            (EntryKind::Note, date(2024, 3, 20), "2".to_string(), 2.0),
        ]
    );
}

#[test]
fn same_day_notes_keep_input_order() {
    let ledger = compute_ledger(
        "emp-1",
        vec![
            note(date(2024, 1, 10), WRITTEN_WARNING),
            note(date(2024, 1, 10), CALLOUT),
        ],
        &AccrualRules::default(),
    );
    let labels = ledger
        .entries
        .iter()
        .map(|entry| entry.note_type.as_str())
        .collect::<Vec<_>>();
    assert_eq!(labels, vec![WRITTEN_WARNING, CALLOUT]);
}

#[test]
fn month_rule_changes_rollback_dates_after_month_end() {
    let notes = vec![
        note(date(2023, 1, 31), NO_CALL_NO_SHOW),
        note(date(2023, 6, 1), CALLOUT),
    ];

    let clamped = compute_ledger("emp-1", notes.clone(), &AccrualRules::default());
    let clamped_dates = clamped.rollbacks().map(|entry| entry.date).collect::<Vec<_>>();
    assert_eq!(clamped_dates, vec![date(2023, 2, 28), date(2023, 3, 28)]);

    let overflow = compute_ledger(
        "emp-1",
        notes,
        &AccrualRules {
            month_rule: MonthRule::Overflow,
            ..AccrualRules::default()
        },
    );
    let overflow_dates = overflow.rollbacks().map(|entry| entry.date).collect::<Vec<_>>();
    assert_eq!(overflow_dates, vec![date(2023, 3, 3), date(2023, 4, 3)]);
}

#[test]
fn custom_rollback_step_is_honored() {
    let ledger = compute_ledger(
        "emp-1",
        vec![
            note(date(2024, 1, 10), NO_CALL_NO_SHOW),
            note(date(2024, 6, 1), CALLOUT),
        ],
        &AccrualRules {
            rollback_step: 1.5,
            ..AccrualRules::default()
        },
    );
    let amounts = ledger
        .rollbacks()
        .map(|entry| entry.points.contribution())
        .collect::<Vec<_>>();
    assert_eq!(amounts, vec![-1.5, -1.5, -1.0]);
}

#[test]
fn decay_floor_and_display_floor_are_separate() {
    let credit = NoteEvent::new(
        "emp-1",
        date(2024, 1, 20),
        "Attendance Credit",
        PointValue::Weighted(-3.0),
    );
    let ledger = compute_ledger(
        "emp-1",
        vec![note(date(2024, 1, 10), CALLOUT), credit],
        &AccrualRules::default(),
    );

    // Credits may push the running total negative; only rollbacks stop at zero.
    assert_eq!(ledger.final_running_total(), -1.0);
    let summary = ledger.summary();
    assert_eq!(summary.raw_total, -1.0);
    assert_eq!(summary.display_total, 0.0);

    let with_gap = compute_ledger(
        "emp-1",
        vec![
            note(date(2024, 1, 10), CALLOUT),
            NoteEvent::new(
                "emp-1",
                date(2024, 1, 20),
                "Attendance Credit",
                PointValue::Weighted(-3.0),
            ),
            note(date(2024, 8, 1), CALLOUT),
        ],
        &AccrualRules::default(),
    );
    assert_eq!(with_gap.rollbacks().count(), 0);
}

#[test]
fn rows_render_points_and_trailing_total() {
    let ledger = compute_ledger(
        "emp-1",
        vec![
            note(date(2024, 1, 10), CALLOUT),
            note(date(2024, 4, 10), CALLOUT),
        ],
        &AccrualRules::default(),
    );

    let rows = ledger.rows();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1].date, "2024-02-10");
    assert_eq!(rows[1].note_type, "Rollback");
    assert_eq!(rows[1].points, "-2");
    assert_eq!(rows[1].running_total, "0");
    assert_eq!(rows[3].note_type, "Total");
    assert_eq!(rows[3].points, "2");
}

#[test]
fn negative_rollback_step_never_adds_points() {
    let rules = AccrualRules {
        rollback_step: -2.0,
        ..AccrualRules::default()
    };
    let ledger = compute_ledger(
        "emp-1",
        vec![
            note(date(2024, 1, 10), CALLOUT),
            note(date(2024, 6, 10), CALLOUT),
        ],
        &rules,
    );

    assert!(ledger
        .entries
        .iter()
        .all(|entry| !entry.is_rollback() && entry.points.contribution() > 0.0));
    assert_eq!(ledger.final_running_total(), 4.0);
}
