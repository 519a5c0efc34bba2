//! Unit-level tests for the calendar merge engine and derived task metrics.

use chrono::{NaiveDate, TimeZone, Utc};
use taskdeck::calendar::{merge_day, priority_color, split, task_due_on, ItemKind};
use taskdeck::insight::task_age_days;
use taskdeck::storage::{EventRow, TaskRow};

fn task(id: &str, title: &str, priority: Option<&str>, due_date: Option<&str>) -> TaskRow {
    TaskRow {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        completed: false,
        priority: priority.map(String::from),
        due_date: due_date.map(String::from),
        effort_estimate: None,
        estimated_hours: None,
        is_recurring: None,
        recurrence_pattern: None,
        ai_priority_score: None,
        ai_insights: None,
        last_ai_analysis: None,
        project_id: None,
        parent_task_id: None,
        user_id: "u1".to_string(),
        created_at: "2024-12-01T08:00:00.000000Z".to_string(),
        updated_at: "2024-12-01T08:00:00.000000Z".to_string(),
    }
}

fn event(id: &str, title: &str, start: &str, end: &str) -> EventRow {
    EventRow {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        start_time: start.to_string(),
        end_time: end.to_string(),
        location: None,
        attendees: None,
        color: Some("purple".to_string()),
        user_id: Some("u1".to_string()),
        created_at: "2024-12-01T08:00:00.000000Z".to_string(),
        updated_at: "2024-12-01T08:00:00.000000Z".to_string(),
    }
}

fn day(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

// ── Day filter ───────────────────────────────────────────────────────────────

#[test]
fn tasks_included_iff_due_date_matches_day() {
    let tasks = vec![
        task("t1", "due today", None, Some("2024-12-10")),
        task("t2", "due today with time", None, Some("2024-12-10T16:30:00Z")),
        task("t3", "due tomorrow", None, Some("2024-12-11")),
        task("t4", "due just before midnight", None, Some("2024-12-09T23:59:59Z")),
        task("t5", "no due date", None, None),
        task("t6", "garbage due date", None, Some("whenever")),
    ];

    let merged = merge_day(&[], &tasks, day("2024-12-10"));
    let ids: Vec<&str> = merged.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t2"]);
}

#[test]
fn due_on_truncates_to_midnight() {
    let t = task("t1", "x", None, Some("2024-12-10T23:59:59Z"));
    assert!(task_due_on(&t, day("2024-12-10")));
    assert!(!task_due_on(&t, day("2024-12-11")));
}

// ── Color mapping ────────────────────────────────────────────────────────────

#[test]
fn task_color_is_pure_function_of_priority() {
    let cases = [
        (Some("high"), "red"),
        (Some("medium"), "orange"),
        (Some("low"), "green"),
        (Some("someday"), "blue"),
        (None, "blue"),
    ];
    for (priority, expected) in cases {
        assert_eq!(priority_color(priority), expected);

        let tasks = vec![task("t", "x", priority, Some("2024-12-10"))];
        let merged = merge_day(&[], &tasks, day("2024-12-10"));
        assert_eq!(merged[0].color, expected, "priority {priority:?}");
    }
}

#[test]
fn event_color_passes_through() {
    let events = vec![event("e1", "standup", "2024-12-10T09:00:00Z", "2024-12-10T09:15:00Z")];
    let merged = merge_day(&events, &[], day("2024-12-10"));
    assert_eq!(merged[0].color, "purple");
}

// ── Ordering ─────────────────────────────────────────────────────────────────

#[test]
fn merged_output_sorted_by_effective_start_time() {
    let events = vec![
        event("e-late", "review", "2024-12-10T16:30:00Z", "2024-12-10T17:00:00Z"),
        event("e-early", "standup", "2024-12-10T09:00:00Z", "2024-12-10T09:15:00Z"),
    ];
    let tasks = vec![
        task("t-noon", "report", Some("high"), Some("2024-12-10T12:00:00Z")),
        task("t-midnight", "invoice", Some("low"), Some("2024-12-10")),
    ];

    let merged = merge_day(&events, &tasks, day("2024-12-10"));
    let ids: Vec<&str> = merged.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["t-midnight", "e-early", "t-noon", "e-late"]);
}

#[test]
fn event_precedes_task_on_equal_timestamp() {
    let events = vec![event("e1", "meeting", "2024-12-10T12:00:00Z", "2024-12-10T13:00:00Z")];
    let tasks = vec![task("t1", "report", None, Some("2024-12-10T12:00:00Z"))];

    let merged = merge_day(&events, &tasks, day("2024-12-10"));
    assert_eq!(merged[0].kind, ItemKind::Event);
    assert_eq!(merged[1].kind, ItemKind::Task);
}

#[test]
fn split_partitions_by_kind() {
    let events = vec![event("e1", "m", "2024-12-10T12:00:00Z", "2024-12-10T13:00:00Z")];
    let tasks = vec![
        task("t1", "a", None, Some("2024-12-10")),
        task("t2", "b", None, Some("2024-12-10")),
    ];
    let (es, ts) = split(merge_day(&events, &tasks, day("2024-12-10")));
    assert_eq!(es.len(), 1);
    assert_eq!(ts.len(), 2);
    assert!(es.iter().all(|i| i.kind == ItemKind::Event));
    assert!(ts.iter().all(|i| i.kind == ItemKind::Task));
}

// ── Task age ─────────────────────────────────────────────────────────────────

#[test]
fn task_age_rounds_up_to_whole_days() {
    let now = Utc.with_ymd_and_hms(2024, 12, 10, 12, 0, 0).unwrap();

    // Exactly 36 hours ago → 2.
    let created = Utc.with_ymd_and_hms(2024, 12, 9, 0, 0, 0).unwrap();
    assert_eq!(task_age_days(created, now), 2);

    // One second ago → 1; exactly 24h → 1; 24h + 1s → 2.
    assert_eq!(task_age_days(now - chrono::Duration::seconds(1), now), 1);
    assert_eq!(task_age_days(now - chrono::Duration::hours(24), now), 1);
    assert_eq!(
        task_age_days(now - chrono::Duration::hours(24) - chrono::Duration::seconds(1), now),
        2
    );

    // Just created → 0.
    assert_eq!(task_age_days(now, now), 0);
}

// ── Property: sort invariant over arbitrary day agendas ──────────────────────

mod properties {
    use super::*;
    use proptest::prelude::*;
    use taskdeck::calendar::parse_when;

    fn arb_time() -> impl Strategy<Value = String> {
        (0u32..24, 0u32..60).prop_map(|(h, m)| format!("2024-12-10T{h:02}:{m:02}:00Z"))
    }

    proptest! {
        #[test]
        fn merge_is_sorted_nondecreasing(
            event_times in proptest::collection::vec(arb_time(), 0..8),
            task_times in proptest::collection::vec(arb_time(), 0..8),
        ) {
            let events: Vec<EventRow> = event_times
                .iter()
                .enumerate()
                .map(|(i, t)| event(&format!("e{i}"), "e", t, t))
                .collect();
            let tasks: Vec<TaskRow> = task_times
                .iter()
                .enumerate()
                .map(|(i, t)| task(&format!("t{i}"), "t", None, Some(t)))
                .collect();

            let merged = merge_day(&events, &tasks, day("2024-12-10"));
            prop_assert_eq!(merged.len(), events.len() + tasks.len());

            for pair in merged.windows(2) {
                let a = parse_when(&pair[0].start_time).unwrap();
                let b = parse_when(&pair[1].start_time).unwrap();
                prop_assert!(a <= b);
                // Equal timestamps: an event never follows a task.
                if a == b {
                    prop_assert!(
                        !(pair[0].kind == ItemKind::Task && pair[1].kind == ItemKind::Event)
                    );
                }
            }
        }
    }
}
