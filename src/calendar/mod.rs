//! Calendar merge engine — combines day-filtered events with tasks due the
//! same day into one ordered agenda.
//!
//! Pure functions over already-fetched rows; nothing here touches storage.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{EventRow, TaskRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Event,
    Task,
}

/// Ephemeral union of an event and a due task, normalized for same-day
/// display ordering. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarItem {
    pub id: String,
    pub kind: ItemKind,
    pub title: String,
    pub description: Option<String>,
    pub start_time: String,
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub attendees: Option<i64>,
    pub completed: Option<bool>,
    pub priority: Option<String>,
    pub color: String,
}

/// Task display color as a pure function of priority.
pub fn priority_color(priority: Option<&str>) -> &'static str {
    match priority {
        Some("high") => "red",
        Some("medium") => "orange",
        Some("low") => "green",
        _ => "blue",
    }
}

/// Parse a stored timestamp: RFC 3339, or a bare calendar date taken as
/// midnight UTC.
pub fn parse_when(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

/// True iff the task's due date, truncated to midnight, equals `day`.
/// Tasks without a parseable due date never match.
pub fn task_due_on(task: &TaskRow, day: NaiveDate) -> bool {
    task.due_date
        .as_deref()
        .and_then(parse_when)
        .map(|dt| dt.date_naive() == day)
        .unwrap_or(false)
}

fn from_event(event: &EventRow) -> CalendarItem {
    CalendarItem {
        id: event.id.clone(),
        kind: ItemKind::Event,
        title: event.title.clone(),
        description: event.description.clone(),
        start_time: event.start_time.clone(),
        end_time: Some(event.end_time.clone()),
        location: event.location.clone(),
        attendees: event.attendees,
        completed: None,
        priority: None,
        color: event.color.clone().unwrap_or_else(|| "blue".to_string()),
    }
}

fn from_task(task: &TaskRow) -> CalendarItem {
    CalendarItem {
        id: task.id.clone(),
        kind: ItemKind::Task,
        title: task.title.clone(),
        description: task.description.clone(),
        // A task's effective start time is its due date.
        start_time: task.due_date.clone().unwrap_or_default(),
        end_time: None,
        location: None,
        attendees: None,
        completed: Some(task.completed),
        priority: task.priority.clone(),
        color: priority_color(task.priority.as_deref()).to_string(),
    }
}

fn sort_key(item: &CalendarItem) -> DateTime<Utc> {
    parse_when(&item.start_time).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Merge day-filtered `events` with the tasks from `tasks` due on `day`.
///
/// Events are concatenated before tasks, then the whole list is stably
/// sorted ascending by effective start time — so on equal timestamps an
/// event precedes a task.
pub fn merge_day(events: &[EventRow], tasks: &[TaskRow], day: NaiveDate) -> Vec<CalendarItem> {
    let mut items: Vec<CalendarItem> = events.iter().map(from_event).collect();
    items.extend(
        tasks
            .iter()
            .filter(|t| task_due_on(t, day))
            .map(from_task),
    );
    items.sort_by_key(sort_key);
    items
}

/// Split a merged list into its events and tasks subsections, each
/// independently empty-state-handled by the caller.
pub fn split(items: Vec<CalendarItem>) -> (Vec<CalendarItem>, Vec<CalendarItem>) {
    items.into_iter().partition(|i| i.kind == ItemKind::Event)
}
