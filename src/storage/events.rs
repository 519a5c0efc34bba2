use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, now_rfc3339, Storage, StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct EventRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_time: String,
    /// Always `>= start_time`, enforced by the store.
    pub end_time: String,
    pub location: Option<String>,
    pub attendees: Option<i64>,
    pub color: Option<String>,
    pub user_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub location: Option<String>,
    pub attendees: Option<i64>,
    pub color: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub attendees: Option<i64>,
    pub color: Option<String>,
}

/// Inclusive day window `[00:00:00, 23:59:59.999999]` in the stored
/// fixed-width RFC 3339 format, so TEXT comparison matches time order.
fn day_window(day: NaiveDate) -> (String, String) {
    (
        format!("{day}T00:00:00.000000Z"),
        format!("{day}T23:59:59.999999Z"),
    )
}

/// Canonicalize a client-supplied timestamp to the fixed-width stored form
/// (UTC, microseconds, `Z`). Required: the day/month windows compare TEXT,
/// so a non-canonical width would fall outside its own day.
fn canonical_time(field: &'static str, value: &str) -> StoreResult<String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| {
            dt.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Micros, true)
        })
        .map_err(|_| StoreError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

impl Storage {
    pub async fn create_event(&self, new: NewEvent) -> StoreResult<EventRow> {
        let id = new_id();
        let now = now_rfc3339();
        let start_time = canonical_time("start_time", &new.start_time)?;
        let end_time = canonical_time("end_time", &new.end_time)?;
        sqlx::query(
            "INSERT INTO events
             (id, title, description, start_time, end_time, location, attendees,
              color, user_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&start_time)
        .bind(&end_time)
        .bind(&new.location)
        .bind(new.attendees)
        .bind(&new.color)
        .bind(&new.user_id)
        .bind(&now)
        .bind(&now)
        .execute(self.pool_ref())
        .await?;

        self.get_event(&id).await
    }

    pub async fn update_event(&self, id: &str, patch: EventPatch) -> StoreResult<EventRow> {
        let now = now_rfc3339();
        let start_time = patch
            .start_time
            .as_deref()
            .map(|s| canonical_time("start_time", s))
            .transpose()?;
        let end_time = patch
            .end_time
            .as_deref()
            .map(|s| canonical_time("end_time", s))
            .transpose()?;
        let result = sqlx::query(
            "UPDATE events SET
                 title = COALESCE(?, title),
                 description = COALESCE(?, description),
                 start_time = COALESCE(?, start_time),
                 end_time = COALESCE(?, end_time),
                 location = COALESCE(?, location),
                 attendees = COALESCE(?, attendees),
                 color = COALESCE(?, color),
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(&start_time)
        .bind(&end_time)
        .bind(&patch.location)
        .bind(patch.attendees)
        .bind(&patch.color)
        .bind(&now)
        .bind(id)
        .execute(self.pool_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "event",
                id: id.to_string(),
            });
        }
        self.get_event(id).await
    }

    pub async fn delete_event(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(self.pool_ref())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "event",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    pub async fn get_event(&self, id: &str) -> StoreResult<EventRow> {
        sqlx::query_as("SELECT * FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_ref())
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity: "event",
                id: id.to_string(),
            })
    }

    pub async fn list_events(&self) -> StoreResult<Vec<EventRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM events ORDER BY start_time ASC")
                .fetch_all(self.pool_ref())
                .await?,
        )
    }

    /// Events whose start time falls on the given day, ascending.
    pub async fn events_for_day(&self, day: NaiveDate) -> StoreResult<Vec<EventRow>> {
        let (start, end) = day_window(day);
        Ok(sqlx::query_as(
            "SELECT * FROM events WHERE start_time >= ? AND start_time <= ?
             ORDER BY start_time ASC",
        )
        .bind(&start)
        .bind(&end)
        .fetch_all(self.pool_ref())
        .await?)
    }

    /// Events starting within the given month, ascending.
    pub async fn events_for_month(&self, year: i32, month: u32) -> StoreResult<Vec<EventRow>> {
        let bad_month = || sqlx::Error::Protocol(format!("invalid month: {year}-{month:02}"));
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(bad_month)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(bad_month)?;
        let last = next.pred_opt().ok_or_else(bad_month)?;

        let (start, _) = day_window(first);
        let (_, end) = day_window(last);
        Ok(sqlx::query_as(
            "SELECT * FROM events WHERE start_time >= ? AND start_time <= ?
             ORDER BY start_time ASC",
        )
        .bind(&start)
        .bind(&end)
        .fetch_all(self.pool_ref())
        .await?)
    }
}
