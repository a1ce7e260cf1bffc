use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Cadence of a recurring event. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePattern {
    Weekly,
    Monthly,
    Yearly,
}

/// A stored event row. For recurring events this single row represents the
/// whole series; occurrences are derived at read time, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_date: NaiveDate,
    pub event_time: Option<String>,
    pub is_recurring: bool,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing)]
    pub created_at: NaiveDateTime,
}

/// Writable event fields, as accepted by the admin API.
#[derive(Debug, Deserialize)]
pub struct EventFields {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_date: NaiveDate,
    pub event_time: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub end_date: Option<NaiveDate>,
}

/// One calendar-dated materialization of an event: either the stored row
/// itself or a generated repetition pointing back at it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occurrence {
    #[serde(flatten)]
    pub event: Event,
    pub is_instance: bool,
    pub original_event_id: Option<i64>,
}

impl Occurrence {
    pub fn original(event: Event) -> Self {
        Occurrence {
            event,
            is_instance: false,
            original_event_id: None,
        }
    }

    /// A shallow copy of the original with only the date replaced.
    pub fn instance(original: &Event, date: NaiveDate) -> Self {
        let mut event = original.clone();
        event.event_date = date;
        Occurrence {
            event,
            is_instance: true,
            original_event_id: Some(original.id),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.event.event_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ServiceTime {
    pub id: i64,
    pub service_name: String,
    pub day_of_week: String,
    pub time: String,
}

#[derive(Debug, Deserialize)]
pub struct ServiceTimeFields {
    pub service_name: String,
    pub day_of_week: String,
    pub time: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}

/// Display order for the public schedule.
pub const DAY_ORDER: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub fn day_index(day: &str) -> Option<usize> {
    DAY_ORDER.iter().position(|d| d.eq_ignore_ascii_case(day))
}

/// The canonical spelling of a day name, if it names a day at all.
pub fn canonical_day(day: &str) -> Option<&'static str> {
    day_index(day).map(|i| DAY_ORDER[i])
}
