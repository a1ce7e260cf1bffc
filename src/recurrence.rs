//! Recurring-event expansion.
//!
//! Expands a stored event into the concrete dates it occurs on, up to and
//! including its end date. Instances are derived for display only; the
//! stored row stays the sole source of truth for the whole series, and
//! edits or deletes always act on the original row id.

use chrono::{Days, Months, NaiveDate};
use thiserror::Error;

use crate::models::{Event, Occurrence, RecurrencePattern};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("event {0} is marked recurring but has no recurrence pattern or end date")]
    MissingRecurrenceFields(i64),
    #[error("date arithmetic out of range while expanding event {0}")]
    InvalidDate(i64),
}

/// The date of the `step`-th occurrence after the anchor.
///
/// Monthly and yearly cadences count whole months from the anchor, so the
/// anchor's day-of-month is preserved where it exists and clamped to the
/// last day of shorter target months (Jan 31 -> Feb 29 -> Mar 31). A Feb 29
/// anchor lands on Feb 28 in common years and back on Feb 29 in leap years.
fn nth_occurrence(anchor: NaiveDate, pattern: RecurrencePattern, step: u32) -> Option<NaiveDate> {
    match pattern {
        RecurrencePattern::Weekly => anchor.checked_add_days(Days::new(7 * u64::from(step))),
        RecurrencePattern::Monthly => anchor.checked_add_months(Months::new(step)),
        RecurrencePattern::Yearly => anchor.checked_add_months(Months::new(12 * step)),
    }
}

/// Expand one stored event into its displayable occurrences.
///
/// The original record is always the first entry. Generated instances are
/// shallow copies with only `event_date` replaced, marked with
/// `is_instance` and the original row id. Generation stops once the next
/// computed date passes `end_date`; a date equal to `end_date` is included.
///
/// Pure: no I/O and no clock. The same input always yields the same output.
pub fn expand_event(event: &Event) -> Result<Vec<Occurrence>, RecurrenceError> {
    let mut occurrences = vec![Occurrence::original(event.clone())];
    if !event.is_recurring {
        return Ok(occurrences);
    }

    let (pattern, end_date) = match (event.recurrence_pattern, event.end_date) {
        (Some(pattern), Some(end_date)) => (pattern, end_date),
        _ => return Err(RecurrenceError::MissingRecurrenceFields(event.id)),
    };

    for step in 1u32.. {
        let date = nth_occurrence(event.event_date, pattern, step)
            .ok_or(RecurrenceError::InvalidDate(event.id))?;
        if date > end_date {
            break;
        }
        occurrences.push(Occurrence::instance(event, date));
    }

    Ok(occurrences)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn event(date: &str) -> Event {
        Event {
            id: 7,
            title: "Prayer Night".to_string(),
            description: Some("Monthly prayer meeting".to_string()),
            location: Some("Fellowship Hall".to_string()),
            event_date: d(date),
            event_time: Some("7:00 PM".to_string()),
            is_recurring: false,
            recurrence_pattern: None,
            end_date: None,
            created_at: d("2024-01-01").and_hms_opt(12, 0, 0).unwrap(),
        }
    }

    fn recurring(date: &str, pattern: RecurrencePattern, end: &str) -> Event {
        Event {
            is_recurring: true,
            recurrence_pattern: Some(pattern),
            end_date: Some(d(end)),
            ..event(date)
        }
    }

    fn dates(occurrences: &[Occurrence]) -> Vec<NaiveDate> {
        occurrences.iter().map(|o| o.date()).collect()
    }

    #[test]
    fn non_recurring_yields_single_original() {
        let occurrences = expand_event(&event("2024-03-15")).unwrap();
        assert_eq!(occurrences.len(), 1);
        assert!(!occurrences[0].is_instance);
        assert_eq!(occurrences[0].original_event_id, None);
        assert_eq!(occurrences[0].event, event("2024-03-15"));
    }

    #[test]
    fn weekly_expansion_includes_inclusive_end() {
        let occurrences =
            expand_event(&recurring("2024-01-07", RecurrencePattern::Weekly, "2024-01-28"))
                .unwrap();
        assert_eq!(
            dates(&occurrences),
            vec![d("2024-01-07"), d("2024-01-14"), d("2024-01-21"), d("2024-01-28")]
        );
        assert!(!occurrences[0].is_instance);
        for instance in &occurrences[1..] {
            assert!(instance.is_instance);
            assert_eq!(instance.original_event_id, Some(7));
        }
    }

    #[test]
    fn weekly_expansion_stops_before_end_when_no_occurrence_lands_on_it() {
        let occurrences =
            expand_event(&recurring("2024-01-07", RecurrencePattern::Weekly, "2024-01-10"))
                .unwrap();
        assert_eq!(dates(&occurrences), vec![d("2024-01-07")]);
    }

    #[test]
    fn monthly_expansion_clamps_to_short_months() {
        let occurrences =
            expand_event(&recurring("2024-01-31", RecurrencePattern::Monthly, "2024-04-30"))
                .unwrap();
        assert_eq!(
            dates(&occurrences),
            vec![d("2024-01-31"), d("2024-02-29"), d("2024-03-31"), d("2024-04-30")]
        );
    }

    #[test]
    fn monthly_clamp_does_not_drift_after_short_month() {
        // The day-of-month comes from the anchor, not the previous occurrence.
        let occurrences =
            expand_event(&recurring("2023-12-31", RecurrencePattern::Monthly, "2024-03-31"))
                .unwrap();
        assert_eq!(
            dates(&occurrences),
            vec![d("2023-12-31"), d("2024-01-31"), d("2024-02-29"), d("2024-03-31")]
        );
    }

    #[test]
    fn yearly_leap_day_clamps_in_common_years() {
        let occurrences =
            expand_event(&recurring("2024-02-29", RecurrencePattern::Yearly, "2027-02-28"))
                .unwrap();
        assert_eq!(
            dates(&occurrences),
            vec![d("2024-02-29"), d("2025-02-28"), d("2026-02-28"), d("2027-02-28")]
        );
    }

    #[test]
    fn yearly_leap_day_returns_on_next_leap_year() {
        let occurrences =
            expand_event(&recurring("2024-02-29", RecurrencePattern::Yearly, "2028-02-29"))
                .unwrap();
        assert_eq!(*dates(&occurrences).last().unwrap(), d("2028-02-29"));
    }

    #[test]
    fn end_date_before_anchor_yields_only_original() {
        let occurrences =
            expand_event(&recurring("2024-06-01", RecurrencePattern::Weekly, "2024-05-01"))
                .unwrap();
        assert_eq!(dates(&occurrences), vec![d("2024-06-01")]);
        assert!(!occurrences[0].is_instance);
    }

    #[test]
    fn recurring_without_pattern_or_end_date_errors() {
        let mut missing_pattern = recurring("2024-01-07", RecurrencePattern::Weekly, "2024-02-01");
        missing_pattern.recurrence_pattern = None;
        assert_eq!(
            expand_event(&missing_pattern),
            Err(RecurrenceError::MissingRecurrenceFields(7))
        );

        let mut missing_end = recurring("2024-01-07", RecurrencePattern::Weekly, "2024-02-01");
        missing_end.end_date = None;
        assert_eq!(
            expand_event(&missing_end),
            Err(RecurrenceError::MissingRecurrenceFields(7))
        );
    }

    #[test]
    fn expansion_is_idempotent() {
        let event = recurring("2024-01-31", RecurrencePattern::Monthly, "2025-01-31");
        assert_eq!(expand_event(&event).unwrap(), expand_event(&event).unwrap());
    }

    #[test]
    fn instances_differ_only_in_date() {
        let original = recurring("2024-01-07", RecurrencePattern::Weekly, "2024-01-21");
        let occurrences = expand_event(&original).unwrap();
        for instance in &occurrences[1..] {
            assert_ne!(instance.event.event_date, original.event_date);
            let mut copy = instance.event.clone();
            copy.event_date = original.event_date;
            assert_eq!(copy, original);
        }
    }
}
