use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, Timelike, Weekday};
use serde_json::json;

use crate::error::{AppError, AppResult};

pub fn parse_datetime(value: &str) -> AppResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).map_err(|err| {
        AppError::validation_with_details(
            "invalid timestamp format",
            json!({ "value": value, "error": err.to_string() }),
        )
    })
}

/// Like [`parse_datetime`] but names the owning event and field in the error
/// details, so a caller can report exactly which record was malformed.
pub fn parse_event_datetime(
    event_id: &str,
    field: &str,
    value: &str,
) -> AppResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).map_err(|err| {
        AppError::validation_with_details(
            "invalid event timestamp",
            json!({
                "eventId": event_id,
                "field": field,
                "value": value,
                "error": err.to_string(),
            }),
        )
    })
}

pub fn format_datetime(dt: DateTime<FixedOffset>) -> String {
    dt.to_rfc3339()
}

/// Parses a "HH:MM" clock string, the format the settings layer uses for rush
/// windows.
pub fn parse_clock_time(value: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|err| {
        AppError::validation_with_details(
            "invalid clock time, expected HH:MM",
            json!({ "value": value, "error": err.to_string() }),
        )
    })
}

pub fn add_minutes(dt: DateTime<FixedOffset>, minutes: i64) -> AppResult<DateTime<FixedOffset>> {
    dt.checked_add_signed(Duration::minutes(minutes))
        .ok_or_else(|| AppError::validation("time arithmetic out of range"))
}

pub fn duration_minutes(
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
) -> AppResult<i64> {
    let total = end.signed_duration_since(start).num_minutes();
    if total < 0 {
        Err(AppError::validation("end time must not precede start time"))
    } else {
        Ok(total)
    }
}

pub fn clock_time_of(dt: DateTime<FixedOffset>) -> NaiveTime {
    dt.time()
}

pub fn minute_of_day(dt: DateTime<FixedOffset>) -> i64 {
    let time = dt.time();
    (time.hour() as i64) * 60 + (time.minute() as i64)
}

/// Saturday/Sunday, matching the timetable data this engine ships with.
pub fn is_weekend(dt: DateTime<FixedOffset>) -> bool {
    matches!(dt.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn dt(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(0).expect("offset");
        let naive = NaiveDate::from_ymd_opt(year, month, day)
            .expect("valid date")
            .and_hms_opt(hour, minute, 0)
            .expect("valid time");
        offset
            .from_local_datetime(&naive)
            .single()
            .expect("valid datetime")
    }

    #[test]
    fn parse_event_datetime_reports_event_and_field() {
        let error = parse_event_datetime("evt-7", "endAt", "not-a-date").expect_err("must fail");
        let details = error.validation_details().expect("details");
        assert_eq!(details["eventId"], "evt-7");
        assert_eq!(details["field"], "endAt");
    }

    #[test]
    fn parse_clock_time_accepts_hh_mm_only() {
        assert_eq!(
            parse_clock_time("07:30").expect("clock time"),
            NaiveTime::from_hms_opt(7, 30, 0).expect("time")
        );
        assert!(parse_clock_time("7h30").is_err());
    }

    #[test]
    fn minute_of_day_ignores_the_date() {
        assert_eq!(minute_of_day(dt(2025, 3, 2, 8, 15)), 8 * 60 + 15);
        assert_eq!(minute_of_day(dt(2031, 11, 20, 8, 15)), 8 * 60 + 15);
    }

    #[test]
    fn weekend_covers_saturday_and_sunday() {
        // 2025-06-07 is a Saturday, 2025-06-08 a Sunday, 2025-06-09 a Monday.
        assert!(is_weekend(dt(2025, 6, 7, 9, 0)));
        assert!(is_weekend(dt(2025, 6, 8, 9, 0)));
        assert!(!is_weekend(dt(2025, 6, 9, 9, 0)));
    }

    #[test]
    fn negative_duration_is_rejected() {
        let start = dt(2025, 6, 9, 10, 0);
        let end = dt(2025, 6, 9, 9, 0);
        assert!(duration_minutes(start, end).is_err());
        assert_eq!(duration_minutes(end, start).expect("minutes"), 60);
    }
}
