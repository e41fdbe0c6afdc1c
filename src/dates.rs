//! Date and time helpers.
//!
//! Every function that depends on the current time has an `_at` form taking
//! `now` explicitly; the plain form reads the local clock.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, TimeZone};

/// Timestamps are kept in the local zone so calendar-day logic matches the user.
pub type Timestamp = DateTime<Local>;

/// Display format used for creation and completion times.
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y, %H:%M";

const DATE_FORMAT: &str = "%Y-%m-%d";
const MILLIS_PER_DAY: i64 = 86_400_000;

pub fn now() -> Timestamp {
    Local::now()
}

/// Format a timestamp as `dd/mm/yyyy, HH:MM`.
pub fn format_date_time(ts: &Timestamp) -> String {
    ts.format(DISPLAY_FORMAT).to_string()
}

/// Parse an RFC 3339 timestamp, the display format, or a bare date
/// (start of that local day).
pub fn parse_timestamp(input: &str) -> Option<Timestamp> {
    let input = input.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.with_timezone(&Local));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, DISPLAY_FORMAT) {
        return Local.from_local_datetime(&naive).earliest();
    }
    let date = NaiveDate::parse_from_str(input, DATE_FORMAT).ok()?;
    Local.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).earliest()
}

/// Parse a due date. A bare `YYYY-MM-DD` means the last second of that
/// local day, so a task due today is not overdue until the day is over.
pub fn parse_due_date(input: &str) -> Option<Timestamp> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, DATE_FORMAT) {
        return Local.from_local_datetime(&date.and_hms_opt(23, 59, 59)?).latest();
    }
    parse_timestamp(input)
}

/// Whole days from `now` until `due`, rounded up.
fn days_until(due: &Timestamp, now: &Timestamp) -> i64 {
    let diff = due.signed_duration_since(*now).num_milliseconds();
    let days = diff / MILLIS_PER_DAY;
    if diff % MILLIS_PER_DAY > 0 {
        days + 1
    } else {
        days
    }
}

pub fn format_due_date(due: &Timestamp) -> String {
    format_due_date_at(due, &now())
}

/// Phrase a due date relative to `now`.
pub fn format_due_date_at(due: &Timestamp, now: &Timestamp) -> String {
    let days = days_until(due, now);
    match days {
        d if d < 0 => {
            let overdue = d.abs();
            let plural = if overdue > 1 { "s" } else { "" };
            format!("Overdue by {overdue} day{plural}")
        }
        0 => "Due today".to_string(),
        1 => "Due tomorrow".to_string(),
        d => format!("Due in {d} days"),
    }
}

pub fn format_relative_time(ts: &Timestamp) -> String {
    format_relative_time_at(ts, &now())
}

/// Phrase how long ago `ts` was.
pub fn format_relative_time_at(ts: &Timestamp, now: &Timestamp) -> String {
    let minutes = now.signed_duration_since(*ts).num_minutes();
    let hours = minutes.div_euclid(60);
    if minutes < 60 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{hours} hours ago")
    } else {
        format!("{} days ago", hours / 24)
    }
}

pub fn is_overdue(due: &Timestamp) -> bool {
    is_overdue_at(due, &now())
}

/// A due date is overdue when it is strictly before `now`.
pub fn is_overdue_at(due: &Timestamp, now: &Timestamp) -> bool {
    due < now
}

/// The Sunday and Saturday bounding the week that contains `now`.
pub fn this_week_range(now: &Timestamp) -> (NaiveDate, NaiveDate) {
    let today = now.date_naive();
    let start = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
    (start, start + Duration::days(6))
}

pub fn is_this_week(ts: &Timestamp) -> bool {
    is_this_week_at(ts, &now())
}

/// True when the local calendar date of `ts` falls in the current
/// Sunday..=Saturday week.
pub fn is_this_week_at(ts: &Timestamp, now: &Timestamp) -> bool {
    let (start, end) = this_week_range(now);
    let date = ts.with_timezone(&Local).date_naive();
    date >= start && date <= end
}

/// `YYYY-MM-DD` of a timestamp, used for export file names.
pub fn date_stamp(ts: &Timestamp) -> String {
    ts.format(DATE_FORMAT).to_string()
}
