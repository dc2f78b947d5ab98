//! Date cells
//!
//! Sheet dates are typed by hand: ISO timestamps from the script, or
//! day-first `DD/MM/YYYY` (optionally with `HH:MM:SS`) from people.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::warn;

use crate::types::ProductionOrder;

/// Parse a date cell. Returns `None` when no known format matches.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    let parsed = parse_day_first(s);
    if parsed.is_none() {
        warn!(date = s, "could not parse date");
    }
    parsed
}

/// `DD/MM/YYYY` or `DD-MM-YYYY`, with an optional `HH:MM:SS` anywhere after
fn parse_day_first(s: &str) -> Option<NaiveDateTime> {
    let date_re = Regex::new(r"(\d{1,2})[/-](\d{1,2})[/-](\d{4})").ok()?;
    let time_re = Regex::new(r"(\d{2}):(\d{2}):(\d{2})").ok()?;

    let caps = date_re.captures(s)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    match time_re.captures(s) {
        Some(t) => {
            let h: u32 = t[1].parse().ok()?;
            let m: u32 = t[2].parse().ok()?;
            let sec: u32 = t[3].parse().ok()?;
            date.and_hms_opt(h, m, sec)
        }
        None => date.and_hms_opt(0, 0, 0),
    }
}

/// `[Nd ]HH:MM:SS`; negative durations show as zero
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    let prefix = if days > 0 {
        format!("{}d ", days)
    } else {
        String::new()
    };
    format!("{}{:02}:{:02}:{:02}", prefix, hours, minutes, seconds)
}

/// Time since the order was issued, for orders still pending or in progress
pub fn elapsed_for(order: &ProductionOrder, now: NaiveDateTime) -> Option<Duration> {
    if !order.is_open() {
        return None;
    }
    let issued = parse_date(order.fecha_emision.as_deref()?)?;
    Some(now - issued)
}
