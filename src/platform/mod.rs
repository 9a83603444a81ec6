//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time (leaderboard timestamps, run seeds)
//! - Human-readable relative dates (calendar dates via `js_sys::Date` on web)

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Seed for a new run derived from the clock
pub fn clock_seed() -> u64 {
    now_ms() as u64
}

/// Format a timestamp relative to now ("Just now", "3 hours ago", "4/2/26" on web)
pub fn format_date(timestamp: f64) -> String {
    format_relative(now_ms(), timestamp)
}

/// Format `timestamp` relative to `now` (both Unix milliseconds)
pub fn format_relative(now: f64, timestamp: f64) -> String {
    let diff_secs = (now - timestamp) / 1000.0;
    let diff_mins = diff_secs / 60.0;
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as i64;
        if days == 1 {
            "Yesterday".to_string()
        } else if days < 7 {
            format!("{} days ago", days)
        } else {
            calendar_date(timestamp).unwrap_or_else(|| format!("{} days ago", days))
        }
    } else if diff_hours >= 1.0 {
        let hours = diff_hours.floor() as i64;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff_mins >= 1.0 {
        let mins = diff_mins.floor() as i64;
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}

/// Local calendar date ("4/2/26") from the browser's clock
#[cfg(target_arch = "wasm32")]
fn calendar_date(timestamp: f64) -> Option<String> {
    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
    Some(format!(
        "{}/{}/{}",
        date.get_month() + 1,
        date.get_date(),
        date.get_full_year() % 100
    ))
}

/// No local timezone data on native; callers keep the day count
#[cfg(not(target_arch = "wasm32"))]
fn calendar_date(_timestamp: f64) -> Option<String> {
    None
}
