use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, AppResult};

/// First visible slot starts at 03:30.
pub const GRID_START_MINUTES: u32 = 210;
/// Last visible slot starts at 22:00.
pub const GRID_END_MINUTES: u32 = 1320;
/// One grid row covers 30 minutes.
pub const MINUTES_PER_ROW: u32 = 30;
/// Rendered height of one grid row. Layout and drag/resize math must share
/// this constant so a pixel offset always maps to the same 30-minute bucket.
pub const ROW_HEIGHT_PX: u32 = 32;

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]?[0-9]|2[0-3]):([0-5][0-9])$").expect("valid time regex"));

/// Parse `HH:MM` (24-hour) into minutes since midnight.
pub fn time_to_minutes(time: &str) -> AppResult<u32> {
    let captures = TIME_RE
        .captures(time)
        .ok_or_else(|| AppError::validation(format!("invalid time format (expected HH:MM): {time:?}")))?;

    let hours: u32 = captures[1].parse().expect("regex guarantees digits");
    let minutes: u32 = captures[2].parse().expect("regex guarantees digits");
    Ok(hours * 60 + minutes)
}

/// Inverse of [`time_to_minutes`]. The caller is responsible for wrapping;
/// this assumes `0 <= minutes < 1440`.
pub fn minutes_to_time(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Render a 24-hour `HH:MM` string on a 12-hour clock, e.g. "14:30" -> "2:30 PM".
pub fn format_time_display(time: &str) -> AppResult<String> {
    let total = time_to_minutes(time)?;
    let hours = total / 60;
    let minutes = total % 60;
    let period = if hours >= 12 { "PM" } else { "AM" };
    let display_hours = match hours % 12 {
        0 => 12,
        other => other,
    };
    Ok(format!("{display_hours}:{minutes:02} {period}"))
}

/// The fixed visible calendar window: 03:30 through 22:00 inclusive in
/// 30-minute steps, 38 slots.
pub fn generate_time_slots() -> Vec<String> {
    (GRID_START_MINUTES..=GRID_END_MINUTES)
        .step_by(MINUTES_PER_ROW as usize)
        .map(minutes_to_time)
        .collect()
}

/// End minutes used for layout and duration math. An activity whose end is
/// numerically before its start wraps past midnight; its visual span is capped
/// at 22:00 without altering the stored end time.
pub fn cap_end_minutes(start_minutes: u32, end_minutes: u32) -> u32 {
    if end_minutes < start_minutes {
        GRID_END_MINUTES
    } else {
        end_minutes
    }
}

/// Map a time range to `(row_start, row_end)` grid coordinates. Row 0 is the
/// slot starting at 03:30; `row_end` is exclusive.
pub fn time_to_grid_position(start_time: &str, end_time: &str) -> AppResult<(usize, usize)> {
    let start_minutes = time_to_minutes(start_time)?;
    let end_minutes = cap_end_minutes(start_minutes, time_to_minutes(end_time)?);

    let row_start = (start_minutes.saturating_sub(GRID_START_MINUTES) / MINUTES_PER_ROW) as usize;
    let row_end = (end_minutes
        .saturating_sub(GRID_START_MINUTES)
        .div_ceil(MINUTES_PER_ROW)) as usize;

    Ok((row_start, row_end))
}

/// Convert a vertical pixel drag offset into a minute delta snapped to
/// 30-minute increments.
pub fn pixels_to_minute_delta(delta_px: i32) -> i32 {
    let raw = (delta_px as f64 / ROW_HEIGHT_PX as f64 * MINUTES_PER_ROW as f64).round() as i32;
    let snapped = (raw as f64 / MINUTES_PER_ROW as f64).round() as i32;
    snapped * MINUTES_PER_ROW as i32
}

/// Human-readable duration, e.g. "45m", "2h", "1h 30m". Overnight spans are
/// capped at 22:00, matching the visible grid.
pub fn duration_label(start_time: &str, end_time: &str) -> AppResult<String> {
    let start_minutes = time_to_minutes(start_time)?;
    let end_minutes = cap_end_minutes(start_minutes, time_to_minutes(end_time)?);

    let duration = end_minutes.saturating_sub(start_minutes);
    let hours = duration / 60;
    let minutes = duration % 60;

    Ok(match (hours, minutes) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    })
}
