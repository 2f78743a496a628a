//! Turns the untrusted structure parsed from a generation response into a
//! well-formed [`ScheduleResponse`], or fails with a validation error naming
//! the offending activity. Any per-activity failure is fatal for the whole
//! request; there are no partial schedules.

use chrono::Utc;
use once_cell::sync::Lazy;
use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;
use serde_json::Value as JsonValue;

use crate::error::{AppError, AppResult};
use crate::models::{Activity, ScheduleResponse, WeeklyGoal, WEEKDAYS};
use crate::services::time_grid::{time_to_minutes, GRID_END_MINUTES, GRID_START_MINUTES};

/// Fallback when the generated color is missing or malformed; first entry of
/// the pastel palette the prompt asks for.
pub const FALLBACK_COLOR: &str = "#fef3c7";

static COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"));

pub fn validate(raw: &JsonValue) -> AppResult<ScheduleResponse> {
    let root = raw
        .as_object()
        .ok_or_else(|| AppError::validation("response is not a JSON object"))?;

    // A missing or non-list `activities` degrades to an empty schedule rather
    // than a hard failure; generation output is only partially trustworthy.
    let activities = match root.get("activities").and_then(JsonValue::as_array) {
        Some(entries) => entries
            .iter()
            .map(validate_activity)
            .collect::<AppResult<Vec<_>>>()?,
        None => Vec::new(),
    };

    let weekly_goals = match root.get("weeklyGoals").and_then(JsonValue::as_array) {
        Some(entries) => entries
            .iter()
            .map(validate_weekly_goal)
            .collect::<AppResult<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(ScheduleResponse {
        activities,
        weekly_goals,
    })
}

fn validate_activity(raw: &JsonValue) -> AppResult<Activity> {
    let entry = raw
        .as_object()
        .ok_or_else(|| AppError::validation("activity is not a JSON object"))?;

    let name = coerce_string(entry.get("name"), "Unnamed Activity");
    let category = coerce_string(entry.get("category"), "general").to_lowercase();

    let days: Vec<String> = entry
        .get("days")
        .and_then(JsonValue::as_array)
        .map(|raw_days| {
            raw_days
                .iter()
                .filter_map(JsonValue::as_str)
                .map(str::trim)
                .filter(|day| WEEKDAYS.contains(day))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if days.is_empty() {
        return Err(AppError::validation(format!(
            "activity \"{name}\" has no valid days"
        )));
    }

    let start_time = require_time(entry.get("startTime"), &name)?;
    let end_time = require_time(entry.get("endTime"), &name)?;

    let start_minutes = check_window(&start_time, &name)?;
    let end_minutes = check_window(&end_time, &name)?;

    // Equal start and end is a zero-duration block. End before start is fine:
    // it denotes a span wrapping past midnight and passes through unmodified.
    if start_minutes == end_minutes {
        return Err(AppError::validation(format!(
            "activity \"{name}\" has same start and end time (duration must be > 0)"
        )));
    }

    let color = entry
        .get("color")
        .and_then(JsonValue::as_str)
        .filter(|value| COLOR_RE.is_match(value))
        .unwrap_or(FALLBACK_COLOR)
        .to_string();

    let id = match entry.get("id").and_then(JsonValue::as_str) {
        Some(id) => id.to_string(),
        None => synthesize_id(&category),
    };

    Ok(Activity {
        id,
        name,
        category,
        days,
        start_time,
        end_time,
        color,
    })
}

fn validate_weekly_goal(raw: &JsonValue) -> AppResult<WeeklyGoal> {
    let entry = raw
        .as_object()
        .ok_or_else(|| AppError::validation("weekly goal is not a JSON object"))?;

    let target_minutes = entry
        .get("targetMinutes")
        .and_then(JsonValue::as_f64)
        .map(|value| value.max(0.0).floor() as u32)
        .unwrap_or(0);

    Ok(WeeklyGoal {
        name: coerce_string(entry.get("name"), "Unnamed Goal"),
        target_minutes,
        category: coerce_string(entry.get("category"), "general").to_lowercase(),
    })
}

fn coerce_string(value: Option<&JsonValue>, default: &str) -> String {
    let coerced = value
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .unwrap_or_default();

    if coerced.is_empty() {
        default.to_string()
    } else {
        coerced.to_string()
    }
}

fn require_time(value: Option<&JsonValue>, activity_name: &str) -> AppResult<String> {
    let time = value.and_then(JsonValue::as_str).ok_or_else(|| {
        AppError::validation(format!(
            "activity \"{activity_name}\" has invalid time format (expected HH:MM)"
        ))
    })?;

    time_to_minutes(time).map_err(|_| {
        AppError::validation(format!(
            "activity \"{activity_name}\" has invalid time format (expected HH:MM)"
        ))
    })?;

    Ok(time.to_string())
}

fn check_window(time: &str, activity_name: &str) -> AppResult<u32> {
    let minutes = time_to_minutes(time)?;
    if !(GRID_START_MINUTES..=GRID_END_MINUTES).contains(&minutes) {
        return Err(AppError::validation(format!(
            "activity \"{activity_name}\" has time out of range (must be between 03:30 and 22:00)"
        )));
    }
    Ok(minutes)
}

/// Unique within a call; not required to be stable across calls.
fn synthesize_id(category: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(char::from)
        .collect();
    format!("{category}-{}-{}", Utc::now().timestamp_millis(), suffix.to_lowercase())
}
