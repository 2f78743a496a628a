use serde::{Deserialize, Serialize};

/// Canonical English weekday names, Monday first. Day order everywhere in the
/// app (grid columns, exports, day filtering) follows this array.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A named, timed, categorized occurrence recurring on one or more weekdays.
///
/// `end_time` may be numerically earlier than `start_time`, which denotes a
/// span wrapping past midnight (e.g. sleep 21:30 -> 03:30). Consumers must
/// treat that as an overnight span, not as invalid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub category: String,
    pub days: Vec<String>,
    pub start_time: String,
    pub end_time: String,
    pub color: String,
}

/// One single-day occurrence of an [`Activity`], the unit of direct user
/// manipulation in edit mode. `original_id` is a non-owning back-reference
/// used only for re-aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableActivity {
    pub id: String,
    pub original_id: String,
    pub name: String,
    pub category: String,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyGoal {
    pub name: String,
    pub target_minutes: u32,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInfo {
    pub name: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// The unit produced by one generation call and consumed by the UI.
/// Immutable once produced; edits happen in the [`EditableActivity`]
/// projection and are merged back into a fresh activity list on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub activities: Vec<Activity>,
    pub weekly_goals: Vec<WeeklyGoal>,
}
