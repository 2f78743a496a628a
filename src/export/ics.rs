//! iCalendar export. One VEVENT per (activity, day) pair, anchored to the
//! week containing the given date, with a 15-minute display reminder.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Utc};

use crate::error::AppResult;
use crate::models::{ScheduleResponse, WEEKDAYS};
use crate::services::category_icons::icon_for;
use crate::services::time_grid::time_to_minutes;

const PRODID: &str = "-//FlowWeek//Weekly Schedule//EN";

/// Build an iCalendar document for the week containing today.
pub fn export_current_week(schedule: &ScheduleResponse) -> AppResult<String> {
    export_week(schedule, Local::now().date_naive())
}

/// Build an iCalendar document anchored to the week containing `anchor`.
/// Events land on that week's Monday through Sunday.
pub fn export_week(schedule: &ScheduleResponse, anchor: NaiveDate) -> AppResult<String> {
    let monday = week_monday(anchor);
    let stamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();

    let mut lines: Vec<String> = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{PRODID}"),
        "CALSCALE:GREGORIAN".to_string(),
    ];

    for activity in &schedule.activities {
        let start_minutes = time_to_minutes(&activity.start_time)?;
        let end_minutes = time_to_minutes(&activity.end_time)?;

        for day in &activity.days {
            let Some(offset) = WEEKDAYS.iter().position(|name| *name == day.as_str()) else {
                continue;
            };
            let date = monday + Duration::days(offset as i64);

            let start = at_minutes(date, start_minutes);
            // An end before the start wraps past midnight into the next day.
            let end = if end_minutes <= start_minutes {
                at_minutes(date + Duration::days(1), end_minutes)
            } else {
                at_minutes(date, end_minutes)
            };

            let summary = format!("{} {}", icon_for(&activity.category), activity.name);
            lines.push("BEGIN:VEVENT".to_string());
            lines.push(format!("UID:{}-{}@flowweek", activity.id, day.to_lowercase()));
            lines.push(format!("DTSTAMP:{stamp}"));
            lines.push(format!("DTSTART:{}", format_local(start)));
            lines.push(format!("DTEND:{}", format_local(end)));
            lines.push(format!("SUMMARY:{}", escape_text(&summary)));
            lines.push(format!(
                "DESCRIPTION:{}",
                escape_text(&format!("Category: {}", activity.category))
            ));
            lines.push("BEGIN:VALARM".to_string());
            lines.push("ACTION:DISPLAY".to_string());
            lines.push(format!("DESCRIPTION:{}", escape_text(&activity.name)));
            lines.push("TRIGGER:-PT15M".to_string());
            lines.push("END:VALARM".to_string());
            lines.push("END:VEVENT".to_string());
        }
    }

    lines.push("END:VCALENDAR".to_string());
    Ok(lines.join("\r\n") + "\r\n")
}

fn week_monday(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(offset)
}

fn at_minutes(date: NaiveDate, minutes: u32) -> NaiveDateTime {
    date.and_hms_opt(minutes / 60, minutes % 60, 0)
        .unwrap_or_else(|| date.and_hms_opt(0, 0, 0).expect("midnight is valid"))
}

fn format_local(moment: NaiveDateTime) -> String {
    moment.format("%Y%m%dT%H%M%S").to_string()
}

/// RFC 5545 text escaping for SUMMARY/DESCRIPTION values.
fn escape_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Activity;

    fn schedule(days: &[&str], start: &str, end: &str) -> ScheduleResponse {
        ScheduleResponse {
            activities: vec![Activity {
                id: "gym-1".to_string(),
                name: "Morning Gym".to_string(),
                category: "gym".to_string(),
                days: days.iter().map(|d| d.to_string()).collect(),
                start_time: start.to_string(),
                end_time: end.to_string(),
                color: "#dbeafe".to_string(),
            }],
            weekly_goals: vec![],
        }
    }

    // 2026-08-26 is a Wednesday; its week starts Monday 2026-08-24.
    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 26).unwrap()
    }

    #[test]
    fn one_event_per_day_with_alarm() {
        let ics = export_week(&schedule(&["Monday", "Wednesday"], "07:00", "08:00"), anchor())
            .unwrap();

        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
        assert_eq!(ics.matches("TRIGGER:-PT15M").count(), 2);
        assert!(ics.contains("DTSTART:20260824T070000"));
        assert!(ics.contains("DTSTART:20260826T070000"));
        assert!(ics.contains("DTEND:20260824T080000"));
        assert!(ics.contains("SUMMARY:💪 Morning Gym"));
        assert!(ics.contains("DESCRIPTION:Category: gym"));
    }

    #[test]
    fn overnight_span_rolls_end_to_next_day() {
        let ics = export_week(&schedule(&["Monday"], "21:30", "03:30"), anchor()).unwrap();
        assert!(ics.contains("DTSTART:20260824T213000"));
        assert!(ics.contains("DTEND:20260825T033000"));
    }

    #[test]
    fn week_monday_handles_every_weekday() {
        let monday = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        for offset in 0..7 {
            assert_eq!(week_monday(monday + Duration::days(offset)), monday);
        }
    }

    #[test]
    fn text_is_escaped() {
        let mut s = schedule(&["Monday"], "07:00", "08:00");
        s.activities[0].name = "Plan; review, repeat".to_string();
        let ics = export_week(&s, anchor()).unwrap();
        assert!(ics.contains("Plan\\; review\\, repeat"));
    }
}
