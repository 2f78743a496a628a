//! CSV export. One row per (activity, day) pair, grouped by weekday in
//! calendar order.

use crate::error::AppResult;
use crate::models::{ScheduleResponse, WEEKDAYS};
use crate::services::time_grid::duration_label;

const HEADER: &str = "Day,Time,Activity,Category,Duration";

pub fn export(schedule: &ScheduleResponse) -> AppResult<String> {
    let mut lines = vec![HEADER.to_string()];

    for day in WEEKDAYS {
        for activity in &schedule.activities {
            if !activity.days.iter().any(|d| d.as_str() == day) {
                continue;
            }

            let time = format!("{} - {}", activity.start_time, activity.end_time);
            let duration = duration_label(&activity.start_time, &activity.end_time)?;
            lines.push(
                [day, &time, &activity.name, &activity.category, &duration]
                    .map(quote)
                    .join(","),
            );
        }
    }

    Ok(lines.join("\n") + "\n")
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Activity;

    fn activity(name: &str, days: &[&str], start: &str, end: &str) -> Activity {
        Activity {
            id: format!("{}-1", name.to_lowercase()),
            name: name.to_string(),
            category: "general".to_string(),
            days: days.iter().map(|d| d.to_string()).collect(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            color: "#fef3c7".to_string(),
        }
    }

    #[test]
    fn rows_are_grouped_by_weekday_order() {
        let schedule = ScheduleResponse {
            activities: vec![
                activity("Gym", &["Wednesday", "Monday"], "07:00", "08:00"),
                activity("Work", &["Monday"], "09:00", "17:00"),
            ],
            weekly_goals: vec![],
        };

        let csv = export(&schedule).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Day,Time,Activity,Category,Duration");
        assert_eq!(lines[1], "\"Monday\",\"07:00 - 08:00\",\"Gym\",\"general\",\"1h\"");
        assert_eq!(lines[2], "\"Monday\",\"09:00 - 17:00\",\"Work\",\"general\",\"8h\"");
        assert_eq!(lines[3], "\"Wednesday\",\"07:00 - 08:00\",\"Gym\",\"general\",\"1h\"");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn quotes_are_doubled_inside_cells() {
        let schedule = ScheduleResponse {
            activities: vec![activity("Read \"Dune\"", &["Sunday"], "20:00", "21:00")],
            weekly_goals: vec![],
        };

        let csv = export(&schedule).unwrap();
        assert!(csv.contains("\"Read \"\"Dune\"\"\""));
    }

    #[test]
    fn overnight_duration_is_capped_at_window_end() {
        let schedule = ScheduleResponse {
            activities: vec![activity("Sleep", &["Monday"], "21:30", "03:30")],
            weekly_goals: vec![],
        };

        let csv = export(&schedule).unwrap();
        assert!(csv.contains("\"21:30 - 03:30\""));
        assert!(csv.contains("\"30m\""));
    }
}
