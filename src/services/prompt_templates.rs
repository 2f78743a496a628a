use serde_json::{json, Value as JsonValue};

/// Soft pastel palette the prompt instructs the model to draw category colors
/// from. The first entry doubles as the validator's fallback color.
pub const COLOR_PALETTE: [&str; 15] = [
    "#fef3c7", // soft yellow
    "#dbeafe", // soft blue
    "#fce7f3", // soft pink
    "#d1fae5", // soft green
    "#fed7aa", // soft orange
    "#e0e7ff", // soft indigo
    "#fecaca", // soft red
    "#f3f4f6", // soft gray
    "#fef9c3", // soft lime
    "#d1f4e0", // soft teal
    "#fce4ec", // soft rose
    "#e1f5fe", // soft cyan
    "#f3e5f5", // soft purple
    "#fff9c4", // soft amber
    "#f1f8e9", // soft light green
];

/// System prompt guiding the model when turning a free-text description of
/// weekly goals into a structured schedule.
pub fn schedule_system_prompt() -> &'static str {
    r##"You are FlowWeek's schedule planner. Parse the user's natural language description of
their weekly goals and generate an optimized weekly schedule. Always respond with valid
UTF-8 JSON. Do not wrap the response in markdown code blocks.

REQUIREMENTS:
1. Extract all activities with specific times and days
2. Extract weekly goals (total time targets per week)
3. Optimize the schedule to avoid conflicts
4. Use 24-hour time format (HH:MM) for all times
5. Identify categories from the user's input - create relevant category names based on the
   activities mentioned
6. Assign colors from the soft pastel palette below
7. Return ONLY valid JSON matching the schema below

CATEGORY CREATION:
- Categories are short, lowercase, hyphen-separated tokens (e.g. "gym", "work",
  "side-project", "family-time")
- Group similar activities into the same category
- Common categories: work, gym, learning, family, sleep, meals, hobbies, commute,
  personal-project

TIME CONSTRAINTS:
- All activities must be scheduled between 03:30 and 22:00
- Use 30-minute time slots
- If the user gives vague times (e.g. "morning"), choose reasonable times within the window

DAY MAPPING:
- Use full day names: Monday, Tuesday, Wednesday, Thursday, Friday, Saturday, Sunday
- "weekdays" = Monday through Friday; "weekends" = Saturday, Sunday
- "daily" or "every day" = all 7 days
- "4x per week" = distribute across weekdays (e.g. Mon, Tue, Thu, Fri)

COLOR ASSIGNMENT:
- Use colors like: #fef3c7, #dbeafe, #fce7f3, #d1fae5, #fed7aa, #e0e7ff, #fecaca, #f3f4f6,
  #fef9c3, #d1f4e0
- Ensure each category gets a distinct color

OUTPUT SCHEMA (return ONLY this JSON structure, no other text):
{
  "activities": [
    {
      "id": "unique-id-1",
      "name": "Activity Name",
      "category": "category-name",
      "days": ["Monday", "Tuesday"],
      "startTime": "09:00",
      "endTime": "17:00",
      "color": "#hexcode"
    }
  ],
  "weeklyGoals": [
    {
      "name": "Goal Name",
      "targetMinutes": 120,
      "category": "category-name"
    }
  ]
}
"##
}

/// Build the user payload for a schedule generation request.
pub fn build_schedule_payload(user_input: &str) -> JsonValue {
    json!({
        "operation": "generateSchedule",
        "input": user_input,
        "expectations": {
            "timeWindow": { "start": "03:30", "end": "22:00" },
            "granularity": "30m",
            "weekdayNames": "full-english",
            "palette": COLOR_PALETTE,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_embeds_input_and_expectations() {
        let payload = build_schedule_payload("gym three times a week, work 9-5");
        let obj = payload.as_object().expect("payload should be an object");

        assert_eq!(
            obj.get("operation").and_then(|v| v.as_str()),
            Some("generateSchedule")
        );
        assert_eq!(
            obj.get("input").and_then(|v| v.as_str()),
            Some("gym three times a week, work 9-5")
        );

        let expectations = obj
            .get("expectations")
            .and_then(|value| value.as_object())
            .expect("expectations should exist");
        assert_eq!(
            expectations
                .get("granularity")
                .and_then(|value| value.as_str()),
            Some("30m")
        );
        assert_eq!(
            expectations
                .get("palette")
                .and_then(|value| value.as_array())
                .map(|list| list.len()),
            Some(COLOR_PALETTE.len())
        );
    }

    #[test]
    fn system_prompt_states_window_and_schema() {
        let prompt = schedule_system_prompt();
        assert!(prompt.contains("03:30"));
        assert!(prompt.contains("22:00"));
        assert!(prompt.contains("weeklyGoals"));

        // The schema example carries a literal `"#hexcode"`; everything after
        // it must still be part of the prompt.
        let hex_pos = prompt.find("\"#hexcode\"").expect("color example present");
        let tail = &prompt[hex_pos..];
        assert!(tail.contains("targetMinutes"));
        assert!(prompt.trim_end().ends_with('}'));
    }
}
