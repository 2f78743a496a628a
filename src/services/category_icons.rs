//! Category presentation helpers: emoji icons, display names, and the legend
//! derived from a schedule's activities.

use std::collections::HashSet;

use crate::models::{Activity, CategoryInfo};

const DEFAULT_ICON: &str = "📌";

/// Ordered (pattern, icon) table. Exact matches win; otherwise the first
/// pattern contained in the category name applies, so more specific entries
/// must precede broader ones (e.g. "guitar" before "hobby").
const ICON_TABLE: &[(&str, &str)] = &[
    ("gym", "💪"),
    ("workout", "💪"),
    ("exercise", "💪"),
    ("fitness", "💪"),
    ("learning", "🧠"),
    ("study", "📚"),
    ("work", "💻"),
    ("office", "💻"),
    ("job", "💼"),
    ("family", "👨‍👩‍👧"),
    ("sleep", "😴"),
    ("rest", "😴"),
    ("breakfast", "🍳"),
    ("lunch", "🍽️"),
    ("dinner", "🍽️"),
    ("meal", "🍽️"),
    ("commute", "🚗"),
    ("travel", "✈️"),
    ("guitar", "🎸"),
    ("music", "🎵"),
    ("hobby", "🎨"),
    ("project", "🚀"),
    ("meditation", "🧘"),
    ("yoga", "🧘"),
    ("reading", "📖"),
    ("writing", "✍️"),
    ("podcast", "🎙️"),
    ("meeting", "🤝"),
    ("cooking", "👨‍🍳"),
    ("personal", "✨"),
];

pub fn icon_for(category: &str) -> &'static str {
    let needle = category.trim().to_lowercase();

    for (pattern, icon) in ICON_TABLE {
        if needle == *pattern {
            return icon;
        }
    }
    for (pattern, icon) in ICON_TABLE {
        if needle.contains(pattern) {
            return icon;
        }
    }
    DEFAULT_ICON
}

/// Render a category token for display: "job-apps" -> "Job Apps".
pub fn display_name(category: &str) -> String {
    category
        .split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the legend for a set of activities: one entry per category in first
/// appearance order, carrying the first seen color and the matched icon.
pub fn legend(activities: &[Activity]) -> Vec<CategoryInfo> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for activity in activities {
        if seen.insert(activity.category.clone()) {
            entries.push(CategoryInfo {
                name: activity.category.clone(),
                color: activity.color.clone(),
                icon: Some(icon_for(&activity.category).to_string()),
            });
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(category: &str, color: &str) -> Activity {
        Activity {
            id: format!("{category}-1"),
            name: category.to_string(),
            category: category.to_string(),
            days: vec!["Monday".to_string()],
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
            color: color.to_string(),
        }
    }

    #[test]
    fn exact_match_beats_substring() {
        // "work" exactly is the laptop, even though "workout" also contains it.
        assert_eq!(icon_for("work"), "💻");
        assert_eq!(icon_for("workout"), "💪");
    }

    #[test]
    fn substring_match_covers_compound_categories() {
        assert_eq!(icon_for("side-project"), "🚀");
        assert_eq!(icon_for("job-applications"), "💼");
        assert_eq!(icon_for("guitar-practice"), "🎸");
    }

    #[test]
    fn unknown_category_gets_default() {
        assert_eq!(icon_for("gardening"), DEFAULT_ICON);
    }

    #[test]
    fn display_names_capitalize_tokens() {
        assert_eq!(display_name("job-apps"), "Job Apps");
        assert_eq!(display_name("gym"), "Gym");
        assert_eq!(display_name("family_time"), "Family Time");
    }

    #[test]
    fn legend_is_deduplicated_in_first_appearance_order() {
        let activities = vec![
            activity("work", "#dbeafe"),
            activity("gym", "#d1fae5"),
            activity("work", "#fecaca"),
        ];

        let legend = legend(&activities);
        assert_eq!(legend.len(), 2);
        assert_eq!(legend[0].name, "work");
        assert_eq!(legend[0].color, "#dbeafe"); // first seen color wins
        assert_eq!(legend[0].icon.as_deref(), Some("💻"));
        assert_eq!(legend[1].name, "gym");
    }
}
