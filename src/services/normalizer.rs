//! Bidirectional transform between the multi-day [`Activity`] representation
//! and the per-day [`EditableActivity`] instances the edit UI operates on.

use std::collections::HashMap;

use crate::models::{Activity, EditableActivity};

/// Expand each activity into one editable instance per listed day, preserving
/// day order. Instance ids are a deterministic composite of the source id,
/// the day, and the activity's position, so the same (activity, day) pair
/// yields the same instance id across re-normalization and activities that
/// share an id/day pair still cannot collide.
pub fn normalize(activities: &[Activity]) -> Vec<EditableActivity> {
    let mut instances = Vec::new();

    for (index, activity) in activities.iter().enumerate() {
        let original_id = if activity.id.is_empty() {
            format!("activity-{index}")
        } else {
            activity.id.clone()
        };

        for day in &activity.days {
            instances.push(EditableActivity {
                id: format!("{original_id}-{day}-{index}"),
                original_id: original_id.clone(),
                name: activity.name.clone(),
                category: activity.category.clone(),
                day: day.clone(),
                start_time: activity.start_time.clone(),
                end_time: activity.end_time.clone(),
                color: activity.color.clone(),
            });
        }
    }

    instances
}

/// Fold per-day instances back into multi-day activities.
///
/// Instances merge only when they agree on (original id, start, end, name):
/// an instance the user moved to a different time splits into its own
/// activity instead of re-merging with siblings that kept the old time.
/// Two distinct source activities that happen to collide on the whole key
/// would merge here; that ambiguity is inherent to the content-based key and
/// is prevented upstream by unique activity ids.
pub fn denormalize(editables: &[EditableActivity]) -> Vec<Activity> {
    let mut groups: Vec<Activity> = Vec::new();
    let mut index_by_key: HashMap<(String, String, String, String), usize> = HashMap::new();

    for editable in editables {
        let key = (
            editable.original_id.clone(),
            editable.start_time.clone(),
            editable.end_time.clone(),
            editable.name.clone(),
        );

        match index_by_key.get(&key) {
            Some(&slot) => {
                let days = &mut groups[slot].days;
                if !days.contains(&editable.day) {
                    days.push(editable.day.clone());
                }
            }
            None => {
                index_by_key.insert(key, groups.len());
                // Color and category come from the first member; divergence
                // within a group is not expected.
                groups.push(Activity {
                    id: editable.original_id.clone(),
                    name: editable.name.clone(),
                    category: editable.category.clone(),
                    days: vec![editable.day.clone()],
                    start_time: editable.start_time.clone(),
                    end_time: editable.end_time.clone(),
                    color: editable.color.clone(),
                });
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(id: &str, name: &str, days: &[&str], start: &str, end: &str) -> Activity {
        Activity {
            id: id.to_string(),
            name: name.to_string(),
            category: "general".to_string(),
            days: days.iter().map(|d| d.to_string()).collect(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            color: "#fef3c7".to_string(),
        }
    }

    #[test]
    fn normalize_emits_one_instance_per_day() {
        let activities = vec![activity("a1", "Gym", &["Monday", "Wednesday"], "07:00", "08:00")];
        let instances = normalize(&activities);

        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].day, "Monday");
        assert_eq!(instances[1].day, "Wednesday");
        assert!(instances.iter().all(|i| i.original_id == "a1"));
        assert_ne!(instances[0].id, instances[1].id);
    }

    #[test]
    fn instance_ids_are_stable_across_renormalization() {
        let activities = vec![activity("a1", "Gym", &["Monday"], "07:00", "08:00")];
        let first = normalize(&activities);
        let second = normalize(&activities);
        assert_eq!(first[0].id, second[0].id);
    }

    #[test]
    fn normalize_synthesizes_id_when_absent() {
        let mut base = activity("", "Gym", &["Monday"], "07:00", "08:00");
        base.id = String::new();
        let instances = normalize(&[base]);
        assert_eq!(instances[0].original_id, "activity-0");
    }

    #[test]
    fn round_trip_preserves_activities() {
        let activities = vec![
            activity("a1", "Gym", &["Monday", "Wednesday", "Friday"], "07:00", "08:00"),
            activity("a2", "Sleep", &["Monday", "Tuesday"], "21:30", "03:30"),
        ];

        let restored = denormalize(&normalize(&activities));
        assert_eq!(restored, activities);
    }

    #[test]
    fn moved_instance_splits_into_own_activity() {
        let activities = vec![activity("a1", "Gym", &["Monday", "Wednesday"], "07:00", "08:00")];
        let mut instances = normalize(&activities);

        // Move Wednesday's session an hour later.
        instances[1].start_time = "08:00".to_string();
        instances[1].end_time = "09:00".to_string();

        let merged = denormalize(&instances);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].days, vec!["Monday"]);
        assert_eq!(merged[1].days, vec!["Wednesday"]);
        assert_eq!(merged[1].start_time, "08:00");
    }

    #[test]
    fn duplicate_days_fold_once() {
        let activities = vec![activity("a1", "Gym", &["Monday", "Monday"], "07:00", "08:00")];
        let merged = denormalize(&normalize(&activities));
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].days, vec!["Monday"]);
    }
}
