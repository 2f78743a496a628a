pub mod schedule;

pub use schedule::{
    Activity, CategoryInfo, EditableActivity, ScheduleResponse, WeeklyGoal, WEEKDAYS,
};
