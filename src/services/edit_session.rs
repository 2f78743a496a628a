//! Mutable editing state for a generated schedule.
//!
//! A session expands the schedule into per-day instances, applies edits
//! (move, drag, resize, add, delete), and folds the result back into the
//! multi-day shape on demand. Rapid successive edits coalesce into a single
//! snapshot: [`EditSession::snapshot_if_due`] only yields once the change
//! window has elapsed, and [`EditSession::flush`] always yields pending
//! changes so the final state is never dropped.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{EditableActivity, ScheduleResponse, WeeklyGoal, WEEKDAYS};
use crate::services::normalizer::{denormalize, normalize};
use crate::services::time_grid::{
    minutes_to_time, pixels_to_minute_delta, time_to_minutes, GRID_END_MINUTES,
    GRID_START_MINUTES, MINUTES_PER_ROW,
};

/// Edits closer together than this collapse into one snapshot.
pub const SNAPSHOT_WINDOW: Duration = Duration::from_millis(500);

pub struct EditSession {
    instances: Vec<EditableActivity>,
    baseline: Vec<EditableActivity>,
    weekly_goals: Vec<WeeklyGoal>,
    last_edit: Option<Instant>,
    dirty: bool,
}

impl EditSession {
    pub fn start(schedule: &ScheduleResponse) -> Self {
        let instances = normalize(&schedule.activities);
        Self {
            baseline: instances.clone(),
            instances,
            weekly_goals: schedule.weekly_goals.clone(),
            last_edit: None,
            dirty: false,
        }
    }

    pub fn instances(&self) -> &[EditableActivity] {
        &self.instances
    }

    /// Move an instance to another weekday, keeping its times.
    pub fn move_activity(&mut self, instance_id: &str, new_day: &str) -> AppResult<()> {
        if !WEEKDAYS.contains(&new_day) {
            return Err(AppError::input(format!("unknown weekday: {new_day:?}")));
        }

        let instance = self.find_mut(instance_id)?;
        instance.day = new_day.to_string();
        self.mark_edited();
        Ok(())
    }

    /// Shift an instance vertically by a pixel drag offset, snapping to
    /// 30-minute steps and keeping the span inside the visible window.
    /// Overnight instances do not shift; their duration is not grid-local.
    pub fn shift_activity(&mut self, instance_id: &str, delta_px: i32) -> AppResult<()> {
        let delta = pixels_to_minute_delta(delta_px);
        if delta == 0 {
            return Ok(());
        }

        let instance = self.find_mut(instance_id)?;
        let start = time_to_minutes(&instance.start_time)?;
        let end = time_to_minutes(&instance.end_time)?;
        if end < start {
            return Ok(());
        }

        let duration = end - start;
        let max_start = (GRID_END_MINUTES as i64 - duration as i64).max(GRID_START_MINUTES as i64);
        let shifted =
            (start as i64 + delta as i64).clamp(GRID_START_MINUTES as i64, max_start) as u32;

        instance.start_time = minutes_to_time(shifted);
        instance.end_time = minutes_to_time(shifted + duration);
        self.mark_edited();
        Ok(())
    }

    /// Set new start/end times for an instance. Times must be well-formed and
    /// inside the visible window; spans shorter than one slot grow to the
    /// 30-minute minimum.
    pub fn resize_activity(
        &mut self,
        instance_id: &str,
        new_start: &str,
        new_end: &str,
    ) -> AppResult<()> {
        let start = time_to_minutes(new_start)?;
        let mut end = time_to_minutes(new_end)?;

        if !(GRID_START_MINUTES..=GRID_END_MINUTES).contains(&start)
            || !(GRID_START_MINUTES..=GRID_END_MINUTES).contains(&end)
        {
            return Err(AppError::input(
                "times must be between 03:30 and 22:00".to_string(),
            ));
        }
        if end <= start {
            end = (start + MINUTES_PER_ROW).min(GRID_END_MINUTES);
        } else if end - start < MINUTES_PER_ROW {
            end = (start + MINUTES_PER_ROW).min(GRID_END_MINUTES);
        }
        if end == start {
            return Err(AppError::input(
                "activity does not fit inside the visible window".to_string(),
            ));
        }

        let instance = self.find_mut(instance_id)?;
        instance.start_time = minutes_to_time(start);
        instance.end_time = minutes_to_time(end);
        self.mark_edited();
        Ok(())
    }

    pub fn add_activity(&mut self, instance: EditableActivity) -> AppResult<()> {
        if self.instances.iter().any(|i| i.id == instance.id) {
            return Err(AppError::input(format!(
                "duplicate instance id: {}",
                instance.id
            )));
        }
        if !WEEKDAYS.contains(&instance.day.as_str()) {
            return Err(AppError::input(format!("unknown weekday: {:?}", instance.day)));
        }
        time_to_minutes(&instance.start_time)?;
        time_to_minutes(&instance.end_time)?;

        self.instances.push(instance);
        self.mark_edited();
        Ok(())
    }

    pub fn update_activity(&mut self, instance: EditableActivity) -> AppResult<()> {
        time_to_minutes(&instance.start_time)?;
        time_to_minutes(&instance.end_time)?;
        let slot = self.find_mut(&instance.id)?;
        *slot = instance;
        self.mark_edited();
        Ok(())
    }

    pub fn delete_activity(&mut self, instance_id: &str) -> AppResult<()> {
        let before = self.instances.len();
        self.instances.retain(|i| i.id != instance_id);
        if self.instances.len() == before {
            return Err(AppError::input(format!(
                "no activity instance with id {instance_id:?}"
            )));
        }
        self.mark_edited();
        Ok(())
    }

    /// Discard all edits and return to the schedule the session started from.
    pub fn reset(&mut self) {
        self.instances = self.baseline.clone();
        self.mark_edited();
    }

    /// Fold the current instances back into the multi-day schedule shape.
    pub fn merged(&self) -> ScheduleResponse {
        ScheduleResponse {
            activities: denormalize(&self.instances),
            weekly_goals: self.weekly_goals.clone(),
        }
    }

    /// Yield a snapshot if there are unsaved edits and the coalescing window
    /// has passed since the most recent one.
    pub fn snapshot_if_due(&mut self) -> Option<ScheduleResponse> {
        match self.last_edit {
            Some(at) if self.dirty && at.elapsed() >= SNAPSHOT_WINDOW => self.take_snapshot(),
            _ => None,
        }
    }

    /// Yield any unsaved edits regardless of the window. Call on session end
    /// so a burst of final edits is not lost to coalescing.
    pub fn flush(&mut self) -> Option<ScheduleResponse> {
        if self.dirty {
            self.take_snapshot()
        } else {
            None
        }
    }

    fn take_snapshot(&mut self) -> Option<ScheduleResponse> {
        self.dirty = false;
        debug!(target: "app::edit", instances = self.instances.len(), "snapshotting edit session");
        Some(self.merged())
    }

    fn mark_edited(&mut self) {
        self.dirty = true;
        self.last_edit = Some(Instant::now());
    }

    fn find_mut(&mut self, instance_id: &str) -> AppResult<&mut EditableActivity> {
        self.instances
            .iter_mut()
            .find(|i| i.id == instance_id)
            .ok_or_else(|| {
                AppError::input(format!("no activity instance with id {instance_id:?}"))
            })
    }
}
