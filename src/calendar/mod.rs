//! Calendar domain: the day/night clock.
//!
//! Responsible for:
//! - Advancing normalised clock time (0.0 midnight, 0.5 noon) from frame time
//! - Classifying Day (06:00–17:59) and Night
//! - Sending TimeOfDayChangedEvent when the phase flips
//!
//! Cultivation reads `DayClock::time_of_day` to fill TimeOfDay conditions.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::*;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayClock {
    /// Real seconds for a full 24h cycle. Zero or less freezes the clock.
    pub day_length_secs: f32,
    /// Normalised time of day in [0, 1).
    time: f32,
}

impl Default for DayClock {
    fn default() -> Self {
        Self::new(DEFAULT_DAY_LENGTH_SECS, DEFAULT_START_TIME)
    }
}

impl DayClock {
    pub fn new(day_length_secs: f32, start_time: f32) -> Self {
        let mut clock = Self {
            day_length_secs,
            time: 0.0,
        };
        clock.set_time(start_time);
        clock
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advances by `dt` real seconds, wrapping at midnight.
    /// Returns the new phase if it flipped.
    pub fn advance(&mut self, dt: f32) -> Option<TimeOfDay> {
        if self.day_length_secs <= 0.0 || dt <= 0.0 {
            return None;
        }
        let before = self.time_of_day();
        self.time = (self.time + dt / self.day_length_secs).rem_euclid(1.0);
        let after = self.time_of_day();
        (before != after).then_some(after)
    }

    /// Jumps to a normalised time, clamped to [0, 1]. 1.0 wraps to midnight.
    pub fn set_time(&mut self, normalized: f32) -> Option<TimeOfDay> {
        let before = self.time_of_day();
        let t = if normalized.is_nan() { 0.0 } else { normalized.clamp(0.0, 1.0) };
        self.time = if t >= 1.0 { 0.0 } else { t };
        let after = self.time_of_day();
        (before != after).then_some(after)
    }

    pub fn set_day(&mut self) -> Option<TimeOfDay> {
        self.set_time(0.5)
    }

    pub fn set_night(&mut self) -> Option<TimeOfDay> {
        self.set_time(0.0)
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        if (0.25..0.75).contains(&self.time) {
            TimeOfDay::Day
        } else {
            TimeOfDay::Night
        }
    }

    pub fn is_day(&self) -> bool {
        self.time_of_day() == TimeOfDay::Day
    }

    pub fn hour(&self) -> u32 {
        ((self.time * 24.0).floor() as u32).min(23)
    }

    pub fn minute(&self) -> u32 {
        let hours = self.time * 24.0;
        (((hours - hours.floor()) * 60.0).floor() as u32).min(59)
    }

    /// "HH:MM"
    pub fn formatted(&self) -> String {
        format!("{:02}:{:02}", self.hour(), self.minute())
    }
}

pub struct CalendarPlugin;

impl Plugin for CalendarPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            tick_clock
                .in_set(CoreSet::Clock)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

pub fn tick_clock(
    time: Res<Time>,
    mut clock: ResMut<DayClock>,
    mut changed: EventWriter<TimeOfDayChangedEvent>,
) {
    if let Some(time_of_day) = clock.advance(time.delta_secs()) {
        info!("[Calendar] {} falls at {}", time_of_day.as_str(), clock.formatted());
        changed.send(TimeOfDayChangedEvent { time_of_day });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_starts_at_noon() {
        let clock = DayClock::default();
        assert_eq!(clock.formatted(), "12:00");
        assert!(clock.is_day());
    }

    #[test]
    fn test_day_night_boundaries() {
        let mut clock = DayClock::new(600.0, 0.0);
        assert_eq!(clock.time_of_day(), TimeOfDay::Night);
        clock.set_time(0.25);
        assert_eq!(clock.time_of_day(), TimeOfDay::Day);
        clock.set_time(0.749);
        assert_eq!(clock.time_of_day(), TimeOfDay::Day);
        clock.set_time(0.75);
        assert_eq!(clock.time_of_day(), TimeOfDay::Night);
    }

    #[test]
    fn test_advance_wraps_and_reports_flip() {
        let mut clock = DayClock::new(100.0, 0.7);
        // 0.7 -> 0.8 crosses into night
        assert_eq!(clock.advance(10.0), Some(TimeOfDay::Night));
        // 0.8 -> 0.1 wraps past midnight, still night
        assert_eq!(clock.advance(30.0), None);
        assert!((clock.time() - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_frozen_clock_does_not_move() {
        let mut clock = DayClock::new(0.0, 0.3);
        assert_eq!(clock.advance(1000.0), None);
        assert_eq!(clock.time(), 0.3);
    }

    #[test]
    fn test_set_night_and_day() {
        let mut clock = DayClock::default();
        assert_eq!(clock.set_night(), Some(TimeOfDay::Night));
        assert_eq!(clock.formatted(), "00:00");
        assert_eq!(clock.set_day(), Some(TimeOfDay::Day));
        assert_eq!(clock.set_time(2.0), Some(TimeOfDay::Night));
        assert_eq!(clock.time(), 0.0);
    }

    #[test]
    fn test_formatted_time() {
        let clock = DayClock::new(600.0, 0.5625);
        assert_eq!(clock.formatted(), "13:30");
    }
}
