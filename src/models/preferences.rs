use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::services::plan_utils;

pub const DEFAULT_MORNING_RUSH_START: &str = "07:30";
pub const DEFAULT_MORNING_RUSH_END: &str = "10:00";
pub const DEFAULT_EVENING_RUSH_START: &str = "15:00";
pub const DEFAULT_EVENING_RUSH_END: &str = "19:00";

pub const DEFAULT_RUSH_MULTIPLIER: f64 = 1.5;
pub const DEFAULT_HEAVY_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_NORMAL_MULTIPLIER: f64 = 1.0;

pub const DEFAULT_MAX_DAILY_DRIVING_MINUTES: i64 = 180;
pub const DEFAULT_MAX_WEEKLY_DRIVING_MINUTES: i64 = 5 * DEFAULT_MAX_DAILY_DRIVING_MINUTES;
pub const DEFAULT_BUFFER_MINUTES: i64 = 15;
pub const DEFAULT_LONG_DRIVE_THRESHOLD_MINUTES: i64 = 90;

/// One rush-hour clock window, bounds inclusive. Times are "HH:MM" strings as
/// supplied by the settings layer and are parsed where they are used.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RushWindow {
    pub start: String,
    pub end: String,
}

impl RushWindow {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn resolve(&self) -> AppResult<(NaiveTime, NaiveTime)> {
        let start = plan_utils::parse_clock_time(&self.start)?;
        let end = plan_utils::parse_clock_time(&self.end)?;
        if end < start {
            return Err(AppError::validation_with_details(
                "rush window ends before it starts",
                json!({ "start": self.start, "end": self.end }),
            ));
        }
        Ok((start, end))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RushHours {
    #[serde(default = "default_morning_window")]
    pub morning: RushWindow,
    #[serde(default = "default_evening_window")]
    pub evening: RushWindow,
}

impl Default for RushHours {
    fn default() -> Self {
        Self {
            morning: default_morning_window(),
            evening: default_evening_window(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrafficMultipliers {
    #[serde(default = "default_rush_multiplier")]
    pub rush: f64,
    #[serde(default = "default_heavy_multiplier")]
    pub heavy: f64,
    #[serde(default = "default_normal_multiplier")]
    pub normal: f64,
}

impl Default for TrafficMultipliers {
    fn default() -> Self {
        Self {
            rush: DEFAULT_RUSH_MULTIPLIER,
            heavy: DEFAULT_HEAVY_MULTIPLIER,
            normal: DEFAULT_NORMAL_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SleepLocationPreference {
    Home,
    Partner,
    #[default]
    Optimal,
}

/// Planner configuration as supplied by the app settings. Every field has a
/// documented default so a partial settings payload still deserializes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlannerPreferences {
    #[serde(default)]
    pub rush_hours: RushHours,
    #[serde(default)]
    pub traffic_multipliers: TrafficMultipliers,
    #[serde(default = "default_max_daily_driving_minutes")]
    pub max_daily_driving_minutes: i64,
    #[serde(default = "default_max_weekly_driving_minutes")]
    pub max_weekly_driving_minutes: i64,
    #[serde(default = "default_buffer_minutes")]
    pub buffer_minutes: i64,
    #[serde(default = "default_long_drive_threshold_minutes")]
    pub long_drive_threshold_minutes: i64,
    #[serde(default)]
    pub preferred_sleep_location: SleepLocationPreference,
    #[serde(default)]
    pub avoid_rush_hour: bool,
}

impl Default for PlannerPreferences {
    fn default() -> Self {
        Self {
            rush_hours: RushHours::default(),
            traffic_multipliers: TrafficMultipliers::default(),
            max_daily_driving_minutes: DEFAULT_MAX_DAILY_DRIVING_MINUTES,
            max_weekly_driving_minutes: DEFAULT_MAX_WEEKLY_DRIVING_MINUTES,
            buffer_minutes: DEFAULT_BUFFER_MINUTES,
            long_drive_threshold_minutes: DEFAULT_LONG_DRIVE_THRESHOLD_MINUTES,
            preferred_sleep_location: SleepLocationPreference::Optimal,
            avoid_rush_hour: false,
        }
    }
}

impl PlannerPreferences {
    /// Rejects malformed preferences up front so planning never has to coerce
    /// nonsense values silently.
    pub fn validate(&self) -> AppResult<()> {
        self.rush_hours.morning.resolve()?;
        self.rush_hours.evening.resolve()?;

        ensure_positive_multiplier("rush", self.traffic_multipliers.rush)?;
        ensure_positive_multiplier("heavy", self.traffic_multipliers.heavy)?;
        ensure_positive_multiplier("normal", self.traffic_multipliers.normal)?;

        ensure_non_negative_minutes("maxDailyDrivingMinutes", self.max_daily_driving_minutes)?;
        ensure_non_negative_minutes("maxWeeklyDrivingMinutes", self.max_weekly_driving_minutes)?;
        ensure_non_negative_minutes("bufferMinutes", self.buffer_minutes)?;
        ensure_non_negative_minutes(
            "longDriveThresholdMinutes",
            self.long_drive_threshold_minutes,
        )?;

        Ok(())
    }
}

fn ensure_positive_multiplier(name: &str, value: f64) -> AppResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AppError::validation_with_details(
            "traffic multiplier must be positive",
            json!({ "field": name, "value": value }),
        ))
    }
}

fn ensure_non_negative_minutes(name: &str, value: i64) -> AppResult<()> {
    if value >= 0 {
        Ok(())
    } else {
        Err(AppError::validation_with_details(
            "duration preference must not be negative",
            json!({ "field": name, "value": value }),
        ))
    }
}

fn default_morning_window() -> RushWindow {
    RushWindow::new(DEFAULT_MORNING_RUSH_START, DEFAULT_MORNING_RUSH_END)
}

fn default_evening_window() -> RushWindow {
    RushWindow::new(DEFAULT_EVENING_RUSH_START, DEFAULT_EVENING_RUSH_END)
}

fn default_rush_multiplier() -> f64 {
    DEFAULT_RUSH_MULTIPLIER
}

fn default_heavy_multiplier() -> f64 {
    DEFAULT_HEAVY_MULTIPLIER
}

fn default_normal_multiplier() -> f64 {
    DEFAULT_NORMAL_MULTIPLIER
}

fn default_max_daily_driving_minutes() -> i64 {
    DEFAULT_MAX_DAILY_DRIVING_MINUTES
}

fn default_max_weekly_driving_minutes() -> i64 {
    DEFAULT_MAX_WEEKLY_DRIVING_MINUTES
}

fn default_buffer_minutes() -> i64 {
    DEFAULT_BUFFER_MINUTES
}

fn default_long_drive_threshold_minutes() -> i64 {
    DEFAULT_LONG_DRIVE_THRESHOLD_MINUTES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_an_empty_settings_payload() {
        let preferences: PlannerPreferences = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(preferences, PlannerPreferences::default());
        assert_eq!(preferences.buffer_minutes, 15);
        assert_eq!(preferences.max_weekly_driving_minutes, 900);
        preferences.validate().expect("defaults validate");
    }

    #[test]
    fn partial_payload_keeps_remaining_defaults() {
        let preferences: PlannerPreferences =
            serde_json::from_str(r#"{"bufferMinutes": 5, "avoidRushHour": true}"#)
                .expect("deserialize");
        assert_eq!(preferences.buffer_minutes, 5);
        assert!(preferences.avoid_rush_hour);
        assert_eq!(
            preferences.long_drive_threshold_minutes,
            DEFAULT_LONG_DRIVE_THRESHOLD_MINUTES
        );
    }

    #[test]
    fn negative_duration_is_rejected() {
        let preferences = PlannerPreferences {
            buffer_minutes: -5,
            ..PlannerPreferences::default()
        };
        let error = preferences.validate().expect_err("negative buffer");
        let details = error.validation_details().expect("details");
        assert_eq!(details["field"], "bufferMinutes");
    }

    #[test]
    fn inverted_rush_window_is_rejected() {
        let preferences = PlannerPreferences {
            rush_hours: RushHours {
                morning: RushWindow::new("10:00", "07:30"),
                evening: default_evening_window(),
            },
            ..PlannerPreferences::default()
        };
        assert!(preferences.validate().is_err());
    }
}
