use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::event::Event;
use crate::models::place::CanonicalPlace;
use crate::models::transport::TransportComparison;

/// One drive between two consecutive same-day events. Legs exist only where
/// both endpoints resolved to known places; unresolved pairs are omitted, not
/// zero-filled, so daily totals only count real estimates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TravelLeg {
    pub from_title: String,
    pub to_title: String,
    pub from_place: CanonicalPlace,
    pub to_place: CanonicalPlace,
    pub departure_at: String,
    pub duration_minutes: i64,
    pub is_rush_hour: bool,
    #[serde(default)]
    pub transport: Option<TransportComparison>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SleepDecision {
    pub location: CanonicalPlace,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Warning,
    Suggestion,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DayAnalysis {
    pub is_busy: bool,
    pub is_long_driving_day: bool,
    pub has_rush_hour_travel: bool,
    pub has_long_drives: bool,
    pub total_event_minutes: i64,
}

/// Why a single day could not be planned. The rest of the week is unaffected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanningFailure {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    pub date: NaiveDate,
    /// Sorted ascending by start; ties keep their input order.
    pub events: Vec<Event>,
    pub travel_legs: Vec<TravelLeg>,
    pub total_driving_minutes: i64,
    pub analysis: DayAnalysis,
    pub sleep_decision: SleepDecision,
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub planning_error: Option<PlanningFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeekPlan {
    /// The Sunday the week starts on.
    pub week_of: NaiveDate,
    pub daily_plans: Vec<DayPlan>,
    pub total_driving_minutes: i64,
    pub week_suggestions: Vec<Suggestion>,
}
