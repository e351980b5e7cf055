use chrono::{DateTime, FixedOffset, NaiveTime};

use crate::error::AppResult;
use crate::models::place::CanonicalPlace;
use crate::models::preferences::PlannerPreferences;
use crate::services::plan_utils;

/// Fallback for place pairs absent from the tables, and the defensive answer
/// for unresolved endpoints.
pub const DEFAULT_TRAVEL_MINUTES: i64 = 30;

type PairMinutes = (CanonicalPlace, CanonicalPlace, i64);

/// Off-peak durations between the known places, directed. Mirrored in
/// practice, but lookups never assume symmetry.
const BASE_TABLE: &[PairMinutes] = &[
    (CanonicalPlace::KfarSaba, CanonicalPlace::BeitDagan, 30),
    (CanonicalPlace::KfarSaba, CanonicalPlace::RishonLezion, 35),
    (CanonicalPlace::KfarSaba, CanonicalPlace::NirTzvi, 35),
    (CanonicalPlace::BeitDagan, CanonicalPlace::KfarSaba, 30),
    (CanonicalPlace::BeitDagan, CanonicalPlace::RishonLezion, 5),
    (CanonicalPlace::BeitDagan, CanonicalPlace::NirTzvi, 15),
    (CanonicalPlace::RishonLezion, CanonicalPlace::KfarSaba, 35),
    (CanonicalPlace::RishonLezion, CanonicalPlace::BeitDagan, 5),
    (CanonicalPlace::RishonLezion, CanonicalPlace::NirTzvi, 15),
    (CanonicalPlace::NirTzvi, CanonicalPlace::KfarSaba, 35),
    (CanonicalPlace::NirTzvi, CanonicalPlace::BeitDagan, 15),
    (CanonicalPlace::NirTzvi, CanonicalPlace::RishonLezion, 15),
];

/// Rush-hour durations where congestion actually changes the number. Pairs
/// not listed here fall back to base × rush multiplier.
const RUSH_OVERRIDE_TABLE: &[PairMinutes] = &[
    (CanonicalPlace::KfarSaba, CanonicalPlace::BeitDagan, 45),
    (CanonicalPlace::KfarSaba, CanonicalPlace::RishonLezion, 50),
    (CanonicalPlace::KfarSaba, CanonicalPlace::NirTzvi, 45),
    (CanonicalPlace::BeitDagan, CanonicalPlace::KfarSaba, 45),
    (CanonicalPlace::BeitDagan, CanonicalPlace::RishonLezion, 5),
    (CanonicalPlace::BeitDagan, CanonicalPlace::NirTzvi, 15),
    (CanonicalPlace::RishonLezion, CanonicalPlace::KfarSaba, 50),
    (CanonicalPlace::RishonLezion, CanonicalPlace::BeitDagan, 5),
    (CanonicalPlace::RishonLezion, CanonicalPlace::NirTzvi, 15),
    (CanonicalPlace::NirTzvi, CanonicalPlace::KfarSaba, 45),
    (CanonicalPlace::NirTzvi, CanonicalPlace::BeitDagan, 15),
    (CanonicalPlace::NirTzvi, CanonicalPlace::RishonLezion, 15),
];

/// The pairwise duration data the estimator reads. Injectable so tests (or a
/// future data source) can swap the tables without touching the logic.
#[derive(Debug, Clone)]
pub struct TravelMatrix {
    base: Vec<PairMinutes>,
    rush_override: Vec<PairMinutes>,
}

impl Default for TravelMatrix {
    fn default() -> Self {
        Self {
            base: BASE_TABLE.to_vec(),
            rush_override: RUSH_OVERRIDE_TABLE.to_vec(),
        }
    }
}

impl TravelMatrix {
    pub fn new(base: Vec<PairMinutes>, rush_override: Vec<PairMinutes>) -> Self {
        Self {
            base,
            rush_override,
        }
    }

    fn base_minutes(&self, from: CanonicalPlace, to: CanonicalPlace) -> Option<i64> {
        lookup(&self.base, from, to)
    }

    fn rush_minutes(&self, from: CanonicalPlace, to: CanonicalPlace) -> Option<i64> {
        lookup(&self.rush_override, from, to)
    }
}

fn lookup(table: &[PairMinutes], from: CanonicalPlace, to: CanonicalPlace) -> Option<i64> {
    table
        .iter()
        .find(|(f, t, _)| *f == from && *t == to)
        .map(|(_, _, minutes)| *minutes)
}

/// Car travel estimates between canonical places. Pure: the answer depends on
/// the endpoints and the departure's minute of day, never on the calendar
/// date or any hidden state.
#[derive(Debug, Clone)]
pub struct TravelTimeEstimator {
    matrix: TravelMatrix,
    morning: (NaiveTime, NaiveTime),
    evening: (NaiveTime, NaiveTime),
    rush_multiplier: f64,
}

impl TravelTimeEstimator {
    pub fn new(preferences: &PlannerPreferences) -> AppResult<Self> {
        Self::with_matrix(preferences, TravelMatrix::default())
    }

    pub fn with_matrix(preferences: &PlannerPreferences, matrix: TravelMatrix) -> AppResult<Self> {
        let morning = preferences.rush_hours.morning.resolve()?;
        let evening = preferences.rush_hours.evening.resolve()?;
        Ok(Self {
            matrix,
            morning,
            evening,
            rush_multiplier: preferences.traffic_multipliers.rush,
        })
    }

    /// Whether the departure's clock time falls in a rush window. Both window
    /// bounds are inclusive.
    pub fn is_rush_hour(&self, departure: DateTime<FixedOffset>) -> bool {
        let time = plan_utils::clock_time_of(departure);
        (time >= self.morning.0 && time <= self.morning.1)
            || (time >= self.evening.0 && time <= self.evening.1)
    }

    pub fn estimate(
        &self,
        from: CanonicalPlace,
        to: CanonicalPlace,
        departure: DateTime<FixedOffset>,
    ) -> i64 {
        if from == to {
            return 0;
        }
        if !from.is_resolved() || !to.is_resolved() {
            return DEFAULT_TRAVEL_MINUTES;
        }

        let base = match self.matrix.base_minutes(from, to) {
            Some(minutes) => minutes,
            None => return DEFAULT_TRAVEL_MINUTES,
        };

        if !self.is_rush_hour(departure) {
            return base;
        }

        match self.matrix.rush_minutes(from, to) {
            Some(minutes) => minutes,
            None => ((base as f64) * self.rush_multiplier).round() as i64,
        }
    }
}
