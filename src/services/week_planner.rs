use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::event::Event;
use crate::models::place::CanonicalPlace;
use crate::models::plan::{DayPlan, PlanningFailure, Severity, Suggestion, WeekPlan};
use crate::models::preferences::PlannerPreferences;
use crate::services::day_planner::{degraded_day_plan, DayPlanBuilder};
use crate::services::location_resolver;
use crate::services::plan_utils;

const DAYS_PER_WEEK: i64 = 7;
/// More events than this at one place across the week triggers the
/// consolidation suggestion.
const PLACE_CLUSTER_EVENT_COUNT: usize = 2;
/// A day with more events than this counts as busy for the rest-day check.
const REST_DAY_EVENT_COUNT: usize = 2;
const REST_DAY_BUSY_DAY_LIMIT: usize = 5;

/// Resolved places considered for the clustering suggestion, in the order
/// suggestions are emitted.
const CLUSTER_PLACES: &[CanonicalPlace] = &[
    CanonicalPlace::KfarSaba,
    CanonicalPlace::BeitDagan,
    CanonicalPlace::RishonLezion,
    CanonicalPlace::NirTzvi,
    CanonicalPlace::HodHasharon,
    CanonicalPlace::TelAviv,
];

/// The Sunday at or before the reference date; weeks run Sunday to Saturday.
pub fn week_start_for(reference: NaiveDate) -> NaiveDate {
    reference - Duration::days(reference.weekday().num_days_from_sunday() as i64)
}

/// Drives the day planner across a 7-day window and derives the week-level
/// totals and suggestions. Pure over its inputs: the same event snapshot and
/// preferences always produce a bit-identical plan.
#[derive(Debug, Clone)]
pub struct WeekPlanner {
    day_builder: DayPlanBuilder,
    max_weekly_driving_minutes: i64,
}

impl WeekPlanner {
    pub fn new(preferences: &PlannerPreferences) -> AppResult<Self> {
        Ok(Self {
            day_builder: DayPlanBuilder::new(preferences)?,
            max_weekly_driving_minutes: preferences.max_weekly_driving_minutes,
        })
    }

    pub fn build(&self, week_start: NaiveDate, events: &[Event]) -> AppResult<WeekPlan> {
        let buckets = bucket_events_by_date(week_start, events)?;

        let mut daily_plans = Vec::with_capacity(DAYS_PER_WEEK as usize);
        for day_index in 0..DAYS_PER_WEEK {
            let date = week_start + Duration::days(day_index);
            let day_events = buckets.get(&date).cloned().unwrap_or_default();
            // Lookahead is the next bucket inside the window; the last day
            // sees an empty set rather than the following week.
            let tomorrow_events = buckets
                .get(&(date + Duration::days(1)))
                .cloned()
                .unwrap_or_default();

            debug!(
                target: "app::planner",
                %date,
                events = day_events.len(),
                "building day plan"
            );

            match self.day_builder.build(date, &day_events, &tomorrow_events) {
                Ok(plan) => daily_plans.push(plan),
                Err(error) => {
                    warn!(
                        target: "app::planner",
                        %date,
                        error = %error,
                        "day plan failed validation, keeping the rest of the week"
                    );
                    let failure = failure_from_error(&error);
                    daily_plans.push(degraded_day_plan(date, day_events, failure));
                }
            }
        }

        let total_driving_minutes = daily_plans
            .iter()
            .map(|plan| plan.total_driving_minutes)
            .sum::<i64>();

        let week_suggestions =
            self.build_week_suggestions(&daily_plans, total_driving_minutes);

        Ok(WeekPlan {
            week_of: week_start,
            daily_plans,
            total_driving_minutes,
            week_suggestions,
        })
    }

    fn build_week_suggestions(
        &self,
        daily_plans: &[DayPlan],
        total_driving_minutes: i64,
    ) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();

        if total_driving_minutes > self.max_weekly_driving_minutes {
            let total_hours = (total_driving_minutes as f64 / 60.0 * 10.0).round() / 10.0;
            suggestions.push(Suggestion {
                severity: Severity::Warning,
                message: format!(
                    "High weekly driving time ({total_hours}h). Consider consolidating trips or working remotely some days."
                ),
            });
        }

        let mut place_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        for plan in daily_plans {
            for event in &plan.events {
                let place = location_resolver::resolve_optional(event.location.as_deref());
                if place.is_resolved() {
                    *place_counts.entry(place.as_str()).or_insert(0) += 1;
                }
            }
        }
        for place in CLUSTER_PLACES {
            if let Some(count) = place_counts.get(place.as_str()) {
                if *count > PLACE_CLUSTER_EVENT_COUNT {
                    suggestions.push(Suggestion {
                        severity: Severity::Suggestion,
                        message: format!(
                            "You have {count} events at {place} this week. Consider grouping them on fewer days."
                        ),
                    });
                }
            }
        }

        let busy_days = daily_plans
            .iter()
            .filter(|plan| plan.events.len() > REST_DAY_EVENT_COUNT)
            .count();
        if busy_days > REST_DAY_BUSY_DAY_LIMIT {
            suggestions.push(Suggestion {
                severity: Severity::Info,
                message: "Consider keeping at least one day lighter for rest and unexpected tasks."
                    .to_string(),
            });
        }

        suggestions
    }
}

/// Groups the snapshot by the local calendar date of each event's start,
/// keeping only the 7-day window. An unparsable start cannot be bucketed at
/// all, so it fails the build rather than silently vanishing.
fn bucket_events_by_date(
    week_start: NaiveDate,
    events: &[Event],
) -> AppResult<BTreeMap<NaiveDate, Vec<Event>>> {
    let week_end = week_start + Duration::days(DAYS_PER_WEEK);
    let mut buckets: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();

    for event in events {
        let start = plan_utils::parse_event_datetime(&event.id, "startAt", &event.start_at)?;
        let date = start.date_naive();
        if date < week_start || date >= week_end {
            continue;
        }
        buckets.entry(date).or_default().push(event.clone());
    }

    Ok(buckets)
}

fn failure_from_error(error: &AppError) -> PlanningFailure {
    match error {
        AppError::Validation {
            message, details, ..
        } => PlanningFailure {
            event_id: details
                .as_ref()
                .and_then(|value| value.get("eventId"))
                .and_then(|value| value.as_str())
                .map(|value| value.to_string()),
            field: details
                .as_ref()
                .and_then(|value| value.get("field"))
                .and_then(|value| value.as_str())
                .map(|value| value.to_string()),
            message: message.clone(),
        },
        other => PlanningFailure {
            event_id: None,
            field: None,
            message: other.to_string(),
        },
    }
}
