use chrono::NaiveDate;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::event::Event;
use crate::models::place::CanonicalPlace;
use crate::models::plan::{
    DayAnalysis, DayPlan, PlanningFailure, Recommendation, Severity, SleepDecision, TravelLeg,
};
use crate::models::preferences::PlannerPreferences;
use crate::services::location_resolver;
use crate::services::plan_utils;
use crate::services::sleep_optimizer::SleepLocationOptimizer;
use crate::services::transport_service::TransportComparator;
use crate::services::travel_estimator::TravelTimeEstimator;

/// Proxy for "the rush table fired": any leg estimated above the off-peak
/// short-hop ceiling is flagged. Deliberately not a time-window check, so the
/// flag keeps its historical meaning; replace with a window check only
/// together with the UI copy built on it.
pub const RUSH_CONFLICT_BASELINE_MINUTES: i64 = 30;

const BUSY_DAY_EVENT_COUNT: usize = 3;
const AFTERNOON_PICKUP_MINUTE: i64 = 15 * 60;
const LONG_DAY_SPAN_MINUTES: i64 = 10 * 60;

/// Builds the plan for one calendar day: orders events, estimates the drives
/// between them, decides where to sleep and derives the advisory notes.
#[derive(Debug, Clone)]
pub struct DayPlanBuilder {
    estimator: TravelTimeEstimator,
    comparator: TransportComparator,
    sleep_optimizer: SleepLocationOptimizer,
    buffer_minutes: i64,
    max_daily_driving_minutes: i64,
    long_drive_threshold_minutes: i64,
}

impl DayPlanBuilder {
    pub fn new(preferences: &PlannerPreferences) -> AppResult<Self> {
        preferences.validate()?;
        Ok(Self {
            estimator: TravelTimeEstimator::new(preferences)?,
            comparator: TransportComparator::new(preferences)?,
            sleep_optimizer: SleepLocationOptimizer::new(preferences)?,
            buffer_minutes: preferences.buffer_minutes,
            max_daily_driving_minutes: preferences.max_daily_driving_minutes,
            long_drive_threshold_minutes: preferences.long_drive_threshold_minutes,
        })
    }

    pub fn build(
        &self,
        date: NaiveDate,
        events: &[Event],
        tomorrow_events: &[Event],
    ) -> AppResult<DayPlan> {
        let events = sort_events(events)?;
        // Lookahead only reads tomorrow's first start and location, so a
        // malformed end over there stays tomorrow's problem.
        let tomorrow_events = sort_events_by_start(tomorrow_events)?;

        let mut travel_legs = Vec::new();
        for pair in events.windows(2) {
            let current = &pair[0];
            let next = &pair[1];

            let from_place = location_resolver::resolve_optional(current.location.as_deref());
            let to_place = location_resolver::resolve_optional(next.location.as_deref());
            if !from_place.is_resolved() || !to_place.is_resolved() {
                // No leg for pairs we cannot place; totals only count real estimates.
                continue;
            }

            let current_end = plan_utils::parse_event_datetime(
                &current.id,
                "endAt",
                current.effective_end_at(),
            )?;
            let departure = plan_utils::add_minutes(current_end, self.buffer_minutes)?;
            let duration = self.estimator.estimate(from_place, to_place, departure);

            travel_legs.push(TravelLeg {
                from_title: current.title.clone(),
                to_title: next.title.clone(),
                from_place,
                to_place,
                departure_at: plan_utils::format_datetime(departure),
                duration_minutes: duration,
                is_rush_hour: duration > RUSH_CONFLICT_BASELINE_MINUTES,
                transport: Some(self.comparator.compare(from_place, to_place, departure)),
            });
        }

        let total_driving_minutes = travel_legs
            .iter()
            .map(|leg| leg.duration_minutes)
            .sum::<i64>();

        let mut total_event_minutes = 0;
        for event in &events {
            let start = plan_utils::parse_event_datetime(&event.id, "startAt", &event.start_at)?;
            let end =
                plan_utils::parse_event_datetime(&event.id, "endAt", event.effective_end_at())?;
            total_event_minutes += plan_utils::duration_minutes(start, end)?;
        }

        let analysis = DayAnalysis {
            is_busy: events.len() > BUSY_DAY_EVENT_COUNT,
            is_long_driving_day: total_driving_minutes > self.max_daily_driving_minutes,
            has_rush_hour_travel: travel_legs.iter().any(|leg| leg.is_rush_hour),
            has_long_drives: travel_legs
                .iter()
                .any(|leg| leg.duration_minutes > self.long_drive_threshold_minutes),
            total_event_minutes,
        };

        let sleep_decision = self.sleep_optimizer.optimize(&events, &tomorrow_events)?;
        let recommendations =
            self.build_recommendations(&events, &travel_legs, &analysis, &sleep_decision)?;

        Ok(DayPlan {
            date,
            events,
            travel_legs,
            total_driving_minutes,
            analysis,
            sleep_decision,
            recommendations,
            planning_error: None,
        })
    }

    fn build_recommendations(
        &self,
        events: &[Event],
        travel_legs: &[TravelLeg],
        analysis: &DayAnalysis,
        sleep_decision: &SleepDecision,
    ) -> AppResult<Vec<Recommendation>> {
        let mut recommendations = Vec::new();

        let sleep_label = if sleep_decision.location == CanonicalPlace::own_home() {
            "your place".to_string()
        } else if sleep_decision.location == CanonicalPlace::partner_home() {
            "partner's place".to_string()
        } else {
            sleep_decision.location.to_string()
        };
        recommendations.push(Recommendation {
            severity: Severity::Suggestion,
            title: format!("Sleep at {sleep_label}"),
            message: sleep_decision.reason.clone(),
        });

        for leg in travel_legs {
            let departure = plan_utils::parse_datetime(&leg.departure_at)?;
            if !self.estimator.is_rush_hour(departure) {
                continue;
            }
            let train_total = leg
                .transport
                .as_ref()
                .and_then(|comparison| comparison.train.journey())
                .map(|journey| journey.total_minutes);
            if let Some(train_total) = train_total {
                if train_total < leg.duration_minutes {
                    recommendations.push(Recommendation {
                        severity: Severity::Suggestion,
                        title: "Take the Train".to_string(),
                        message: format!(
                            "{} → {}: train faster during rush hour ({}min vs {}min by car)",
                            leg.from_title, leg.to_title, train_total, leg.duration_minutes
                        ),
                    });
                }
            }
        }

        if analysis.has_rush_hour_travel {
            recommendations.push(Recommendation {
                severity: Severity::Warning,
                title: "Rush Hour Travel".to_string(),
                message: "Consider leaving 15 minutes earlier or using train during peak hours"
                    .to_string(),
            });
        }

        if analysis.is_long_driving_day {
            recommendations.push(Recommendation {
                severity: Severity::Warning,
                title: "Heavy Driving Day".to_string(),
                message: format!(
                    "{}h+ of driving. Consider staying overnight or grouping trips.",
                    travel_hours_rounded(travel_legs)
                ),
            });
        }

        if let Some(pickup) = self.pickup_opportunity(events)? {
            recommendations.push(pickup);
        }

        if let (Some(first), Some(last)) = (events.first(), events.last()) {
            let first_start =
                plan_utils::parse_event_datetime(&first.id, "startAt", &first.start_at)?;
            let last_end =
                plan_utils::parse_event_datetime(&last.id, "endAt", last.effective_end_at())?;
            if plan_utils::duration_minutes(first_start, last_end)? > LONG_DAY_SPAN_MINUTES {
                recommendations.push(Recommendation {
                    severity: Severity::Info,
                    title: "Long Day Ahead".to_string(),
                    message: "Consider scheduling meal breaks and rest time between events"
                        .to_string(),
                });
            }
        }

        Ok(recommendations)
    }

    /// Partner's workday ends mid-afternoon; an errand near home right after
    /// is a chance to pick them up on the way.
    fn pickup_opportunity(&self, events: &[Event]) -> AppResult<Option<Recommendation>> {
        for event in events {
            let start = plan_utils::parse_event_datetime(&event.id, "startAt", &event.start_at)?;
            if plan_utils::minute_of_day(start) < AFTERNOON_PICKUP_MINUTE {
                continue;
            }
            let place = location_resolver::resolve_optional(event.location.as_deref());
            if place.is_near_home() {
                return Ok(Some(Recommendation {
                    severity: Severity::Info,
                    title: "Partner Pickup Opportunity".to_string(),
                    message: format!(
                        "Partner finishes work at 15:30. Could pick them up for {}?",
                        event.title
                    ),
                }));
            }
            return Ok(None);
        }
        Ok(None)
    }
}

fn travel_hours_rounded(travel_legs: &[TravelLeg]) -> i64 {
    let minutes: i64 = travel_legs.iter().map(|leg| leg.duration_minutes).sum();
    (minutes as f64 / 60.0).round() as i64
}

/// Sorts ascending by parsed start, preserving input order on ties, and
/// rejects events whose end precedes their start.
pub(crate) fn sort_events(events: &[Event]) -> AppResult<Vec<Event>> {
    let mut decorated = Vec::with_capacity(events.len());
    for event in events {
        let start = plan_utils::parse_event_datetime(&event.id, "startAt", &event.start_at)?;
        if let Some(end_at) = &event.end_at {
            let end = plan_utils::parse_event_datetime(&event.id, "endAt", end_at)?;
            if end < start {
                return Err(AppError::validation_with_details(
                    "event ends before it starts",
                    json!({
                        "eventId": event.id,
                        "field": "endAt",
                        "startAt": event.start_at,
                        "endAt": end_at,
                    }),
                ));
            }
        }
        decorated.push((start, event.clone()));
    }

    decorated.sort_by_key(|(start, _)| *start);
    Ok(decorated.into_iter().map(|(_, event)| event).collect())
}

/// Stable start-order sort without end validation, for lookahead slices.
pub(crate) fn sort_events_by_start(events: &[Event]) -> AppResult<Vec<Event>> {
    let mut decorated = Vec::with_capacity(events.len());
    for event in events {
        let start = plan_utils::parse_event_datetime(&event.id, "startAt", &event.start_at)?;
        decorated.push((start, event.clone()));
    }
    decorated.sort_by_key(|(start, _)| *start);
    Ok(decorated.into_iter().map(|(_, event)| event).collect())
}

/// The per-day degraded result: the week keeps its shape, the broken day
/// carries the reason instead of derived data.
pub fn degraded_day_plan(date: NaiveDate, events: Vec<Event>, failure: PlanningFailure) -> DayPlan {
    DayPlan {
        date,
        events,
        travel_legs: Vec::new(),
        total_driving_minutes: 0,
        analysis: DayAnalysis::default(),
        sleep_decision: SleepDecision {
            location: CanonicalPlace::own_home(),
            reason: "Planning skipped for this day because of invalid event data".to_string(),
        },
        recommendations: Vec::new(),
        planning_error: Some(failure),
    }
}
