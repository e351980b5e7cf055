use serde_json::{json, Value as JsonValue};

use crate::models::plan::WeekPlan;
use crate::models::preferences::PlannerPreferences;

/// System prompt for the week-plan narrator.
pub fn week_planner_system_prompt() -> &'static str {
    r#"You are an intelligent week planner assistant for a couple living in Israel. You have deep knowledge of:

1. **Locations**: Kfar Saba, Beit Dagan, Rishon Lezion, Nir Tzvi (tennis club)
2. **Transportation**: Israeli roads, traffic patterns, rush hours
3. **Public Transport**: Israel Railways connections, bus routes
4. **Relationship dynamics**: Optimizing time together while respecting work schedules

You receive a structured week plan as JSON: per-day events, estimated drives, the suggested
sleep location for each night and the planner's own warnings. Write a short, friendly
narrative summary of the week: the main travel pressure points, where to sleep each night
and why, and where public transport is worth taking. Respond with plain text, not JSON.
Always be practical, considerate of both partners' needs, and factor in real Israeli
traffic conditions."#
}

/// Serializes a week plan and the active preferences into the JSON context
/// the summarizer receives. Advisory data only; nothing here feeds back into
/// planning decisions.
pub fn build_week_context(plan: &WeekPlan, preferences: &PlannerPreferences) -> JsonValue {
    let daily_plans: Vec<JsonValue> = plan
        .daily_plans
        .iter()
        .map(|day| {
            json!({
                "date": day.date,
                "events": day
                    .events
                    .iter()
                    .map(|event| json!({
                        "title": event.title,
                        "startAt": event.start_at,
                        "endAt": event.end_at,
                        "location": event.location,
                    }))
                    .collect::<Vec<_>>(),
                "travelLegs": day
                    .travel_legs
                    .iter()
                    .map(|leg| json!({
                        "from": leg.from_title,
                        "to": leg.to_title,
                        "departureAt": leg.departure_at,
                        "durationMinutes": leg.duration_minutes,
                        "isRushHour": leg.is_rush_hour,
                        "recommendedMode": leg
                            .transport
                            .as_ref()
                            .and_then(|comparison| comparison.recommended)
                            .map(|mode| mode.as_str()),
                    }))
                    .collect::<Vec<_>>(),
                "totalDrivingMinutes": day.total_driving_minutes,
                "sleepLocation": day.sleep_decision.location,
                "sleepReason": day.sleep_decision.reason,
                "recommendations": day
                    .recommendations
                    .iter()
                    .map(|rec| json!({
                        "severity": rec.severity,
                        "title": rec.title,
                        "message": rec.message,
                    }))
                    .collect::<Vec<_>>(),
                "planningError": day.planning_error,
            })
        })
        .collect();

    json!({
        "weekOverview": {
            "weekOf": plan.week_of,
            "totalDrivingMinutes": plan.total_driving_minutes,
            "dailyPlans": daily_plans,
            "weekSuggestions": plan.week_suggestions,
        },
        "userPreferences": preferences,
    })
}
