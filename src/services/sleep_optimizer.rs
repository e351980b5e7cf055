use crate::error::AppResult;
use crate::models::event::Event;
use crate::models::place::CanonicalPlace;
use crate::models::plan::SleepDecision;
use crate::models::preferences::{PlannerPreferences, SleepLocationPreference};
use crate::services::location_resolver;
use crate::services::plan_utils;
use crate::services::travel_estimator::TravelTimeEstimator;

/// A first commitment at or before this clock minute counts as an early start.
const EARLY_START_MINUTE: i64 = 8 * 60;
/// A last event ending at or after this clock minute counts as a late finish.
const LATE_END_MINUTE: i64 = 18 * 60;
/// A lone first event at or after this clock minute counts as a light morning.
const LATE_MORNING_MINUTE: i64 = 10 * 60;
/// The partner route must beat the home route by at least this much for the
/// early-start rule.
const EARLY_SAVING_MARGIN_MINUTES: i64 = 10;
/// The fallback totals comparison only switches base when the gap is larger
/// than this.
const FALLBACK_MARGIN_MINUTES: i64 = 15;

/// Picks the overnight base for the night between two days. A fixed-priority
/// rule cascade: the first matching rule decides, rules never combine, and
/// only one day of lookahead is consulted.
#[derive(Debug, Clone)]
pub struct SleepLocationOptimizer {
    estimator: TravelTimeEstimator,
    preference: SleepLocationPreference,
}

impl SleepLocationOptimizer {
    pub fn new(preferences: &PlannerPreferences) -> AppResult<Self> {
        Ok(Self {
            estimator: TravelTimeEstimator::new(preferences)?,
            preference: preferences.preferred_sleep_location,
        })
    }

    /// `today` and `tomorrow` must already be sorted ascending by start.
    pub fn optimize(&self, today: &[Event], tomorrow: &[Event]) -> AppResult<SleepDecision> {
        let home = CanonicalPlace::own_home();
        let partner = CanonicalPlace::partner_home();

        match self.preference {
            SleepLocationPreference::Home => {
                return Ok(SleepDecision {
                    location: home,
                    reason: "Sleep location pinned to home by preference".to_string(),
                })
            }
            SleepLocationPreference::Partner => {
                return Ok(SleepDecision {
                    location: partner,
                    reason: "Sleep location pinned to partner's place by preference".to_string(),
                })
            }
            SleepLocationPreference::Optimal => {}
        }

        let first_tomorrow = match tomorrow.first() {
            Some(event) => event,
            None => {
                return Ok(SleepDecision {
                    location: home,
                    reason: "No events tomorrow, stay home".to_string(),
                })
            }
        };

        let first_start =
            plan_utils::parse_event_datetime(&first_tomorrow.id, "startAt", &first_tomorrow.start_at)?;
        let first_place = location_resolver::resolve_optional(first_tomorrow.location.as_deref());
        let first_minute = plan_utils::minute_of_day(first_start);

        let travel_from_home = self.estimator.estimate(home, first_place, first_start);
        let travel_from_partner = self.estimator.estimate(partner, first_place, first_start);

        if first_place.is_near_home() {
            return Ok(SleepDecision {
                location: home,
                reason: format!(
                    "First event tomorrow is near home ({travel_from_home}min drive)"
                ),
            });
        }

        if first_minute <= EARLY_START_MINUTE
            && travel_from_home - travel_from_partner >= EARLY_SAVING_MARGIN_MINUTES
        {
            return Ok(SleepDecision {
                location: partner,
                reason: format!(
                    "Early morning start - saves {}min from partner's place",
                    travel_from_home - travel_from_partner
                ),
            });
        }

        let last_today = today.last();
        if let Some(last) = last_today {
            let last_place = location_resolver::resolve_optional(last.location.as_deref());
            let last_end =
                plan_utils::parse_event_datetime(&last.id, "endAt", last.effective_end_at())?;
            if last_place.is_partner_area() && plan_utils::minute_of_day(last_end) >= LATE_END_MINUTE
            {
                return Ok(SleepDecision {
                    location: partner,
                    reason: "Last event ended late near Kfar Saba, convenient to stay".to_string(),
                });
            }
        }

        if tomorrow.len() <= 1 && first_minute >= LATE_MORNING_MINUTE {
            return Ok(SleepDecision {
                location: partner,
                reason: "Light schedule tomorrow, good time to be together".to_string(),
            });
        }

        // Fallback: total driving around the night, evening leg plus morning leg.
        let mut total_from_home = travel_from_home;
        let mut total_from_partner = travel_from_partner;
        if let Some(last) = last_today {
            let last_place = location_resolver::resolve_optional(last.location.as_deref());
            let last_end =
                plan_utils::parse_event_datetime(&last.id, "endAt", last.effective_end_at())?;
            total_from_home += self.estimator.estimate(last_place, home, last_end);
            total_from_partner += self.estimator.estimate(last_place, partner, last_end);
        }

        if total_from_home - total_from_partner > FALLBACK_MARGIN_MINUTES {
            Ok(SleepDecision {
                location: partner,
                reason: format!(
                    "Minimizes total driving ({total_from_partner}min vs {total_from_home}min)"
                ),
            })
        } else {
            Ok(SleepDecision {
                location: home,
                reason: format!("Most convenient overall ({total_from_home}min total travel)"),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::EventCategory;

    fn event(id: &str, start: &str, end: Option<&str>, location: Option<&str>) -> Event {
        Event {
            id: id.to_string(),
            title: format!("event {id}"),
            start_at: start.to_string(),
            end_at: end.map(|value| value.to_string()),
            location: location.map(|value| value.to_string()),
            category: EventCategory::Other,
            created_by: "tester".to_string(),
        }
    }

    fn optimizer() -> SleepLocationOptimizer {
        SleepLocationOptimizer::new(&PlannerPreferences::default()).expect("optimizer")
    }

    #[test]
    fn empty_tomorrow_defaults_home() {
        let decision = optimizer().optimize(&[], &[]).expect("decision");
        assert_eq!(decision.location, CanonicalPlace::BeitDagan);
        assert!(decision.reason.contains("No events tomorrow"));
    }

    #[test]
    fn near_home_first_event_stays_home() {
        let tomorrow = vec![event(
            "t1",
            "2025-06-10T09:00:00+02:00",
            None,
            Some("Tennis club, Nir Tzvi"),
        )];
        let decision = optimizer().optimize(&[], &tomorrow).expect("decision");
        assert_eq!(decision.location, CanonicalPlace::BeitDagan);
        assert!(decision.reason.contains("near home"));
    }

    #[test]
    fn near_home_rule_beats_light_schedule_rule() {
        // A lone late-morning event near home matches both the near-home rule
        // and the light-schedule rule; the earlier rule must win.
        let tomorrow = vec![event(
            "t1",
            "2025-06-10T11:00:00+02:00",
            None,
            Some("Rishon Lezion office"),
        )];
        let decision = optimizer().optimize(&[], &tomorrow).expect("decision");
        assert_eq!(decision.location, CanonicalPlace::BeitDagan);
        assert!(decision.reason.contains("near home"));
    }

    #[test]
    fn early_shift_closer_to_partner_moves_the_night() {
        // 07:30 start in Kfar Saba: 0 min from partner's place, 30 from home.
        let tomorrow = vec![
            event(
                "t1",
                "2025-06-10T07:30:00+02:00",
                None,
                Some("Clinic, Kfar Saba"),
            ),
            event("t2", "2025-06-10T12:00:00+02:00", None, Some("Kfar Saba")),
        ];
        let decision = optimizer().optimize(&[], &tomorrow).expect("decision");
        assert_eq!(decision.location, CanonicalPlace::KfarSaba);
        assert!(decision.reason.contains("Early morning start"));
    }

    #[test]
    fn late_evening_near_partner_stays_over() {
        // Tomorrow's first event is early but not meaningfully closer from
        // the partner's place, so the late-evening rule gets its turn.
        let today = vec![event(
            "d1",
            "2025-06-09T19:00:00+02:00",
            Some("2025-06-09T21:00:00+02:00"),
            Some("Dinner, Kfar Saba"),
        )];
        let tomorrow = vec![
            event("t1", "2025-06-10T08:00:00+02:00", None, None),
            event("t2", "2025-06-10T13:00:00+02:00", None, None),
        ];
        let decision = optimizer().optimize(&today, &tomorrow).expect("decision");
        assert_eq!(decision.location, CanonicalPlace::KfarSaba);
        assert!(decision.reason.contains("convenient to stay"));
    }

    #[test]
    fn light_late_morning_prefers_togetherness() {
        let tomorrow = vec![event(
            "t1",
            "2025-06-10T10:30:00+02:00",
            None,
            Some("Somewhere new"),
        )];
        let decision = optimizer().optimize(&[], &tomorrow).expect("decision");
        assert_eq!(decision.location, CanonicalPlace::KfarSaba);
        assert!(decision.reason.contains("Light schedule"));
    }

    #[test]
    fn fallback_minimizes_total_driving() {
        // Two events tomorrow starting in Kfar Saba at mid-morning; today
        // ends in Kfar Saba before the late-evening cutoff. Both legs hit a
        // rush window, so totals are home 45 + 45 = 90 against partner 0,
        // and the partner base wins.
        let today = vec![event(
            "d1",
            "2025-06-09T14:00:00+02:00",
            Some("2025-06-09T16:00:00+02:00"),
            Some("Kfar Saba"),
        )];
        let tomorrow = vec![
            event("t1", "2025-06-10T09:00:00+02:00", None, Some("Kfar Saba")),
            event("t2", "2025-06-10T15:00:00+02:00", None, Some("Kfar Saba")),
        ];
        let decision = optimizer().optimize(&today, &tomorrow).expect("decision");
        assert_eq!(decision.location, CanonicalPlace::KfarSaba);
        assert!(decision.reason.contains("Minimizes total driving"));
    }

    #[test]
    fn fallback_defaults_home_inside_the_margin() {
        // No today events; tomorrow busy from an unresolved spot: both bases
        // read the 30-minute default, gap 0, home wins.
        let tomorrow = vec![
            event("t1", "2025-06-10T09:00:00+02:00", None, Some("Petah Tikva")),
            event("t2", "2025-06-10T15:00:00+02:00", None, Some("Petah Tikva")),
        ];
        let decision = optimizer().optimize(&[], &tomorrow).expect("decision");
        assert_eq!(decision.location, CanonicalPlace::BeitDagan);
        assert!(decision.reason.contains("Most convenient overall"));
    }

    #[test]
    fn pinned_preference_short_circuits_the_cascade() {
        let preferences = PlannerPreferences {
            preferred_sleep_location: SleepLocationPreference::Partner,
            ..PlannerPreferences::default()
        };
        let optimizer = SleepLocationOptimizer::new(&preferences).expect("optimizer");
        let decision = optimizer.optimize(&[], &[]).expect("decision");
        assert_eq!(decision.location, CanonicalPlace::KfarSaba);
        assert!(decision.reason.contains("pinned"));
    }

    #[test]
    fn malformed_tomorrow_start_is_a_validation_error() {
        let tomorrow = vec![event("bad", "yesterday-ish", None, Some("Kfar Saba"))];
        let error = optimizer().optimize(&[], &tomorrow).expect_err("must fail");
        let details = error.validation_details().expect("details");
        assert_eq!(details["eventId"], "bad");
        assert_eq!(details["field"], "startAt");
    }
}
