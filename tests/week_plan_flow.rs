use chrono::NaiveDate;
use duocal_planner::models::event::{Event, EventCategory};
use duocal_planner::models::place::CanonicalPlace;
use duocal_planner::models::preferences::PlannerPreferences;
use duocal_planner::models::transport::TransportMode;
use duocal_planner::services::week_planner::{week_start_for, WeekPlanner};

fn event(id: &str, title: &str, start: &str, end: Option<&str>, location: Option<&str>) -> Event {
    Event {
        id: id.to_string(),
        title: title.to_string(),
        start_at: start.to_string(),
        end_at: end.map(|value| value.to_string()),
        location: location.map(|value| value.to_string()),
        category: EventCategory::Personal,
        created_by: "noa".to_string(),
    }
}

fn sunday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 8).expect("valid date")
}

#[test]
fn evening_rush_leg_is_estimated_on_the_rush_table_and_flags_the_day() {
    let planner = WeekPlanner::new(&PlannerPreferences::default()).expect("planner");

    // Monday: work in Kfar Saba until 16:30, tennis at 18:00. Departure at
    // 16:45 lands in the evening window, so the 35-minute drive becomes 45.
    let events = vec![
        event(
            "work",
            "Clinic shift",
            "2025-06-09T09:00:00+02:00",
            Some("2025-06-09T16:30:00+02:00"),
            Some("Clinic, Kfar Saba"),
        ),
        event(
            "tennis",
            "Tennis practice",
            "2025-06-09T18:00:00+02:00",
            Some("2025-06-09T19:30:00+02:00"),
            Some("Nir Tzvi tennis club"),
        ),
    ];

    let plan = planner.build(sunday(), &events).expect("plan");
    let monday = &plan.daily_plans[1];

    assert_eq!(monday.travel_legs.len(), 1);
    let leg = &monday.travel_legs[0];
    assert_eq!(leg.from_place, CanonicalPlace::KfarSaba);
    assert_eq!(leg.to_place, CanonicalPlace::NirTzvi);
    assert_eq!(leg.duration_minutes, 45);
    assert!(leg.is_rush_hour);
    assert!(monday.analysis.has_rush_hour_travel);
    assert!(monday
        .recommendations
        .iter()
        .any(|rec| rec.title == "Rush Hour Travel"));
}

#[test]
fn unresolvable_location_omits_the_leg_without_failing() {
    let planner = WeekPlanner::new(&PlannerPreferences::default()).expect("planner");

    let events = vec![
        event(
            "a",
            "Morning errand",
            "2025-06-10T09:00:00+02:00",
            Some("2025-06-10T10:00:00+02:00"),
            Some("Beit Dagan"),
        ),
        event(
            "b",
            "Family visit",
            "2025-06-10T12:00:00+02:00",
            Some("2025-06-10T14:00:00+02:00"),
            Some("Grandma's village"),
        ),
        event(
            "c",
            "Groceries",
            "2025-06-10T16:00:00+02:00",
            None,
            Some("Rishon Lezion mall"),
        ),
    ];

    let plan = planner.build(sunday(), &events).expect("plan");
    let tuesday = &plan.daily_plans[2];

    // Both adjacent pairs touch the unresolvable middle stop.
    assert!(tuesday.travel_legs.is_empty());
    assert_eq!(tuesday.total_driving_minutes, 0);
    assert!(tuesday.planning_error.is_none());
    assert_eq!(plan.total_driving_minutes, 0);
}

#[test]
fn cross_line_train_comparison_rides_through_the_hub() {
    let planner = WeekPlanner::new(&PlannerPreferences::default()).expect("planner");

    // Kfar Saba and Beit Dagan sit on disjoint rail lines; the journey takes
    // one transfer at Tel Aviv Center. Off-peak Monday: leg one is 45 minutes
    // plus a 15-minute wait, then 10 minutes transfer, then the 30-minute
    // second leg.
    let events = vec![
        event(
            "lunch",
            "Lunch date",
            "2025-06-09T12:00:00+02:00",
            Some("2025-06-09T13:00:00+02:00"),
            Some("Kfar Saba"),
        ),
        event(
            "home",
            "Laundry at home",
            "2025-06-09T17:00:00+02:00",
            None,
            Some("Beit Dagan"),
        ),
    ];

    let plan = planner.build(sunday(), &events).expect("plan");
    let leg = &plan.daily_plans[1].travel_legs[0];
    let comparison = leg.transport.as_ref().expect("transport comparison");

    let journey = comparison.train.journey().expect("train available");
    assert!(journey.transfer);
    assert_eq!(journey.total_minutes, 60 + 10 + 30);
    assert_eq!(journey.transfer_station.as_deref(), Some("Tel Aviv Center"));
}

#[test]
fn a_full_week_plans_every_day_and_stays_deterministic() {
    let planner = WeekPlanner::new(&PlannerPreferences::default()).expect("planner");
    let reference = NaiveDate::from_ymd_opt(2025, 6, 11).expect("valid date");
    let week_start = week_start_for(reference);
    assert_eq!(week_start, sunday());

    let events = vec![
        event(
            "sun-work",
            "Office day",
            "2025-06-08T08:30:00+02:00",
            Some("2025-06-08T16:00:00+02:00"),
            Some("Rishon Lezion office"),
        ),
        event(
            "mon-work",
            "Office day",
            "2025-06-09T08:30:00+02:00",
            Some("2025-06-09T16:00:00+02:00"),
            Some("Rishon Lezion office"),
        ),
        event(
            "mon-dinner",
            "Dinner with partner",
            "2025-06-09T19:00:00+02:00",
            Some("2025-06-09T21:00:00+02:00"),
            Some("Kfar Saba"),
        ),
        event(
            "tue-early",
            "Early shift",
            "2025-06-10T07:30:00+02:00",
            Some("2025-06-10T15:00:00+02:00"),
            Some("Clinic, Kfar Saba"),
        ),
        event(
            "wed-tennis",
            "Tennis practice",
            "2025-06-11T18:00:00+02:00",
            Some("2025-06-11T19:30:00+02:00"),
            Some("Nir Tzvi"),
        ),
        event(
            "fri-errand",
            "Market run",
            "2025-06-13T10:00:00+02:00",
            None,
            Some("Beit Dagan"),
        ),
    ];

    let plan = planner.build(week_start, &events).expect("plan");

    assert_eq!(plan.week_of, week_start);
    assert_eq!(plan.daily_plans.len(), 7);
    assert!(plan.daily_plans.iter().all(|day| day.planning_error.is_none()));

    // Monday evening ends in Kfar Saba and Tuesday starts there early, so
    // the night goes to the partner's place.
    let monday = &plan.daily_plans[1];
    assert_eq!(monday.sleep_decision.location, CanonicalPlace::KfarSaba);

    // Saturday has nothing scheduled and no lookahead, so it defaults home.
    let saturday = &plan.daily_plans[6];
    assert_eq!(saturday.sleep_decision.location, CanonicalPlace::BeitDagan);
    assert!(saturday.events.is_empty());

    // Every leg carries an advisory transport comparison with a recommendation.
    for day in &plan.daily_plans {
        for leg in &day.travel_legs {
            let comparison = leg.transport.as_ref().expect("comparison attached");
            assert!(matches!(
                comparison.recommended,
                Some(TransportMode::Car) | Some(TransportMode::Train) | Some(TransportMode::Bus)
            ));
        }
    }

    let first = serde_json::to_string(&plan).expect("serialize");
    let second = serde_json::to_string(&planner.build(week_start, &events).expect("rebuild"))
        .expect("serialize");
    assert_eq!(first, second);
}
