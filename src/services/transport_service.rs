use chrono::{DateTime, FixedOffset};

use crate::error::AppResult;
use crate::models::place::CanonicalPlace;
use crate::models::preferences::PlannerPreferences;
use crate::models::transport::{
    BusOption, BusRoute, CarOption, RankedOption, TrainJourney, TrainOption, TransportComparison,
    TransportMode,
};
use crate::services::plan_utils;
use crate::services::travel_estimator::TravelTimeEstimator;

const TRANSFER_PENALTY_MINUTES: i64 = 10;
const RAIL_SPEED_FACTOR: f64 = 1.5;
const DEFAULT_RAIL_DISTANCE: i64 = 30;
const BUS_FARE: f64 = 5.90;
const FUEL_COST_PER_LITER: f64 = 6.0;
const KM_PER_LITER: f64 = 10.0;
const AVERAGE_SPEED_KMH: f64 = 60.0;
const RUSH_TRAIN_SAVING_NOTE_MINUTES: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Station {
    KfarSaba,
    HodHasharon,
    KfarChabad,
    TelAvivCenter,
}

impl Station {
    fn name(self) -> &'static str {
        match self {
            Station::KfarSaba => "Kfar Saba",
            Station::HodHasharon => "Hod Hasharon",
            Station::KfarChabad => "Kfar Chabad",
            Station::TelAvivCenter => "Tel Aviv Center",
        }
    }

    fn lines(self) -> &'static [RailLine] {
        match self {
            Station::KfarSaba | Station::HodHasharon => &[RailLine::KfarSabaHodHasharon],
            Station::KfarChabad => &[RailLine::RehovotAshkelon, RailLine::JerusalemTelAviv],
            Station::TelAvivCenter => &[],
        }
    }

    /// The central hub is on every line.
    fn serves_all_lines(self) -> bool {
        matches!(self, Station::TelAvivCenter)
    }

    fn serves(self, line: RailLine) -> bool {
        self.serves_all_lines() || self.lines().contains(&line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RailLine {
    KfarSabaHodHasharon,
    RehovotAshkelon,
    JerusalemTelAviv,
}

impl RailLine {
    fn name(self) -> &'static str {
        match self {
            RailLine::KfarSabaHodHasharon => "Tel Aviv - Kfar Saba/Hod Hasharon",
            RailLine::RehovotAshkelon => "Tel Aviv - Rehovot/Ashkelon",
            RailLine::JerusalemTelAviv => "Jerusalem - Tel Aviv",
        }
    }

    /// Not every line in the directory has timetable data; line selection
    /// only considers timetabled lines.
    fn timetable(self) -> Option<LineTimetable> {
        match self {
            RailLine::KfarSabaHodHasharon => Some(LineTimetable {
                weekday_frequency: 30,
                rush_frequency: 15,
                weekend_frequency: 60,
            }),
            RailLine::RehovotAshkelon => Some(LineTimetable {
                weekday_frequency: 20,
                rush_frequency: 10,
                weekend_frequency: 30,
            }),
            RailLine::JerusalemTelAviv => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LineTimetable {
    weekday_frequency: i64,
    rush_frequency: i64,
    weekend_frequency: i64,
}

/// First timetabled line both stations serve. The hub is on every line, so
/// its side never constrains the choice.
fn shared_line(a: Station, b: Station) -> Option<RailLine> {
    let candidates = if a.serves_all_lines() {
        b.lines()
    } else {
        a.lines()
    };
    candidates
        .iter()
        .copied()
        .find(|line| line.timetable().is_some() && a.serves(*line) && b.serves(*line))
}

fn nearest_station(place: CanonicalPlace) -> Option<Station> {
    match place {
        CanonicalPlace::KfarSaba => Some(Station::KfarSaba),
        CanonicalPlace::HodHasharon => Some(Station::HodHasharon),
        CanonicalPlace::BeitDagan | CanonicalPlace::RishonLezion => Some(Station::KfarChabad),
        CanonicalPlace::TelAviv => Some(Station::TelAvivCenter),
        CanonicalPlace::NirTzvi | CanonicalPlace::Unresolved => None,
    }
}

fn rail_distance(a: Station, b: Station) -> i64 {
    const DISTANCES: &[(Station, Station, i64)] = &[
        (Station::KfarSaba, Station::KfarChabad, 45),
        (Station::KfarSaba, Station::TelAvivCenter, 30),
        (Station::KfarChabad, Station::TelAvivCenter, 20),
    ];

    DISTANCES
        .iter()
        .find(|(x, y, _)| (*x == a && *y == b) || (*x == b && *y == a))
        .map(|(_, _, distance)| *distance)
        .unwrap_or(DEFAULT_RAIL_DISTANCE)
}

fn train_fare(distance: i64) -> f64 {
    if distance <= 20 {
        6.80
    } else if distance <= 40 {
        10.50
    } else {
        15.30
    }
}

fn fuel_cost(duration_minutes: i64) -> f64 {
    let distance_km = (duration_minutes as f64 / 60.0) * AVERAGE_SPEED_KMH;
    let liters = distance_km / KM_PER_LITER;
    (liters * FUEL_COST_PER_LITER).round()
}

const BUS_ROUTES: &[(&str, &str, &[&str], i64, i64)] = &[
    ("Kfar Saba", "Tel Aviv", &["531", "142"], 15, 45),
    ("Rishon Lezion", "Tel Aviv", &["201", "202", "203"], 10, 30),
    ("Beit Dagan", "Tel Aviv", &["240"], 20, 25),
];

/// Ranks car, train and bus for a single leg. Stateless apart from injected
/// configuration; safe to share and call concurrently.
#[derive(Debug, Clone)]
pub struct TransportComparator {
    estimator: TravelTimeEstimator,
    avoid_rush_hour: bool,
}

impl TransportComparator {
    pub fn new(preferences: &PlannerPreferences) -> AppResult<Self> {
        Ok(Self {
            estimator: TravelTimeEstimator::new(preferences)?,
            avoid_rush_hour: preferences.avoid_rush_hour,
        })
    }

    pub fn compare(
        &self,
        from: CanonicalPlace,
        to: CanonicalPlace,
        departure: DateTime<FixedOffset>,
    ) -> TransportComparison {
        let duration = self.estimator.estimate(from, to, departure);
        let car = CarOption {
            duration_minutes: duration,
            cost_estimate: fuel_cost(duration),
        };
        let train = self.train_journey(from, to, departure);
        let bus = bus_options(from, to);

        let mut ranked = Vec::new();
        ranked.push(RankedOption {
            mode: TransportMode::Car,
            total_minutes: car.duration_minutes,
        });
        if let Some(journey) = train.journey() {
            ranked.push(RankedOption {
                mode: TransportMode::Train,
                total_minutes: journey.total_minutes,
            });
        }
        if let Some(route) = bus.route() {
            ranked.push(RankedOption {
                mode: TransportMode::Bus,
                total_minutes: route.duration_minutes,
            });
        }
        ranked.sort_by_key(|option| option.total_minutes);
        let recommended = ranked.first().map(|option| option.mode);

        let analysis = self.analyze(&car, &train, &bus, departure);

        TransportComparison {
            car,
            train,
            bus,
            ranked,
            recommended,
            analysis,
        }
    }

    fn train_journey(
        &self,
        from: CanonicalPlace,
        to: CanonicalPlace,
        departure: DateTime<FixedOffset>,
    ) -> TrainOption {
        let from_station = match nearest_station(from) {
            Some(station) => station,
            None => {
                return TrainOption::Unavailable {
                    reason: format!("no rail station near {from}"),
                }
            }
        };
        let to_station = match nearest_station(to) {
            Some(station) => station,
            None => {
                return TrainOption::Unavailable {
                    reason: format!("no rail station near {to}"),
                }
            }
        };

        if from_station == to_station {
            return TrainOption::Unavailable {
                reason: "no distinct stations for this leg".to_string(),
            };
        }

        match self.direct_journey(from_station, to_station, departure) {
            Some(journey) => TrainOption::Available(journey),
            None => self.journey_with_transfer(from_station, to_station, departure),
        }
    }

    fn direct_journey(
        &self,
        from: Station,
        to: Station,
        departure: DateTime<FixedOffset>,
    ) -> Option<TrainJourney> {
        let line = shared_line(from, to)?;
        let timetable = line.timetable()?;

        let distance = rail_distance(from, to);
        let journey_minutes = ((distance as f64) * RAIL_SPEED_FACTOR).round() as i64;

        // Weekends always run the off-peak timetable, whatever the clock says.
        let frequency = if plan_utils::is_weekend(departure) {
            timetable.weekend_frequency
        } else if self.estimator.is_rush_hour(departure) {
            timetable.rush_frequency
        } else {
            timetable.weekday_frequency
        };
        let wait_minutes = ((frequency as f64) / 2.0).round() as i64;

        Some(TrainJourney {
            from_station: from.name().to_string(),
            to_station: to.name().to_string(),
            line: Some(line.name().to_string()),
            journey_minutes,
            wait_minutes,
            total_minutes: journey_minutes + wait_minutes,
            frequency_minutes: Some(frequency),
            cost_estimate: train_fare(distance),
            transfer: false,
            transfer_station: None,
        })
    }

    /// One transfer through the central hub. The connecting train is assumed
    /// caught at the transfer, so only the second leg's journey time counts
    /// on top of the penalty.
    fn journey_with_transfer(
        &self,
        from: Station,
        to: Station,
        departure: DateTime<FixedOffset>,
    ) -> TrainOption {
        let hub = Station::TelAvivCenter;

        let first = match self.direct_journey(from, hub, departure) {
            Some(journey) => journey,
            None => {
                return TrainOption::Unavailable {
                    reason: format!("no line connects {} to the hub", from.name()),
                }
            }
        };

        let second_departure = departure
            + chrono::Duration::minutes(first.total_minutes + TRANSFER_PENALTY_MINUTES);
        let second = match self.direct_journey(hub, to, second_departure) {
            Some(journey) => journey,
            None => {
                return TrainOption::Unavailable {
                    reason: format!("no line connects the hub to {}", to.name()),
                }
            }
        };

        TrainOption::Available(TrainJourney {
            from_station: from.name().to_string(),
            to_station: to.name().to_string(),
            line: None,
            journey_minutes: first.journey_minutes + second.journey_minutes,
            wait_minutes: first.wait_minutes,
            total_minutes: first.total_minutes
                + TRANSFER_PENALTY_MINUTES
                + second.journey_minutes,
            frequency_minutes: None,
            cost_estimate: first.cost_estimate + second.cost_estimate,
            transfer: true,
            transfer_station: Some(hub.name().to_string()),
        })
    }

    fn analyze(
        &self,
        car: &CarOption,
        train: &TrainOption,
        bus: &BusOption,
        departure: DateTime<FixedOffset>,
    ) -> Vec<String> {
        let mut analysis = Vec::new();
        let rush = self.estimator.is_rush_hour(departure);

        if let Some(journey) = train.journey() {
            if rush {
                let saving = car.duration_minutes - journey.total_minutes;
                if saving > RUSH_TRAIN_SAVING_NOTE_MINUTES {
                    analysis.push(format!("Train saves {saving} minutes during rush hour"));
                }
            }
            if journey.transfer {
                analysis.push("Train requires transfer - factor in extra time".to_string());
            }
        }

        if bus.route().is_some() {
            analysis.push("Bus is most economical but may take longer".to_string());
        }

        if rush {
            analysis.push("Rush hour - public transport recommended".to_string());
            if self.avoid_rush_hour {
                analysis
                    .push("Consider departing earlier to avoid rush hour traffic".to_string());
            }
        }

        if train.journey().is_some() {
            analysis.push("Train offers predictable journey time and avoids traffic".to_string());
        }

        analysis
    }
}

fn bus_options(from: CanonicalPlace, to: CanonicalPlace) -> BusOption {
    let from_name = from.as_str();
    let to_name = to.as_str();

    let matched = BUS_ROUTES
        .iter()
        .find(|(a, b, _, _, _)| {
            (*a == from_name && *b == to_name) || (*a == to_name && *b == from_name)
        })
        .or_else(|| {
            // Partial match, e.g. a route key covering a wider area.
            let from_lower = from_name.to_lowercase();
            let to_lower = to_name.to_lowercase();
            BUS_ROUTES.iter().find(|(a, b, _, _, _)| {
                let key = format!("{a} - {b}").to_lowercase();
                key.contains(&from_lower) && key.contains(&to_lower)
            })
        });

    match matched {
        Some((_, _, lines, frequency, duration)) => BusOption::Available(BusRoute {
            lines: lines.iter().map(|line| line.to_string()).collect(),
            frequency_minutes: *frequency,
            duration_minutes: *duration,
            cost_estimate: BUS_FARE,
        }),
        None => BusOption::Unavailable {
            reason: "no direct bus route found".to_string(),
        },
    }
}
