use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TransportMode {
    Car,
    Train,
    Bus,
}

impl TransportMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Car => "car",
            TransportMode::Train => "train",
            TransportMode::Bus => "bus",
        }
    }
}

/// Driving is always an option; the duration comes from the travel estimator
/// and the cost is a rough fuel estimate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarOption {
    pub duration_minutes: i64,
    pub cost_estimate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrainJourney {
    pub from_station: String,
    pub to_station: String,
    #[serde(default)]
    pub line: Option<String>,
    pub journey_minutes: i64,
    pub wait_minutes: i64,
    pub total_minutes: i64,
    #[serde(default)]
    pub frequency_minutes: Option<i64>,
    pub cost_estimate: f64,
    pub transfer: bool,
    #[serde(default)]
    pub transfer_station: Option<String>,
}

/// Absence of a train connection is routine, not an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TrainOption {
    Available(TrainJourney),
    Unavailable { reason: String },
}

impl TrainOption {
    pub fn journey(&self) -> Option<&TrainJourney> {
        match self {
            TrainOption::Available(journey) => Some(journey),
            TrainOption::Unavailable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BusRoute {
    pub lines: Vec<String>,
    pub frequency_minutes: i64,
    pub duration_minutes: i64,
    pub cost_estimate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum BusOption {
    Available(BusRoute),
    Unavailable { reason: String },
}

impl BusOption {
    pub fn route(&self) -> Option<&BusRoute> {
        match self {
            BusOption::Available(route) => Some(route),
            BusOption::Unavailable { .. } => None,
        }
    }
}

/// One entry in the time-ordered ranking of available modes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedOption {
    pub mode: TransportMode,
    pub total_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransportComparison {
    pub car: CarOption,
    pub train: TrainOption,
    pub bus: BusOption,
    /// Available modes, fastest first. The head is the recommended mode.
    pub ranked: Vec<RankedOption>,
    #[serde(default)]
    pub recommended: Option<TransportMode>,
    /// Advisory notes only; nothing downstream branches on these.
    pub analysis: Vec<String>,
}
