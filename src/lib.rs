//! Week planning engine for the DuoCal shared calendar: travel-time
//! estimates between a couple's fixed set of places, car/train/bus
//! comparison, nightly sleep-location recommendations and the advisory
//! notes derived from them. The engine is pure computation over an event
//! snapshot; fetching events and narrating plans belong to the callers.

pub mod error;
pub mod models;
pub mod services;
pub mod utils;
