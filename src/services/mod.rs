pub mod ai_planner_service;
pub mod day_planner;
pub mod location_resolver;
pub mod plan_utils;
pub mod prompt_templates;
pub mod sleep_optimizer;
pub mod transport_service;
pub mod travel_estimator;
pub mod week_planner;
