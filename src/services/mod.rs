pub mod metrics;
pub mod simulation;
