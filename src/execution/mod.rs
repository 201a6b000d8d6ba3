pub mod aggregator;
pub mod orchestrator;
pub mod persistence;
pub mod types;
