//! Registry-selection-to-CRM import pipeline.

pub mod orchestrator;
pub mod outcome;

pub use orchestrator::ImportOrchestrator;
