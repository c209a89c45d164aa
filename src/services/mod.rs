//! Prediction services: parsing, triggering, verification and orchestration.

pub mod engine;
pub mod live_tracker;
pub mod parser;
pub mod schedule_import;
pub mod schedule_tracker;
pub mod trigger_policy;
pub mod verifier;

pub use engine::{EngineSettings, EngineStatus, PredictionEngine, ProcessReport};
pub use live_tracker::LiveTracker;
pub use schedule_tracker::{LaunchCandidate, LaunchSearch, ScheduleTracker};
pub use trigger_policy::{SkipReason, TriggerDecision};
pub use verifier::{PassOutcome, StatusChange, Verdict, VerifierPolicy};
