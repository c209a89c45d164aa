//! Whole-state snapshots handed to the record store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::config::Tunables;
use super::prediction::PredictionRecord;
use super::schedule::ScheduleEntry;

/// Persisted state of the live tracker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveSnapshot {
    /// Tunables changed at runtime; `None` until first changed.
    #[serde(default)]
    pub tunables: Option<Tunables>,
    #[serde(default)]
    pub predictions: BTreeMap<String, PredictionRecord>,
}

/// Persisted state of the imported schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    #[serde(default)]
    pub entries: BTreeMap<String, ScheduleEntry>,
    #[serde(default)]
    pub last_launched: Option<u64>,
}
