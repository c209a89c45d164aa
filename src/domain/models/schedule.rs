//! Imported prediction schedule model.
//!
//! A schedule is an ordered list of `(identifier, timestamp, outcome)` rows
//! computed ahead of time. Each retained row becomes a [`ScheduleEntry`]
//! that waits until the live stream comes close, is launched (published),
//! and is then verified like a live prediction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::prediction::{MessageRef, Outcome, PredictionRecord, PredictionStatus};

/// Attempt ceiling for imported predictions (offsets 0, 1 and 2).
pub const SCHEDULE_MAX_OFFSET: u32 = 2;

/// One row of an imported schedule, before suppression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub identifier: u64,
    /// Timestamp column as written in the source sheet.
    pub scheduled_at: String,
    pub outcome: Outcome,
}

/// Imported entry plus its verification state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub scheduled_at: String,
    /// Published (or consumed without publishing).
    #[serde(default)]
    pub launched: bool,
    /// Consumed because it followed the last launched identifier.
    #[serde(default)]
    pub skipped_consecutive: bool,
    pub imported_at: DateTime<Utc>,
    pub prediction: PredictionRecord,
}

impl ScheduleEntry {
    pub fn from_row(row: &ScheduleRow) -> Self {
        Self {
            scheduled_at: row.scheduled_at.clone(),
            launched: false,
            skipped_consecutive: false,
            imported_at: Utc::now(),
            prediction: PredictionRecord::new(row.identifier, row.outcome, SCHEDULE_MAX_OFFSET),
        }
    }

    pub fn identifier(&self) -> u64 {
        self.prediction.predicted_id
    }

    /// Launched, published and still waiting for a verdict.
    pub fn is_active(&self) -> bool {
        self.launched && !self.skipped_consecutive && !self.prediction.is_terminal()
    }

    pub fn mark_launched(&mut self, message: MessageRef) {
        self.launched = true;
        self.prediction.offset = 0;
        self.prediction.external_ref = Some(message);
    }

    /// Consume the entry without ever publishing it.
    pub fn mark_skipped_consecutive(&mut self) {
        self.launched = true;
        self.skipped_consecutive = true;
        self.prediction.resolve(PredictionStatus::Failure);
    }
}

/// How an import combines with entries already loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Back up and discard existing entries.
    #[default]
    Replace,
    /// Keep existing entries; rows for already launched keys are skipped.
    Merge,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Merge => "merge",
        }
    }
}

/// Outcome of one import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: usize,
    /// Rows for keys already launched (merge mode only).
    pub skipped: usize,
    /// Rows dropped as consecutive to the previous retained identifier.
    pub consecutive_skipped: usize,
    /// Entries held after the import.
    pub total: usize,
    /// Entries discarded (replace mode only).
    pub replaced: usize,
    pub mode: ImportMode,
}

/// Counts shown by `status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleStats {
    pub total: usize,
    pub launched: usize,
    pub pending: usize,
}
