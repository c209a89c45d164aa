//! Bounded sequential verifier.
//!
//! Both trackers resolve a prediction the same way: starting at the
//! predicted game, each later game is one attempt, the first attempt whose
//! first-group point matches the expected outcome is a success at that
//! offset, and running past `max_offset` is a failure. They differ only in
//! how points are compared and in how they react to lines that are not yet
//! final; [`VerifierPolicy`] carries those differences.

use serde::Serialize;
use tracing::debug;

use crate::domain::models::{
    MessageRef, Outcome, ParsedMessage, PredictionRecord, PredictionStatus,
};

/// How a first-group point is compared with the expected outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Thresholds {
    /// Player iff point > 6.5, banker iff point < 4.5.
    Halves,
    /// Player iff point >= 7, banker iff point <= 4.
    WholePoints,
}

impl Thresholds {
    /// Whether `point` satisfies `outcome`. Points 5 and 6 satisfy neither.
    pub fn accepts(self, outcome: Outcome, point: u32) -> bool {
        match (self, outcome) {
            (Self::Halves, Outcome::Player) => f64::from(point) > 6.5,
            (Self::Halves, Outcome::Banker) => f64::from(point) < 4.5,
            (Self::WholePoints, Outcome::Player) => point >= 7,
            (Self::WholePoints, Outcome::Banker) => point <= 4,
        }
    }
}

/// How lines that are not final are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Only finalized lines are looked at, in-edit markers notwithstanding.
    FinalizedOnly,
    /// Any line realigns the offset; a line at the target offset that is
    /// unconfirmed or still in edit is waited on. A plain-confirmed line
    /// without a readable point fails the prediction.
    Realign,
}

impl GapPolicy {
    /// Whether `msg` is settled enough to be evaluated.
    pub fn is_settled(self, msg: &ParsedMessage) -> bool {
        match self {
            Self::FinalizedOnly => msg.finalized,
            Self::Realign => msg.finalized && !msg.in_edit,
        }
    }
}

/// Comparison and gap rules applied by [`step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerifierPolicy {
    /// Point comparison against the expected outcome.
    pub thresholds: Thresholds,
    /// Treatment of lines that are not settled.
    pub gap: GapPolicy,
}

impl VerifierPolicy {
    /// Policy of predictions spawned from the live stream.
    pub const LIVE: Self = Self {
        thresholds: Thresholds::Halves,
        gap: GapPolicy::FinalizedOnly,
    };

    /// Policy of predictions launched from an imported schedule.
    pub const SCHEDULE: Self = Self {
        thresholds: Thresholds::WholePoints,
        gap: GapPolicy::Realign,
    };
}

/// What one step did to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// Nothing changed.
    Unchanged,
    /// The target line is not final yet; `realigned` tells whether the
    /// offset moved on the way.
    Waiting { realigned: bool },
    /// The offset moved; the record is still pending.
    Advanced { offset: u32 },
    /// The record reached a terminal status.
    Resolved { status: PredictionStatus },
}

impl Verdict {
    /// The record was mutated and must be persisted.
    pub fn is_mutation(&self) -> bool {
        match self {
            Self::Unchanged => false,
            Self::Waiting { realigned } => *realigned,
            Self::Advanced { .. } | Self::Resolved { .. } => true,
        }
    }
}

/// Terminal transition to be reflected on the published message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    /// Tracker key of the record.
    pub key: String,
    /// Terminal status reached.
    pub status: PredictionStatus,
    /// Full replacement text.
    pub text: String,
    /// Published message to edit, if delivery succeeded.
    pub message: Option<MessageRef>,
}

impl StatusChange {
    /// Snapshot the record's current status and rendering.
    pub fn from_record(record: &PredictionRecord) -> Self {
        Self {
            key: record.key.clone(),
            status: record.status,
            text: record.render(),
            message: record.external_ref,
        }
    }
}

/// Outcome of one verification pass over a tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassOutcome {
    /// At least one record changed; the snapshot must be saved.
    pub mutated: bool,
    /// Terminal transitions, in tracker order.
    pub changes: Vec<StatusChange>,
}

impl PassOutcome {
    pub(crate) fn absorb(&mut self, record: &PredictionRecord, verdict: Verdict) {
        self.mutated |= verdict.is_mutation();
        if let Verdict::Resolved { .. } = verdict {
            self.changes.push(StatusChange::from_record(record));
        }
    }
}

/// Apply one incoming line to one record.
pub fn step(record: &mut PredictionRecord, msg: &ParsedMessage, policy: VerifierPolicy) -> Verdict {
    if record.is_terminal() {
        return Verdict::Unchanged;
    }
    if policy.gap == GapPolicy::FinalizedOnly && !msg.finalized {
        return Verdict::Unchanged;
    }

    let Some(distance) = msg.sequence_id.checked_sub(record.predicted_id) else {
        return Verdict::Unchanged;
    };
    let Ok(current) = u32::try_from(distance) else {
        return resolve(record, PredictionStatus::Failure);
    };

    if current > record.max_offset {
        debug!(
            key = %record.key,
            current,
            max_offset = record.max_offset,
            "offset past ceiling"
        );
        record.offset = record.max_offset.saturating_add(1);
        return resolve(record, PredictionStatus::Failure);
    }
    if current < record.offset {
        return Verdict::Unchanged;
    }

    let realigned = current > record.offset;
    if realigned {
        debug!(key = %record.key, from = record.offset, to = current, "skipping unseen offsets");
        record.offset = current;
    }

    if !policy.gap.is_settled(msg) {
        return Verdict::Waiting { realigned };
    }

    let Some(point) = msg.first_group_point else {
        if policy.gap == GapPolicy::Realign && !msg.alternate_confirmed {
            debug!(key = %record.key, current, "confirmed line without point");
            return resolve(record, PredictionStatus::Failure);
        }
        return if realigned {
            Verdict::Advanced { offset: current }
        } else {
            Verdict::Unchanged
        };
    };

    if policy.thresholds.accepts(record.expected_outcome, point) {
        return resolve(record, PredictionStatus::Success { offset: current });
    }
    if current >= record.max_offset {
        return resolve(record, PredictionStatus::Failure);
    }

    record.offset = current + 1;
    Verdict::Advanced {
        offset: record.offset,
    }
}

fn resolve(record: &mut PredictionRecord, status: PredictionStatus) -> Verdict {
    if record.resolve(status) {
        Verdict::Resolved { status }
    } else {
        Verdict::Unchanged
    }
}
