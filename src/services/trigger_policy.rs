//! Trigger policy: decides whether a finalized result line spawns a new
//! live prediction.
//!
//! The rule is deterministic: a rank-6 card in the first group plus a `#T`
//! value fires a prediction for `game + offset_a`, player when `#T > 10.5`
//! and banker otherwise. A handful of card layouts suppress the signal.

use serde::Serialize;

use crate::domain::models::{Outcome, ParsedMessage};

/// `#T` above which the player outcome is predicted.
pub const METRIC_SPLIT: f64 = 10.5;

/// Why a message did not fire a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NotFinalized,
    Tie,
    SixInBothGroups,
    MultipleSixes,
    SixTotalWithSix,
    NoSixInFirstGroup,
    MissingMetric,
    AlreadyTriggered,
}

impl SkipReason {
    /// Stable label used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFinalized => "not_finalized",
            Self::Tie => "tie",
            Self::SixInBothGroups => "six_in_both_groups",
            Self::MultipleSixes => "multiple_sixes",
            Self::SixTotalWithSix => "six_total_with_six",
            Self::NoSixInFirstGroup => "no_six_in_first_group",
            Self::MissingMetric => "missing_metric",
            Self::AlreadyTriggered => "already_triggered",
        }
    }

    /// Exclusion rules, as opposed to plain absence of a signal.
    pub fn is_exclusion(&self) -> bool {
        matches!(
            self,
            Self::Tie | Self::SixInBothGroups | Self::MultipleSixes | Self::SixTotalWithSix
        )
    }
}

/// Result of evaluating one message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum TriggerDecision {
    Skip { reason: SkipReason },
    Trigger {
        predicted_id: u64,
        expected_outcome: Outcome,
        metric: f64,
    },
}

impl TriggerDecision {
    const fn skip(reason: SkipReason) -> Self {
        Self::Skip { reason }
    }
}

/// Evaluate `msg` against the trigger rules.
///
/// `already_triggered` answers whether a live prediction exists for a
/// predicted game number; such numbers are never triggered twice.
pub fn evaluate<F>(msg: &ParsedMessage, offset_a: u64, already_triggered: F) -> TriggerDecision
where
    F: Fn(u64) -> bool,
{
    if !msg.finalized {
        return TriggerDecision::skip(SkipReason::NotFinalized);
    }
    if let Some(reason) = exclusion(msg) {
        return TriggerDecision::skip(reason);
    }

    if !msg.first_group().is_some_and(|group| group.has_six()) {
        return TriggerDecision::skip(SkipReason::NoSixInFirstGroup);
    }

    let Some(metric) = msg.metric else {
        return TriggerDecision::skip(SkipReason::MissingMetric);
    };

    let predicted_id = msg.sequence_id.saturating_add(offset_a);
    if already_triggered(predicted_id) {
        return TriggerDecision::skip(SkipReason::AlreadyTriggered);
    }

    TriggerDecision::Trigger {
        predicted_id,
        expected_outcome: outcome_for_metric(metric),
        metric,
    }
}

/// Exclusion rules, first match wins.
fn exclusion(msg: &ParsedMessage) -> Option<SkipReason> {
    if msg.tie {
        return Some(SkipReason::Tie);
    }

    let first_has_six = msg.first_group().is_some_and(|group| group.has_six());
    let second_has_six = msg.second_group().is_some_and(|group| group.has_six());
    if first_has_six && second_has_six {
        return Some(SkipReason::SixInBothGroups);
    }

    if msg.six_count() >= 2 {
        return Some(SkipReason::MultipleSixes);
    }

    if first_has_six && msg.first_group().is_some_and(|group| group.total == 6) {
        return Some(SkipReason::SixTotalWithSix);
    }

    None
}

/// Player above the metric split, banker otherwise.
pub fn outcome_for_metric(metric: f64) -> Outcome {
    if metric > METRIC_SPLIT {
        Outcome::Player
    } else {
        Outcome::Banker
    }
}
