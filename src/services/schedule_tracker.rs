//! Registry of predictions loaded from an imported schedule.
//!
//! Entries sit idle until the live game number comes within the launch
//! tolerance, are then published one at a time, and verified with the
//! stricter whole-point thresholds and a fixed ceiling of two extra games.
//! Two suppression rules keep near-duplicate identifiers out: rows
//! consecutive to the previously retained row are dropped at import, and
//! an entry consecutive to the last launched one is consumed unpublished.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::domain::models::{
    ImportMode, ImportSummary, MessageRef, ParsedMessage, ScheduleEntry, ScheduleRow,
    ScheduleSnapshot, ScheduleStats,
};
use crate::services::verifier::{self, PassOutcome, Verdict, VerifierPolicy};

/// Entry chosen for launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCandidate {
    /// Tracker key of the entry.
    pub key: String,
    /// Scheduled game number.
    pub identifier: u64,
    /// How many games ahead of the live number the entry is.
    pub lead: u64,
}

/// Result of a launch search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchSearch {
    /// Nearest launchable entry, if any.
    pub candidate: Option<LaunchCandidate>,
    /// Keys consumed as consecutive to the last launch.
    pub consumed: Vec<String>,
}

/// Imported schedule keyed by identifier.
#[derive(Debug, Default)]
pub struct ScheduleTracker {
    entries: BTreeMap<String, ScheduleEntry>,
    last_launched: Option<u64>,
}

impl ScheduleTracker {
    /// Empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a schedule from a stored snapshot.
    pub fn from_snapshot(snapshot: ScheduleSnapshot) -> Self {
        Self {
            entries: snapshot.entries,
            last_launched: snapshot.last_launched,
        }
    }

    /// Copy of the state to persist.
    pub fn snapshot(&self) -> ScheduleSnapshot {
        ScheduleSnapshot {
            entries: self.entries.clone(),
            last_launched: self.last_launched,
        }
    }

    /// Entry stored under `key`.
    pub fn get(&self, key: &str) -> Option<&ScheduleEntry> {
        self.entries.get(key)
    }

    /// Entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.entries.values()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No entry imported.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifier of the most recent launch.
    pub fn last_launched(&self) -> Option<u64> {
        self.last_launched
    }

    /// Load rows, applying the consecutive-identifier suppression.
    pub fn import(&mut self, rows: &[ScheduleRow], mode: ImportMode) -> ImportSummary {
        let mut summary = ImportSummary {
            mode,
            ..ImportSummary::default()
        };
        let mut incoming = BTreeMap::new();
        let mut last_retained: Option<u64> = None;

        for row in rows {
            let key = row.identifier.to_string();
            if mode == ImportMode::Merge && self.entries.get(&key).is_some_and(|e| e.launched) {
                summary.skipped += 1;
                continue;
            }
            if last_retained.and_then(|last| last.checked_add(1)) == Some(row.identifier) {
                debug!(identifier = row.identifier, "dropping row consecutive to previous");
                summary.consecutive_skipped += 1;
                continue;
            }
            incoming.insert(key, ScheduleEntry::from_row(row));
            summary.imported += 1;
            last_retained = Some(row.identifier);
        }

        match mode {
            ImportMode::Replace => {
                summary.replaced = self.entries.len();
                self.entries = incoming;
                self.last_launched = None;
            }
            ImportMode::Merge => self.entries.extend(incoming),
        }
        summary.total = self.entries.len();

        info!(
            mode = mode.as_str(),
            imported = summary.imported,
            consecutive_skipped = summary.consecutive_skipped,
            total = summary.total,
            "schedule imported"
        );
        summary
    }

    /// Find the nearest unlaunched entry at most `tolerance` games ahead of
    /// `current`. Entries consecutive to the last launch are consumed on the
    /// way and reported in [`LaunchSearch::consumed`].
    pub fn find_launch_candidate(&mut self, current: u64, tolerance: u64) -> LaunchSearch {
        let mut search = LaunchSearch::default();
        let last_launched = self.last_launched;

        for (key, entry) in &mut self.entries {
            if entry.launched {
                continue;
            }
            let Some(lead) = entry.identifier().checked_sub(current) else {
                continue;
            };
            if lead > tolerance {
                continue;
            }
            if last_launched.and_then(|last| last.checked_add(1)) == Some(entry.identifier()) {
                warn!(
                    identifier = entry.identifier(),
                    last_launched = ?last_launched,
                    "consuming entry consecutive to last launch"
                );
                entry.mark_skipped_consecutive();
                search.consumed.push(key.clone());
                continue;
            }
            if search.candidate.as_ref().is_none_or(|best| lead < best.lead) {
                search.candidate = Some(LaunchCandidate {
                    key: key.clone(),
                    identifier: entry.identifier(),
                    lead,
                });
            }
        }

        if let Some(candidate) = &search.candidate {
            debug!(
                identifier = candidate.identifier,
                current,
                lead = candidate.lead,
                "launch candidate found"
            );
        }
        search
    }

    /// Record that `key` was published as `message`.
    pub fn mark_launched(&mut self, key: &str, message: MessageRef) -> bool {
        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };
        entry.mark_launched(message);
        self.last_launched = Some(entry.identifier());
        info!(identifier = entry.identifier(), "schedule entry launched");
        true
    }

    /// Run every launched, pending entry against one line.
    pub fn verify(&mut self, msg: &ParsedMessage) -> PassOutcome {
        let mut outcome = PassOutcome::default();
        for entry in self.entries.values_mut().filter(|e| e.is_active()) {
            let record = &mut entry.prediction;
            let verdict = verifier::step(record, msg, VerifierPolicy::SCHEDULE);
            match verdict {
                Verdict::Resolved { status } => info!(
                    key = %record.key,
                    game = msg.sequence_id,
                    status = %status.token(),
                    "scheduled prediction resolved"
                ),
                Verdict::Waiting { .. } => debug!(
                    key = %record.key,
                    game = msg.sequence_id,
                    "waiting for finalized line"
                ),
                _ => {}
            }
            outcome.absorb(record, verdict);
        }
        outcome
    }

    /// Unlaunched entries ordered by identifier.
    pub fn pending(&self) -> Vec<&ScheduleEntry> {
        let mut pending: Vec<_> = self.entries.values().filter(|e| !e.launched).collect();
        pending.sort_by_key(|e| e.identifier());
        pending
    }

    /// Launch counters.
    pub fn stats(&self) -> ScheduleStats {
        let total = self.entries.len();
        let launched = self.entries.values().filter(|e| e.launched).count();
        ScheduleStats {
            total,
            launched,
            pending: total - launched,
        }
    }

    /// Drop every entry. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.last_launched = None;
        removed
    }
}
