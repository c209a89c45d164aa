//! Registry of predictions spawned from the live stream.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::domain::models::{MessageRef, ParsedMessage, PredictionRecord};
use crate::services::verifier::{self, PassOutcome, Verdict, VerifierPolicy};

/// Live predictions keyed by predicted game number.
#[derive(Debug, Default)]
pub struct LiveTracker {
    records: BTreeMap<String, PredictionRecord>,
}

impl LiveTracker {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a registry from a stored snapshot.
    pub fn from_records(records: BTreeMap<String, PredictionRecord>) -> Self {
        Self { records }
    }

    /// A prediction for `predicted_id` already exists.
    pub fn contains(&self, predicted_id: u64) -> bool {
        self.records.contains_key(&predicted_id.to_string())
    }

    /// Record stored under `key`.
    pub fn get(&self, key: &str) -> Option<&PredictionRecord> {
        self.records.get(key)
    }

    /// All records, for persistence.
    pub fn records(&self) -> &BTreeMap<String, PredictionRecord> {
        &self.records
    }

    /// Number of records, terminal ones included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// No record registered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records still waiting for a verdict.
    pub fn active_count(&self) -> usize {
        self.records.values().filter(|r| !r.is_terminal()).count()
    }

    /// Register a freshly triggered prediction. Returns `false` and leaves
    /// the registry untouched when the key already exists.
    pub fn register(&mut self, record: PredictionRecord) -> bool {
        if self.records.contains_key(&record.key) {
            debug!(key = %record.key, "prediction already registered");
            return false;
        }
        info!(
            key = %record.key,
            outcome = record.expected_outcome.as_str(),
            max_offset = record.max_offset,
            "live prediction registered"
        );
        self.records.insert(record.key.clone(), record);
        true
    }

    /// Attach the published message to a registered prediction.
    pub fn attach_message(&mut self, key: &str, message: MessageRef) -> bool {
        self.records.get_mut(key).is_some_and(|record| {
            record.external_ref = Some(message);
            true
        })
    }

    /// Run every pending record against one line.
    pub fn verify(&mut self, msg: &ParsedMessage) -> PassOutcome {
        let mut outcome = PassOutcome::default();
        for record in self.records.values_mut() {
            let verdict = verifier::step(record, msg, VerifierPolicy::LIVE);
            if let Verdict::Resolved { status } = verdict {
                info!(
                    key = %record.key,
                    game = msg.sequence_id,
                    status = %status.token(),
                    "live prediction resolved"
                );
            }
            outcome.absorb(record, verdict);
        }
        outcome
    }

    /// Drop every record. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Outcome, PredictionStatus};
    use crate::services::parser::parse;

    #[test]
    fn test_register_is_idempotent() {
        let mut tracker = LiveTracker::new();
        assert!(tracker.register(PredictionRecord::new(12, Outcome::Player, 2)));
        assert!(!tracker.register(PredictionRecord::new(12, Outcome::Banker, 2)));
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.get("12").unwrap().expected_outcome, Outcome::Player);
    }

    #[test]
    fn test_confirmed_line_with_edit_marker_resolves() {
        let mut tracker = LiveTracker::new();
        tracker.register(PredictionRecord::new(12, Outcome::Player, 2));

        let pass = tracker.verify(&parse("#N12. 🕐8(K♠8♦) ✅ 3(2♣A♥)").unwrap());
        assert!(pass.mutated);
        assert_eq!(pass.changes.len(), 1);
        assert_eq!(
            tracker.get("12").unwrap().status,
            PredictionStatus::Success { offset: 0 }
        );
    }

    #[test]
    fn test_verify_emits_status_change() {
        let mut tracker = LiveTracker::new();
        tracker.register(PredictionRecord::new(12, Outcome::Banker, 2));
        tracker.attach_message(
            "12",
            MessageRef {
                channel_id: -5,
                message_id: 77,
            },
        );

        let pass = tracker.verify(&parse("#N12. 2(K♠2♦) ✅ 9(4♣5♦)").unwrap());
        assert!(pass.mutated);
        assert_eq!(pass.changes.len(), 1);
        let change = &pass.changes[0];
        assert_eq!(change.status, PredictionStatus::Success { offset: 0 });
        assert_eq!(change.text, "🔵12:Ⓜ️-4,,5🔵statut :✅0️⃣");
        assert_eq!(change.message.unwrap().message_id, 77);
        assert_eq!(tracker.active_count(), 0);
    }

    #[test]
    fn test_records_are_independent() {
        let mut tracker = LiveTracker::new();
        tracker.register(PredictionRecord::new(12, Outcome::Player, 2));
        tracker.register(PredictionRecord::new(13, Outcome::Banker, 2));

        let pass = tracker.verify(&parse("#N13. 8(K♠8♦) ✅ 9(4♣5♦)").unwrap());
        assert!(pass.mutated);
        assert_eq!(pass.changes.len(), 1);
        assert_eq!(pass.changes[0].key, "12");
        assert_eq!(tracker.get("13").unwrap().offset, 1);
    }

    #[test]
    fn test_clear() {
        let mut tracker = LiveTracker::new();
        tracker.register(PredictionRecord::new(1, Outcome::Player, 2));
        assert_eq!(tracker.clear(), 1);
        assert!(tracker.is_empty());
    }
}
