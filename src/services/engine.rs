//! Prediction engine.
//!
//! Owns both trackers and drives them from the inbound stream, one message
//! at a time. Ordering matters: offsets and the consecutive-launch rule
//! assume messages are applied strictly in arrival order, so the engine is
//! driven through `&mut self` and never processes two messages at once.
//!
//! State transitions are applied in memory first. Persisting the snapshot
//! and editing the published message follow as effects whose failures are
//! logged and reported, never rolled back.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    Config, ImportMode, ImportSummary, InboundMessage, LiveSnapshot, ParsedMessage,
    PredictionRecord, ScheduleRow, ScheduleSnapshot, ScheduleStats, Tunables,
};
use crate::domain::ports::{RecordStore, Transport};
use crate::services::live_tracker::LiveTracker;
use crate::services::parser;
use crate::services::schedule_tracker::ScheduleTracker;
use crate::services::trigger_policy::{self, TriggerDecision};
use crate::services::verifier::StatusChange;

/// Engine settings that are fixed for the process lifetime.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// Channel predictions are published to.
    pub display_channel: i64,
    /// How far ahead of the live game a scheduled entry may launch.
    pub launch_tolerance: u64,
    /// Back up the schedule store before a replace import.
    pub backup_on_replace: bool,
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        Self {
            display_channel: config.channels.display_channel,
            launch_tolerance: config.schedule.launch_tolerance,
            backup_on_replace: config.schedule.backup_on_replace,
        }
    }
}

/// What handling one message did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessReport {
    /// `None` when the message carried no game number.
    pub sequence_id: Option<u64>,
    /// The line carried a confirmed marker.
    pub finalized: bool,
    /// Terminal transitions from both trackers.
    pub resolved: Vec<StatusChange>,
    /// Scheduled entry published for this message.
    pub launched: Option<u64>,
    /// Scheduled keys consumed as consecutive to the last launch.
    pub consumed: Vec<String>,
    /// Trigger policy outcome for the line.
    pub decision: Option<TriggerDecision>,
    /// Effects that failed (store writes, deliveries, edits).
    pub errors: Vec<String>,
}

impl ProcessReport {
    /// The message carried no game number.
    pub fn is_ignored(&self) -> bool {
        self.sequence_id.is_none()
    }

    /// Predicted game number of a live prediction created by this message.
    pub fn triggered(&self) -> Option<u64> {
        match self.decision {
            Some(TriggerDecision::Trigger { predicted_id, .. }) => Some(predicted_id),
            _ => None,
        }
    }
}

/// Counts shown by `status`.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    /// Tunables in force.
    pub tunables: Tunables,
    /// Live records, terminal ones included.
    pub live_total: usize,
    /// Live records still pending.
    pub live_active: usize,
    /// Schedule launch counters.
    pub schedule: ScheduleStats,
    /// Identifier of the most recent scheduled launch.
    pub last_launched: Option<u64>,
}

/// Per-message orchestration over both trackers, the transport and the stores.
pub struct PredictionEngine {
    transport: Arc<dyn Transport>,
    live_store: Arc<dyn RecordStore<LiveSnapshot>>,
    schedule_store: Arc<dyn RecordStore<ScheduleSnapshot>>,
    settings: EngineSettings,
    /// Configured tunables, used until changed at runtime.
    configured: Tunables,
    /// Tunables changed at runtime; persisted with the live snapshot.
    pinned: Option<Tunables>,
    live: LiveTracker,
    schedule: ScheduleTracker,
}

impl PredictionEngine {
    /// Load both snapshots and build the engine.
    pub async fn open(
        config: &Config,
        transport: Arc<dyn Transport>,
        live_store: Arc<dyn RecordStore<LiveSnapshot>>,
        schedule_store: Arc<dyn RecordStore<ScheduleSnapshot>>,
    ) -> DomainResult<Self> {
        let live_snapshot = live_store.load().await?;
        let schedule_snapshot = schedule_store.load().await?;
        if let Some(pinned) = &live_snapshot.tunables {
            pinned.validate()?;
        }

        info!(
            live = live_snapshot.predictions.len(),
            scheduled = schedule_snapshot.entries.len(),
            "prediction engine loaded"
        );

        Ok(Self {
            transport,
            live_store,
            schedule_store,
            settings: EngineSettings::from(config),
            configured: config.tunables,
            pinned: live_snapshot.tunables,
            live: LiveTracker::from_records(live_snapshot.predictions),
            schedule: ScheduleTracker::from_snapshot(schedule_snapshot),
        })
    }

    /// Tunables in force: runtime overrides, else configured values.
    pub fn tunables(&self) -> Tunables {
        self.pinned.unwrap_or(self.configured)
    }

    /// Live prediction registry.
    pub fn live(&self) -> &LiveTracker {
        &self.live
    }

    /// Imported schedule.
    pub fn schedule(&self) -> &ScheduleTracker {
        &self.schedule
    }

    /// Highest message id handed out by the transport so far.
    pub fn highest_message_id(&self) -> Option<i64> {
        let live = self.live.records().values().filter_map(|r| r.external_ref);
        let scheduled = self
            .schedule
            .entries()
            .filter_map(|e| e.prediction.external_ref);
        live.chain(scheduled).map(|m| m.message_id).max()
    }

    /// Counters for the `status` command.
    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            tunables: self.tunables(),
            live_total: self.live.len(),
            live_active: self.live.active_count(),
            schedule: self.schedule.stats(),
            last_launched: self.schedule.last_launched(),
        }
    }

    /// Process one inbound message.
    #[instrument(skip_all, fields(edited = event.edited))]
    pub async fn handle(&mut self, event: &InboundMessage) -> ProcessReport {
        let Some(msg) = parser::parse(&event.text) else {
            debug!("message without game number ignored");
            return ProcessReport::default();
        };
        let mut report = ProcessReport {
            sequence_id: Some(msg.sequence_id),
            finalized: msg.finalized,
            ..ProcessReport::default()
        };
        debug!(game = msg.sequence_id, finalized = msg.finalized, "processing result line");

        self.verify_live(&msg, &mut report).await;
        self.verify_schedule(&msg, &mut report).await;
        self.launch_scheduled(&msg, &mut report).await;
        self.trigger(&msg, &mut report).await;

        report
    }

    async fn verify_live(&mut self, msg: &ParsedMessage, report: &mut ProcessReport) {
        let pass = self.live.verify(msg);
        if pass.mutated {
            if let Err(err) = self.persist_live().await {
                report_error(report, "live store", &err);
            }
        }
        self.publish_changes(pass.changes, report).await;
    }

    async fn verify_schedule(&mut self, msg: &ParsedMessage, report: &mut ProcessReport) {
        let pass = self.schedule.verify(msg);
        if pass.mutated {
            if let Err(err) = self.persist_schedule().await {
                report_error(report, "schedule store", &err);
            }
        }
        self.publish_changes(pass.changes, report).await;
    }

    async fn launch_scheduled(&mut self, msg: &ParsedMessage, report: &mut ProcessReport) {
        let search = self
            .schedule
            .find_launch_candidate(msg.sequence_id, self.settings.launch_tolerance);
        let mut mutated = !search.consumed.is_empty();
        report.consumed = search.consumed;

        if let Some(candidate) = search.candidate {
            let text = self
                .schedule
                .get(&candidate.key)
                .map(|entry| entry.prediction.render());
            if let Some(text) = text {
                match self
                    .transport
                    .deliver(self.settings.display_channel, &text)
                    .await
                {
                    Ok(message) => {
                        mutated |= self.schedule.mark_launched(&candidate.key, message);
                        report.launched = Some(candidate.identifier);
                    }
                    Err(err) => {
                        // Left unlaunched; the next line retries while in range.
                        report_error(report, "deliver scheduled prediction", &err);
                    }
                }
            }
        }

        if mutated {
            if let Err(err) = self.persist_schedule().await {
                report_error(report, "schedule store", &err);
            }
        }
    }

    async fn trigger(&mut self, msg: &ParsedMessage, report: &mut ProcessReport) {
        let tunables = self.tunables();
        let decision =
            trigger_policy::evaluate(msg, tunables.offset_a, |id| self.live.contains(id));
        report.decision = Some(decision);

        let TriggerDecision::Trigger {
            predicted_id,
            expected_outcome,
            metric,
        } = decision
        else {
            if let TriggerDecision::Skip { reason } = decision {
                debug!(game = msg.sequence_id, reason = reason.as_str(), "no prediction");
            }
            return;
        };

        let record = PredictionRecord::new(predicted_id, expected_outcome, tunables.max_offset)
            .with_source(msg.sequence_id, metric);
        let key = record.key.clone();
        let text = record.render();
        self.live.register(record);

        match self
            .transport
            .deliver(self.settings.display_channel, &text)
            .await
        {
            Ok(message) => {
                self.live.attach_message(&key, message);
                info!(game = msg.sequence_id, predicted = predicted_id, %text, "prediction published");
            }
            Err(err) => report_error(report, "deliver prediction", &err),
        }

        if let Err(err) = self.persist_live().await {
            report_error(report, "live store", &err);
        }
    }

    async fn publish_changes(&self, changes: Vec<StatusChange>, report: &mut ProcessReport) {
        for change in changes {
            match change.message {
                Some(message) => {
                    if let Err(err) = self.transport.edit(message, &change.text).await {
                        report_error(report, "edit prediction", &err);
                    }
                }
                None => warn!(key = %change.key, "resolved prediction was never published"),
            }
            report.resolved.push(change);
        }
    }

    /// Change the predicted-game offset.
    pub async fn set_offset_a(&mut self, value: u64) -> DomainResult<Tunables> {
        let tunables = Tunables {
            offset_a: value,
            ..self.tunables()
        };
        self.pin(tunables).await
    }

    /// Change the live attempt ceiling; rejected outside 0..=10 with the
    /// previous value kept.
    pub async fn set_max_offset(&mut self, value: u32) -> DomainResult<Tunables> {
        let tunables = Tunables {
            max_offset: Tunables::check_max_offset(value)?,
            ..self.tunables()
        };
        self.pin(tunables).await
    }

    async fn pin(&mut self, tunables: Tunables) -> DomainResult<Tunables> {
        self.pinned = Some(tunables);
        info!(
            offset_a = tunables.offset_a,
            max_offset = tunables.max_offset,
            "tunables updated"
        );
        self.persist_live().await?;
        Ok(tunables)
    }

    /// Import schedule rows, backing up the stored schedule before a replace.
    pub async fn import_schedule(
        &mut self,
        rows: &[ScheduleRow],
        mode: ImportMode,
    ) -> DomainResult<ImportSummary> {
        if mode == ImportMode::Replace && self.settings.backup_on_replace && !self.schedule.is_empty()
        {
            if let Some(backup) = self.schedule_store.backup().await? {
                info!(%backup, "schedule backed up before replace");
            }
        }
        let summary = self.schedule.import(rows, mode);
        self.persist_schedule().await?;
        Ok(summary)
    }

    /// Drop every live prediction.
    pub async fn clear_live(&mut self) -> DomainResult<usize> {
        let removed = self.live.clear();
        self.persist_live().await?;
        Ok(removed)
    }

    /// Drop every scheduled entry.
    pub async fn clear_schedule(&mut self) -> DomainResult<usize> {
        let removed = self.schedule.clear();
        self.persist_schedule().await?;
        Ok(removed)
    }

    async fn persist_live(&self) -> DomainResult<()> {
        let snapshot = LiveSnapshot {
            tunables: self.pinned,
            predictions: self.live.records().clone(),
        };
        self.live_store.save(&snapshot).await
    }

    async fn persist_schedule(&self) -> DomainResult<()> {
        self.schedule_store.save(&self.schedule.snapshot()).await
    }
}

fn report_error(report: &mut ProcessReport, effect: &str, err: &dyn std::fmt::Display) {
    error!(effect, error = %err, "effect failed");
    report.errors.push(format!("{effect}: {err}"));
}
