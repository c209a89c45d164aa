//! `run`: feed message events through the engine.
//!
//! Each input line is either a JSON event (`{"text": ..., "edited": ...,
//! "channel_id": ...}`) or the raw message text. Transport effects go to
//! stdout as JSON lines; the run summary goes to stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::open_engine;
use crate::adapters::ConsoleTransport;
use crate::cli::output::CommandOutput;
use crate::cli::types::RunArgs;
use crate::domain::models::{Config, InboundMessage};
use crate::services::ProcessReport;

#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub events: usize,
    pub ignored: usize,
    pub foreign: usize,
    pub malformed: usize,
    pub triggered: usize,
    pub launched: usize,
    pub resolved: usize,
    pub errors: usize,
}

impl RunSummary {
    fn record(&mut self, report: &ProcessReport) {
        if report.is_ignored() {
            self.ignored += 1;
            return;
        }
        self.triggered += usize::from(report.triggered().is_some());
        self.launched += usize::from(report.launched.is_some());
        self.resolved += report.resolved.len();
        self.errors += report.errors.len();
    }
}

impl CommandOutput for RunSummary {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("Processed {} event(s)", self.events)];
        lines.push(format!("  Predictions published: {}", self.triggered));
        lines.push(format!("  Scheduled launches: {}", self.launched));
        lines.push(format!("  Predictions resolved: {}", self.resolved));
        if self.ignored + self.foreign + self.malformed > 0 {
            lines.push(format!(
                "  Skipped: {} without game number, {} from other channels, {} malformed",
                self.ignored, self.foreign, self.malformed
            ));
        }
        if self.errors > 0 {
            lines.push(format!("  Failed effects: {} (see log)", self.errors));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: RunArgs, config: &Config, json: bool) -> Result<()> {
    let transport = Arc::new(ConsoleTransport::new());
    let mut engine = open_engine(config, transport.clone()).await?;
    if let Some(last) = engine.highest_message_id() {
        transport.resume_after(last);
    }

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &args.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let mut summary = RunSummary::default();
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await.context("Failed to read events")? {
        let event = match parse_event(&line) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(err) => {
                warn!(error = %err, "malformed event line");
                summary.malformed += 1;
                continue;
            }
        };
        summary.events += 1;
        if !event.is_from(config.channels.source_channel) {
            summary.foreign += 1;
            continue;
        }
        let report = engine.handle(&event).await;
        summary.record(&report);
    }

    info!(events = summary.events, "input exhausted");
    if json {
        eprintln!("{}", summary.to_json());
    } else {
        eprintln!("{}", summary.to_human());
    }
    Ok(())
}

fn parse_event(line: &str) -> serde_json::Result<Option<InboundMessage>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if line.starts_with('{') {
        return serde_json::from_str(line).map(Some);
    }
    Ok(Some(InboundMessage::new(line)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_forms() {
        assert!(parse_event("   ").unwrap().is_none());

        let plain = parse_event("#N881. 7(A♠6♠) ✅ 7(3♦4♣) #T12").unwrap().unwrap();
        assert!(!plain.edited);
        assert!(plain.text.starts_with("#N881"));

        let event = parse_event(r##"{"text":"#N12. ⏰","edited":true,"channel_id":-5}"##)
            .unwrap()
            .unwrap();
        assert!(event.edited);
        assert_eq!(event.channel_id, Some(-5));

        assert!(parse_event("{not json").is_err());
    }

    #[test]
    fn test_summary_counts_report() {
        let mut summary = RunSummary::default();
        summary.record(&ProcessReport::default());
        assert_eq!(summary.ignored, 1);

        let report = ProcessReport {
            sequence_id: Some(10),
            launched: Some(12),
            errors: vec!["edit prediction: rejected".to_string()],
            ..ProcessReport::default()
        };
        summary.record(&report);
        assert_eq!(summary.launched, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.triggered, 0);
    }
}
