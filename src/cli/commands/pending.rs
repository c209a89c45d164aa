//! `pending`: scheduled entries waiting for launch.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use super::open_engine;
use crate::adapters::ConsoleTransport;
use crate::cli::output::{output, table, truncate, CommandOutput};
use crate::domain::models::{Config, ScheduleEntry};

#[derive(Debug, Serialize)]
pub struct PendingRow {
    pub identifier: u64,
    pub scheduled_at: String,
    pub outcome: String,
}

impl From<&ScheduleEntry> for PendingRow {
    fn from(e: &ScheduleEntry) -> Self {
        Self {
            identifier: e.identifier(),
            scheduled_at: e.scheduled_at.clone(),
            outcome: e.prediction.expected_outcome.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PendingOutput {
    pub pending: Vec<PendingRow>,
    pub total: usize,
}

impl CommandOutput for PendingOutput {
    fn to_human(&self) -> String {
        if self.pending.is_empty() {
            return "No scheduled predictions waiting.".to_string();
        }
        let mut t = table(&["Game", "Scheduled", "Outcome"]);
        for row in &self.pending {
            t.add_row(vec![
                row.identifier.to_string(),
                truncate(&row.scheduled_at, 24),
                row.outcome.clone(),
            ]);
        }
        format!("{} scheduled prediction(s) waiting:\n{t}", self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(config: &Config, json: bool) -> Result<()> {
    let engine = open_engine(config, Arc::new(ConsoleTransport::new())).await?;
    let pending: Vec<PendingRow> = engine
        .schedule()
        .pending()
        .into_iter()
        .map(PendingRow::from)
        .collect();

    output(
        &PendingOutput {
            total: pending.len(),
            pending,
        },
        json,
    );
    Ok(())
}
