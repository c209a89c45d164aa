//! `status`: tunables, counts and live predictions.

use std::sync::Arc;

use anyhow::Result;
use comfy_table::Cell;
use serde::Serialize;

use super::open_engine;
use crate::adapters::ConsoleTransport;
use crate::cli::output::{output, table, CommandOutput};
use crate::domain::models::{Config, PredictionRecord};
use crate::services::EngineStatus;

#[derive(Debug, Serialize)]
pub struct LivePredictionRow {
    pub predicted_id: u64,
    pub outcome: String,
    pub offset: u32,
    pub max_offset: u32,
    pub status: String,
    pub source_id: Option<u64>,
    pub metric: Option<f64>,
}

impl From<&PredictionRecord> for LivePredictionRow {
    fn from(r: &PredictionRecord) -> Self {
        Self {
            predicted_id: r.predicted_id,
            outcome: r.expected_outcome.as_str().to_string(),
            offset: r.offset,
            max_offset: r.max_offset,
            status: r.status.token(),
            source_id: r.source_id,
            metric: r.metric,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusOutput {
    #[serde(flatten)]
    pub status: EngineStatus,
    pub active: Vec<LivePredictionRow>,
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        let s = &self.status;
        let mut lines = vec![
            format!(
                "Tunables: offset_a={} max_offset={}",
                s.tunables.offset_a, s.tunables.max_offset
            ),
            format!("Live predictions: {} ({} active)", s.live_total, s.live_active),
            format!(
                "Schedule: {} entr(y/ies), {} launched, {} pending",
                s.schedule.total, s.schedule.launched, s.schedule.pending
            ),
        ];
        if let Some(last) = s.last_launched {
            lines.push(format!("Last launched: #{last}"));
        }

        if !self.active.is_empty() {
            let mut t = table(&["Game", "Outcome", "Attempt", "Source", "Metric", "Status"]);
            for row in &self.active {
                t.add_row(vec![
                    Cell::new(row.predicted_id),
                    Cell::new(&row.outcome),
                    Cell::new(format!("{}/{}", row.offset, row.max_offset)),
                    Cell::new(row.source_id.map_or_else(|| "-".to_string(), |id| id.to_string())),
                    Cell::new(row.metric.map_or_else(|| "-".to_string(), |m| m.to_string())),
                    Cell::new(&row.status),
                ]);
            }
            lines.push(String::new());
            lines.push(t.to_string());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(config: &Config, json: bool) -> Result<()> {
    let engine = open_engine(config, Arc::new(ConsoleTransport::new())).await?;
    let active = engine
        .live()
        .records()
        .values()
        .filter(|r| !r.is_terminal())
        .map(LivePredictionRow::from)
        .collect();

    output(
        &StatusOutput {
            status: engine.status(),
            active,
        },
        json,
    );
    Ok(())
}
