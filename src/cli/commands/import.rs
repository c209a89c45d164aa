//! `import`: load a schedule export into the schedule store.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use super::open_engine;
use crate::adapters::ConsoleTransport;
use crate::cli::output::{output, CommandOutput};
use crate::cli::types::ImportArgs;
use crate::domain::models::{Config, ImportMode, ImportSummary};
use crate::services::schedule_import;

#[derive(Debug, Serialize)]
pub struct ImportOutput {
    pub file: String,
    #[serde(flatten)]
    pub summary: ImportSummary,
}

impl CommandOutput for ImportOutput {
    fn to_human(&self) -> String {
        let s = &self.summary;
        let mut lines = vec![format!(
            "Imported {} prediction(s) from {} ({})",
            s.imported,
            self.file,
            s.mode.as_str()
        )];
        if s.consecutive_skipped > 0 {
            lines.push(format!(
                "  Dropped {} row(s) consecutive to the previous one",
                s.consecutive_skipped
            ));
        }
        if s.skipped > 0 {
            lines.push(format!("  Kept {} already launched entr(y/ies)", s.skipped));
        }
        if s.replaced > 0 {
            lines.push(format!("  Replaced {} stored entr(y/ies)", s.replaced));
        }
        lines.push(format!("  Schedule now holds {} entr(y/ies)", s.total));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ImportArgs, config: &Config, json: bool) -> Result<()> {
    let rows = schedule_import::read_schedule(&args.file)
        .await
        .with_context(|| format!("Failed to read schedule {}", args.file.display()))?;
    let mode = if args.merge {
        ImportMode::Merge
    } else {
        ImportMode::Replace
    };

    let mut engine = open_engine(config, Arc::new(ConsoleTransport::new())).await?;
    let summary = engine
        .import_schedule(&rows, mode)
        .await
        .context("Failed to store imported schedule")?;

    output(
        &ImportOutput {
            file: args.file.display().to_string(),
            summary,
        },
        json,
    );
    Ok(())
}
