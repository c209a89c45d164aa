//! `clear`: drop stored predictions.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use super::open_engine;
use crate::adapters::ConsoleTransport;
use crate::cli::output::{output, CommandOutput};
use crate::cli::types::ClearArgs;
use crate::domain::models::Config;

#[derive(Debug, Serialize)]
pub struct ClearOutput {
    pub live_removed: Option<usize>,
    pub schedule_removed: Option<usize>,
}

impl CommandOutput for ClearOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if let Some(n) = self.live_removed {
            lines.push(format!("Removed {n} live prediction(s)"));
        }
        if let Some(n) = self.schedule_removed {
            lines.push(format!("Removed {n} scheduled prediction(s)"));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ClearArgs, config: &Config, json: bool) -> Result<()> {
    let mut engine = open_engine(config, Arc::new(ConsoleTransport::new())).await?;

    let live_removed = if args.live || args.all {
        Some(engine.clear_live().await?)
    } else {
        None
    };
    let schedule_removed = if args.schedule || args.all {
        Some(engine.clear_schedule().await?)
    } else {
        None
    };

    output(
        &ClearOutput {
            live_removed,
            schedule_removed,
        },
        json,
    );
    Ok(())
}
