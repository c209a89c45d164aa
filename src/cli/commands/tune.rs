//! `tune`: show or change prediction tunables.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use super::open_engine;
use crate::adapters::ConsoleTransport;
use crate::cli::output::{output, CommandOutput};
use crate::cli::types::TuneArgs;
use crate::domain::models::{Config, Tunables};

#[derive(Debug, Serialize)]
pub struct TuneOutput {
    #[serde(flatten)]
    pub tunables: Tunables,
    pub changed: bool,
}

impl CommandOutput for TuneOutput {
    fn to_human(&self) -> String {
        let verb = if self.changed { "updated" } else { "current" };
        format!(
            "Tunables {verb}: offset_a={} max_offset={}",
            self.tunables.offset_a, self.tunables.max_offset
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: TuneArgs, config: &Config, json: bool) -> Result<()> {
    let mut engine = open_engine(config, Arc::new(ConsoleTransport::new())).await?;
    let changed = args.offset_a.is_some() || args.max_offset.is_some();

    // Validate before applying anything so a bad ceiling leaves both values alone.
    if let Some(max_offset) = args.max_offset {
        Tunables::check_max_offset(max_offset)?;
    }
    if let Some(offset_a) = args.offset_a {
        engine.set_offset_a(offset_a).await?;
    }
    if let Some(max_offset) = args.max_offset {
        engine.set_max_offset(max_offset).await?;
    }

    output(
        &TuneOutput {
            tunables: engine.tunables(),
            changed,
        },
        json,
    );
    Ok(())
}
