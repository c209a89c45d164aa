//! Command implementations.

pub mod clear;
pub mod import;
pub mod pending;
pub mod run;
pub mod status;
pub mod tune;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::adapters::YamlStore;
use crate::domain::models::{Config, LiveSnapshot, ScheduleSnapshot};
use crate::domain::ports::Transport;
use crate::services::PredictionEngine;

/// Build an engine over the configured YAML stores.
pub async fn open_engine(config: &Config, transport: Arc<dyn Transport>) -> Result<PredictionEngine> {
    let live = Arc::new(YamlStore::<LiveSnapshot>::new(&config.store.live_path));
    let schedule = Arc::new(YamlStore::<ScheduleSnapshot>::new(&config.store.schedule_path));
    PredictionEngine::open(config, transport, live, schedule)
        .await
        .context("Failed to load stored predictions")
}
