//! Common test utilities for integration tests
//!
//! Provides an engine wired to in-memory adapters plus small helpers used
//! across the integration test files.

use std::sync::Arc;

use cardsignal::adapters::{MemoryStore, MemoryTransport, TransportEffect};
use cardsignal::domain::models::{LiveSnapshot, ScheduleSnapshot};
use cardsignal::{Config, InboundMessage, PredictionEngine, ProcessReport};
use tempfile::TempDir;

/// Create a temporary directory for test isolation
///
/// Returns a TempDir that will be cleaned up when dropped.
#[allow(dead_code)]
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Engine over in-memory stores and transport.
#[allow(dead_code)]
pub struct Harness {
    pub config: Config,
    pub engine: PredictionEngine,
    pub transport: Arc<MemoryTransport>,
    pub live_store: Arc<MemoryStore<LiveSnapshot>>,
    pub schedule_store: Arc<MemoryStore<ScheduleSnapshot>>,
}

#[allow(dead_code)]
impl Harness {
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let transport = Arc::new(MemoryTransport::new());
        let live_store = Arc::new(MemoryStore::new());
        let schedule_store = Arc::new(MemoryStore::new());
        let engine = PredictionEngine::open(
            &config,
            transport.clone(),
            live_store.clone(),
            schedule_store.clone(),
        )
        .await
        .expect("engine should open over empty stores");
        Self {
            config,
            engine,
            transport,
            live_store,
            schedule_store,
        }
    }

    /// Drop the engine and load a fresh one from the same stores.
    pub async fn reopen(self) -> Self {
        let engine = PredictionEngine::open(
            &self.config,
            self.transport.clone(),
            self.live_store.clone(),
            self.schedule_store.clone(),
        )
        .await
        .expect("engine should reopen");
        Self { engine, ..self }
    }

    pub async fn send(&mut self, text: &str) -> ProcessReport {
        self.engine.handle(&InboundMessage::new(text)).await
    }

    pub async fn send_edit(&mut self, text: &str) -> ProcessReport {
        self.engine.handle(&InboundMessage::edited(text)).await
    }

    pub async fn delivered_texts(&self) -> Vec<String> {
        texts(self.transport.delivered().await)
    }

    pub async fn edited_texts(&self) -> Vec<String> {
        texts(self.transport.edits().await)
    }
}

fn texts(effects: Vec<TransportEffect>) -> Vec<String> {
    effects.iter().map(|e| e.text().to_string()).collect()
}
