//! Engine persistence through the YAML record store.

mod common;

use std::sync::Arc;

use cardsignal::adapters::{MemoryTransport, YamlStore};
use cardsignal::domain::models::{ImportMode, LiveSnapshot, Outcome, ScheduleRow, ScheduleSnapshot};
use cardsignal::{Config, InboundMessage, PredictionEngine, PredictionStatus, RecordStore};

fn config_in(dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.store.live_path = dir.join("live_predictions.yaml").display().to_string();
    config.store.schedule_path = dir.join("schedule_predictions.yaml").display().to_string();
    config
}

async fn open(config: &Config, transport: Arc<MemoryTransport>) -> PredictionEngine {
    PredictionEngine::open(
        config,
        transport,
        Arc::new(YamlStore::<LiveSnapshot>::new(&config.store.live_path)),
        Arc::new(YamlStore::<ScheduleSnapshot>::new(&config.store.schedule_path)),
    )
    .await
    .expect("engine should open")
}

fn rows(ids: &[u64]) -> Vec<ScheduleRow> {
    ids.iter()
        .map(|&identifier| ScheduleRow {
            identifier,
            scheduled_at: "2025-03-01 10:00:00".to_string(),
            outcome: Outcome::Banker,
        })
        .collect()
}

#[tokio::test]
async fn test_state_survives_restart() {
    common::setup_test_logging();
    let dir = common::temp_dir();
    let config = config_in(dir.path());
    let transport = Arc::new(MemoryTransport::new());

    {
        let mut engine = open(&config, transport.clone()).await;
        engine.set_max_offset(4).await.unwrap();
        engine
            .handle(&InboundMessage::new("#N881. 7(A♠6♠) ✅ 7(3♦4♣) #T12"))
            .await;
    }

    let mut engine = open(&config, transport.clone()).await;
    assert_eq!(engine.tunables().max_offset, 4);
    let record = engine.live().get("882").unwrap();
    assert_eq!(record.max_offset, 4);
    assert!(record.external_ref.is_some());

    engine
        .handle(&InboundMessage::new("#N882. 9(K♠9♦) ✅ 2(A♣A♦)"))
        .await;
    let stored = YamlStore::<LiveSnapshot>::new(&config.store.live_path)
        .load()
        .await
        .unwrap();
    assert_eq!(
        stored.predictions["882"].status,
        PredictionStatus::Success { offset: 0 }
    );
}

#[tokio::test]
async fn test_replace_import_backs_up_previous_schedule() {
    let dir = common::temp_dir();
    let config = config_in(dir.path());
    let mut engine = open(&config, Arc::new(MemoryTransport::new())).await;

    engine.import_schedule(&rows(&[10, 20]), ImportMode::Replace).await.unwrap();
    let summary = engine.import_schedule(&rows(&[30]), ImportMode::Replace).await.unwrap();
    assert_eq!(summary.replaced, 2);

    let backups: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with("schedule_predictions_backup_"))
        .collect();
    assert_eq!(backups.len(), 1);

    let stored = YamlStore::<ScheduleSnapshot>::new(&config.store.schedule_path)
        .load()
        .await
        .unwrap();
    assert_eq!(stored.entries.len(), 1);
    assert!(stored.entries.contains_key("30"));
}

#[tokio::test]
async fn test_merge_import_does_not_back_up() {
    let dir = common::temp_dir();
    let config = config_in(dir.path());
    let mut engine = open(&config, Arc::new(MemoryTransport::new())).await;

    engine.import_schedule(&rows(&[10]), ImportMode::Replace).await.unwrap();
    engine.import_schedule(&rows(&[30]), ImportMode::Merge).await.unwrap();

    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    assert!(names.iter().all(|n| !n.contains("_backup_")));
    assert_eq!(engine.schedule().len(), 2);
}
