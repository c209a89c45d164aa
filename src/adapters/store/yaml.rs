//! YAML file record store.
//!
//! Each snapshot is written whole to a temporary sibling and renamed over
//! the target, so a crash mid-write leaves the previous snapshot intact.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Local;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::RecordStore;

pub struct YamlStore<T> {
    path: PathBuf,
    _snapshot: PhantomData<fn() -> T>,
}

impl<T> YamlStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _snapshot: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("yaml.tmp")
    }

    /// `<stem>_backup_<YYYYMMDD_HHMMSS>.yaml` next to the store file.
    fn backup_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map_or_else(|| "store".into(), |s| s.to_string_lossy());
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        self.path.with_file_name(format!("{stem}_backup_{stamp}.yaml"))
    }
}

#[async_trait]
impl<T> RecordStore<T> for YamlStore<T>
where
    T: Serialize + DeserializeOwned + Default + Send + Sync,
{
    async fn load(&self) -> DomainResult<T> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored snapshot, starting empty");
                return Ok(T::default());
            }
            Err(err) => return Err(err.into()),
        };
        if raw.trim().is_empty() {
            return Ok(T::default());
        }
        serde_yaml::from_str(&raw).map_err(|err| {
            DomainError::SerializationError(format!("{}: {err}", self.path.display()))
        })
    }

    async fn save(&self, snapshot: &T) -> DomainResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let payload = serde_yaml::to_string(snapshot)?;
        let tmp = self.tmp_path();
        {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(payload.as_bytes()).await?;
            file.sync_all().await?;
        }
        if let Err(err) = tokio::fs::rename(&tmp, &self.path).await {
            warn!(path = %self.path.display(), error = %err, "rename failed, retrying after remove");
            let _ = tokio::fs::remove_file(&self.path).await;
            tokio::fs::rename(&tmp, &self.path).await?;
        }
        Ok(())
    }

    async fn backup(&self) -> DomainResult<Option<String>> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(None);
        }
        let target = self.backup_path();
        tokio::fs::copy(&self.path, &target).await?;
        Ok(Some(target.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{LiveSnapshot, Outcome, PredictionRecord, Tunables};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_loads_default() {
        let dir = TempDir::new().unwrap();
        let store: YamlStore<LiveSnapshot> = YamlStore::new(dir.path().join("live.yaml"));
        assert_eq!(store.load().await.unwrap(), LiveSnapshot::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store: YamlStore<LiveSnapshot> = YamlStore::new(dir.path().join("nested/live.yaml"));

        let mut snapshot = LiveSnapshot {
            tunables: Some(Tunables {
                offset_a: 2,
                max_offset: 4,
            }),
            ..LiveSnapshot::default()
        };
        let record = PredictionRecord::new(882, Outcome::Banker, 4);
        snapshot.predictions.insert(record.key.clone(), record);

        store.save(&snapshot).await.unwrap();
        assert!(!store.tmp_path().exists());
        assert_eq!(store.load().await.unwrap(), snapshot);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("live.yaml");
        std::fs::write(&path, "predictions: [not, a, map").unwrap();
        let store: YamlStore<LiveSnapshot> = YamlStore::new(&path);
        assert!(matches!(
            store.load().await,
            Err(DomainError::SerializationError(_))
        ));
    }

    #[tokio::test]
    async fn test_backup_copies_current_file() {
        let dir = TempDir::new().unwrap();
        let store: YamlStore<LiveSnapshot> =
            YamlStore::new(dir.path().join("schedule_predictions.yaml"));
        assert!(store.backup().await.unwrap().is_none());

        store.save(&LiveSnapshot::default()).await.unwrap();
        let backup = store.backup().await.unwrap().unwrap();
        assert!(backup.contains("schedule_predictions_backup_"));
        assert!(Path::new(&backup).exists());
    }
}
