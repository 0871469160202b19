use crate::domain::model::Character;
use crate::domain::ports::SnapshotSink;
use crate::utils::error::{Result, SyncError};
use chrono::Local;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

const SNAPSHOT_PREFIX: &str = "characters";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%6f";

/// Writes each snapshot as its own pretty-printed JSON file under `base_dir`.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    base_dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn snapshot_path(&self, stamp: &str, attempt: usize) -> PathBuf {
        let file_name = if attempt == 0 {
            format!("{}_{}.json", SNAPSHOT_PREFIX, stamp)
        } else {
            format!("{}_{}-{}.json", SNAPSHOT_PREFIX, stamp, attempt)
        };
        self.base_dir.join(file_name)
    }

    fn write_snapshot(&self, payload: &[u8]) -> Result<PathBuf> {
        let stamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.write_snapshot_at(payload, &stamp)
    }

    fn write_snapshot_at(&self, payload: &[u8], stamp: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.base_dir).map_err(|source| SyncError::PersistenceError {
            path: self.base_dir.clone(),
            source,
        })?;

        // 先寫入同目錄的暫存檔，fsync 後再原子性地改名
        let mut staging: NamedTempFile = Builder::new()
            .prefix(".characters_")
            .suffix(".tmp")
            .tempfile_in(&self.base_dir)
            .map_err(|source| SyncError::PersistenceError {
                path: self.base_dir.clone(),
                source,
            })?;
        staging
            .write_all(payload)
            .and_then(|_| staging.as_file().sync_all())
            .map_err(|source| SyncError::PersistenceError {
                path: staging.path().to_path_buf(),
                source,
            })?;

        let mut attempt = 0;
        loop {
            let target = self.snapshot_path(stamp, attempt);
            match staging.persist_noclobber(&target) {
                Ok(_) => return Ok(target),
                Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                    staging = e.file;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(SyncError::PersistenceError {
                        path: target,
                        source: e.error,
                    })
                }
            }
        }
    }
}

impl SnapshotSink for FileSnapshotStore {
    async fn persist(&self, characters: &[Character]) -> Result<String> {
        let payload = serde_json::to_vec_pretty(characters)?;

        tracing::debug!(
            "Writing snapshot of {} characters ({} bytes) to {}",
            characters.len(),
            payload.len(),
            self.base_dir.display()
        );
        // 檔案寫入與 fsync 會阻塞，移到 blocking 執行緒
        let store = self.clone();
        let path = tokio::task::spawn_blocking(move || store.write_snapshot(&payload))
            .await
            .map_err(|e| SyncError::IoError(std::io::Error::other(e)))??;

        tracing::info!("💾 Snapshot saved to {}", path.display());
        Ok(path.display().to_string())
    }
}
