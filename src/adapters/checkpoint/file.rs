//! Filesystem checkpoint store.
//!
//! One JSON file per completed step, grouped by run:
//!
//! ```text
//! {base_path}/
//! ├── process-chat-message_3Aevt-1/
//! │   ├── analyze-message.json
//! │   └── update-memory.json
//! └── generate-activity-recommendations_3Aevt-2/
//!     └── get-user-context.json
//! ```
//!
//! Run ids and step names are escaped into file names with `encode_segment`,
//! which maps distinct ids to distinct names even on case-insensitive
//! filesystems.
//!
//! Writes go to `{step}.json.tmp` first and are renamed into place, so a
//! crash mid-write never leaves a half-written checkpoint behind.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::foundation::RunId;
use crate::domain::workflow::Checkpoint;
use crate::ports::{CheckpointError, CheckpointStore};

#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    base_path: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn run_dir(&self, run_id: &RunId) -> PathBuf {
        self.base_path.join(encode_segment(run_id.as_str()))
    }

    fn step_path(&self, run_id: &RunId, step: &str) -> PathBuf {
        self.run_dir(run_id).join(format!("{}.json", encode_segment(step)))
    }

    fn temp_path(&self, run_id: &RunId, step: &str) -> PathBuf {
        self.run_dir(run_id).join(format!("{}.json.tmp", encode_segment(step)))
    }
}

/// Escapes `raw` into a single path segment.
///
/// Lowercase ASCII letters, digits and `-` are kept. Every other byte,
/// `_` and uppercase letters included, becomes `_` plus two uppercase hex
/// digits. The mapping is injective.
pub(crate) fn encode_segment(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'a'..=b'z' | b'0'..=b'9' | b'-' => encoded.push(char::from(byte)),
            _ => encoded.push_str(&format!("_{:02X}", byte)),
        }
    }
    encoded
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn load(&self, run_id: &RunId, step: &str) -> Result<Option<Checkpoint>, CheckpointError> {
        let path = self.step_path(run_id, step);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CheckpointError::Io(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| CheckpointError::Corrupt {
                step: step.to_string(),
                reason: e.to_string(),
            })
    }

    async fn save(&self, run_id: &RunId, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        let body = serde_json::to_vec_pretty(checkpoint).map_err(|e| {
            CheckpointError::SerializationFailed {
                step: checkpoint.step.clone(),
                reason: e.to_string(),
            }
        })?;

        let dir = self.run_dir(run_id);
        fs::create_dir_all(&dir).await.map_err(|e| {
            CheckpointError::Io(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let temp = self.temp_path(run_id, &checkpoint.step);
        let mut file = fs::File::create(&temp).await?;
        file.write_all(&body).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp, self.step_path(run_id, &checkpoint.step)).await?;
        Ok(())
    }

    async fn clear_run(&self, run_id: &RunId) -> Result<usize, CheckpointError> {
        let dir = self.run_dir(run_id);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if name.to_string_lossy().ends_with(".json") {
                removed += 1;
            }
        }

        fs::remove_dir_all(&dir).await?;
        Ok(removed)
    }
}
