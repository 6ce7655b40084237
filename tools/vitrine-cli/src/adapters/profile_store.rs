//! Saved customer profile in a JSON file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use vitrine_commerce::checkout::PersonalInfo;
use vitrine_commerce::ports::PersonalInfoStore;
use vitrine_commerce::StoreError;

/// Profile stored as one pretty-printed JSON document.
pub struct JsonProfileStore {
    path: PathBuf,
}

impl JsonProfileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PersonalInfoStore for JsonProfileStore {
    async fn get(&self) -> Result<Option<PersonalInfo>, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Storage(format!("read profile: {}", e))),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Write to a temp file, flush, then rename over the target.
    async fn save(&self, info: &PersonalInfo) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(info)?;

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| StoreError::Storage(format!("create profile dir: {}", e)))?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| StoreError::Storage(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| StoreError::Storage(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| StoreError::Storage(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StoreError::Storage(format!("atomic rename failed: {}", e)))?;
        debug!(path = %self.path.display(), "profile saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Storage(format!("remove profile: {}", e))),
        }
    }
}
