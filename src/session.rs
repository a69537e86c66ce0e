use crate::errors::AppError;
use crate::AppResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Last used folder and file, restored across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Session {
    #[serde(rename = "LAST_FOLDER", default)]
    pub last_folder: String,
    #[serde(rename = "LAST_LOADED_FILE", default)]
    pub last_loaded_file: String,
}

impl Session {
    /// A missing session file yields an empty session.
    pub async fn load(path: &Path) -> AppResult<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Session::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string(self)?;
        tokio::fs::write(path, content).await?;
        tracing::debug!(path = %path.display(), "Session saved");
        Ok(())
    }

    pub async fn clear(path: &Path) -> AppResult<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Records `source` as the last loaded file.
    pub fn remember(&mut self, source: &Path) -> AppResult<()> {
        let file_name = source
            .file_name()
            .ok_or_else(|| AppError::SystemError {
                message: format!("No file name in {}", source.display()),
            })?
            .to_string_lossy()
            .to_string();
        let folder = source
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        self.last_folder = folder;
        self.last_loaded_file = file_name;
        Ok(())
    }

    pub fn last_folder(&self) -> Option<PathBuf> {
        if self.last_folder.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.last_folder))
        }
    }
}
