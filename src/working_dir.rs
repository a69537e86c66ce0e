use crate::AppResult;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::sync::{Mutex, MutexGuard};

// The working directory is process global, so only one guard may hold it at a time.
static WORKING_DIR_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Switches the process working directory and restores it when dropped.
#[derive(Debug)]
pub struct WorkingDirGuard {
    saved: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl WorkingDirGuard {
    pub async fn enter(dir: &Path) -> AppResult<Self> {
        let lock = WORKING_DIR_LOCK.lock().await;
        let saved = std::env::current_dir()?;
        std::env::set_current_dir(dir)?;
        tracing::debug!(dir = %dir.display(), "Entered working directory");
        Ok(Self { saved, _lock: lock })
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(err) = std::env::set_current_dir(&self.saved) {
            tracing::warn!(
                "Failed to restore working directory {}: {}",
                self.saved.display(),
                err
            );
        }
    }
}

#[cfg(test)]
/// Waits until no guard is active and returns the working directory at that point.
pub async fn settled_working_dir() -> AppResult<PathBuf> {
    let _lock = WORKING_DIR_LOCK.lock().await;
    Ok(std::env::current_dir()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn restores_on_drop() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let temp_dir = tempfile::TempDir::with_prefix("working_dir_tests_restore")?;
        let before = settled_working_dir().await?;
        {
            let _guard = WorkingDirGuard::enter(temp_dir.path()).await?;
            assert_eq!(
                std::env::current_dir()?.canonicalize()?,
                temp_dir.path().canonicalize()?
            );
        }
        assert_eq!(settled_working_dir().await?, before);
        Ok(())
    }

    #[tokio::test]
    async fn missing_dir_leaves_working_dir_untouched(
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let before = settled_working_dir().await?;
        assert!(WorkingDirGuard::enter(Path::new("/nonexistent/pdf2png"))
            .await
            .is_err());
        assert_eq!(settled_working_dir().await?, before);
        Ok(())
    }
}
