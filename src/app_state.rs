use crate::config::AppConfig;
use crate::errors::AppError;
use crate::file_selector::validate_pdf_path;
use crate::pipeline::ConversionRequest;
use crate::session::Session;
use crate::settings::{ConversionSettings, SettingsResponse};
use crate::AppResult;
use std::path::{Path, PathBuf};

/// Everything the application keeps between user actions.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub session: Session,
    pub settings: ConversionSettings,
    loaded_file: Option<PathBuf>,
}

impl AppState {
    /// An unreadable session file is logged and replaced by an empty session.
    pub async fn load(config: AppConfig) -> AppResult<Self> {
        let session_path = config.session_file_path();
        let session = match Session::load(&session_path).await {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(
                    "Ignoring unreadable session file {}: {}",
                    session_path.display(),
                    err
                );
                Session::default()
            }
        };
        let settings = config.default_settings();
        Ok(Self {
            config,
            session,
            settings,
            loaded_file: None,
        })
    }

    /// Folder the file-open prompt starts in.
    pub fn initial_dir(&self) -> Option<PathBuf> {
        if !self.config.remember_last_folder {
            return None;
        }
        self.session.last_folder().filter(|dir| dir.is_dir())
    }

    pub fn load_file(&mut self, path: &Path) -> AppResult<&Path> {
        let path = validate_pdf_path(path)?;
        let path = std::fs::canonicalize(&path)?;
        self.session.remember(&path)?;
        Ok(self.loaded_file.insert(path).as_path())
    }

    #[cfg(test)]
    pub fn loaded_file(&self) -> Option<&Path> {
        self.loaded_file.as_deref()
    }

    pub fn clear_loaded(&mut self) {
        self.loaded_file = None;
    }

    /// Returns whether the settings changed.
    pub fn apply_settings(&mut self, response: SettingsResponse) -> bool {
        match response {
            SettingsResponse::Accepted(settings) => {
                self.settings = settings;
                true
            }
            SettingsResponse::Cancelled => false,
        }
    }

    pub fn conversion_request(&self, overwrite: bool) -> AppResult<ConversionRequest> {
        let source = self
            .loaded_file
            .clone()
            .ok_or_else(|| AppError::invalid_input("No PDF file is loaded"))?;
        Ok(ConversionRequest {
            source,
            settings: self.settings,
            overwrite,
        })
    }

    /// Persists the session when enabled in the config, returns whether it was written.
    pub async fn save_session(&self) -> AppResult<bool> {
        if !self.config.save_last_session {
            return Ok(false);
        }
        self.session
            .save(&self.config.session_file_path())
            .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsoleSection;
    use crate::pipeline::ConversionPipeline;
    use crate::rasterizers::fake::FakeRasterizer;
    use crate::reporter::AppReporter;
    use console::Term;

    fn test_config(root: &Path) -> AppConfig {
        AppConfig {
            root: root.to_path_buf(),
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn session_restores_initial_dir() -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    {
        let config_dir = tempfile::TempDir::with_prefix("app_state_tests_config")?;
        let plans_dir = tempfile::TempDir::with_prefix("app_state_tests_plans")?;
        let source = plans_dir.path().join("floor.pdf");
        std::fs::write(&source, "%PDF-1.4")?;

        let mut state = AppState::load(test_config(config_dir.path())).await?;
        assert_eq!(state.initial_dir(), None);
        state.load_file(&source)?;

        let term = Term::stdout();
        let reporter = AppReporter::new(&term, &ConsoleSection::default(), false);
        let pipeline = ConversionPipeline::new(FakeRasterizer::letter(), reporter);
        pipeline.run(&state.conversion_request(false)?).await?;
        assert!(state.save_session().await?);

        let saved = Session::load(&config_dir.path().join("session.json")).await?;
        let plans_folder = plans_dir.path().canonicalize()?;
        assert_eq!(saved.last_folder(), Some(plans_folder.clone()));
        assert_eq!(saved.last_loaded_file, "floor.pdf");

        let restored = AppState::load(test_config(config_dir.path())).await?;
        assert_eq!(restored.initial_dir(), Some(plans_folder));
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_session_falls_back_to_empty(
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let config_dir = tempfile::TempDir::with_prefix("app_state_tests_corrupt")?;
        let session_path = config_dir.path().join("session.json");
        std::fs::write(&session_path, "{ not json")?;

        let state = AppState::load(test_config(config_dir.path())).await?;
        assert_eq!(state.session.last_folder(), None);
        assert_eq!(state.initial_dir(), None);

        Session::clear(&state.config.session_file_path()).await?;
        assert!(!session_path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn forgets_folder_when_disabled() -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    {
        let config_dir = tempfile::TempDir::with_prefix("app_state_tests_forget")?;
        let mut config = test_config(config_dir.path());
        config.remember_last_folder = false;
        config.save_last_session = false;

        let mut state = AppState::load(config).await?;
        state.session.remember(&config_dir.path().join("floor.pdf"))?;
        assert_eq!(state.initial_dir(), None);
        assert!(!state.save_session().await?);
        assert!(!config_dir.path().join("session.json").exists());
        Ok(())
    }

    #[tokio::test]
    async fn settings_and_loaded_file() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let config_dir = tempfile::TempDir::with_prefix("app_state_tests_settings")?;
        let mut state = AppState::load(test_config(config_dir.path())).await?;

        assert!(matches!(
            state.conversion_request(false),
            Err(AppError::InvalidInput { .. })
        ));
        assert!(matches!(
            state.load_file(&config_dir.path().join("notes.txt")),
            Err(AppError::InvalidInput { .. })
        ));

        assert!(!state.apply_settings(SettingsResponse::Cancelled));
        assert_eq!(state.settings.max_width, 9600);
        assert!(state.apply_settings(SettingsResponse::Accepted(ConversionSettings {
            max_width: 5000,
            angle: 0.0
        })));
        assert_eq!(state.settings.max_width, 5000);

        let source = config_dir.path().join("plan.pdf");
        std::fs::write(&source, "%PDF-1.4")?;
        state.load_file(&source)?;
        assert_eq!(state.conversion_request(true)?.settings.max_width, 5000);
        state.clear_loaded();
        assert_eq!(state.loaded_file(), None);
        Ok(())
    }
}
