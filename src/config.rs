use crate::errors::AppError;
use crate::settings::{ConversionSettings, MaxWidthBounds};
use crate::AppResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "pdf2png";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Application configuration, read from a JSON file with upper snake case keys.
///
/// Every key is optional; unknown keys such as window geometry or icon paths are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct AppConfig {
    pub app: AppSection,
    pub remember_last_folder: bool,
    pub auto_start: bool,
    pub save_last_session: bool,
    pub last_session_file: PathBuf,
    pub console: ConsoleSection,
    pub conversion: ConversionSection,
    pub tools: ToolsSection,
    /// Folder relative paths in this config resolve against.
    #[serde(skip)]
    pub root: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct AppSection {
    pub title: String,
    pub sounds: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct ConsoleSection {
    /// Uses `{time}` and `{message}` placeholders.
    pub msg_format: String,
    pub limit_messages_console: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct ConversionSection {
    pub max_width: u32,
    pub angle: f64,
    pub max_width_min: u32,
    pub max_width_max: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct ToolsSection {
    pub magick_binary: PathBuf,
    /// ImageMagick 6 style `identify`/`convert` commands instead of `magick`.
    pub legacy_commands: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            remember_last_folder: true,
            auto_start: false,
            save_last_session: true,
            last_session_file: PathBuf::from("session.json"),
            console: ConsoleSection::default(),
            conversion: ConversionSection::default(),
            tools: ToolsSection::default(),
            root: default_config_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            title: "PDF to PNG".to_string(),
            sounds: true,
        }
    }
}

impl Default for ConsoleSection {
    fn default() -> Self {
        Self {
            msg_format: "[{time}] {message}".to_string(),
            limit_messages_console: 1000,
        }
    }
}

impl Default for ConversionSection {
    fn default() -> Self {
        Self {
            max_width: 9600,
            angle: -90.0,
            max_width_min: 1920,
            max_width_max: 12500,
        }
    }
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            magick_binary: PathBuf::from("magick"),
            legacy_commands: false,
        }
    }
}

pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME))
}

impl AppConfig {
    /// Loads the config at `path`, or the default location when none is given.
    ///
    /// An explicitly given file must exist; a missing default file yields the defaults.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        match path {
            Some(path) => {
                if !path.is_file() {
                    return Err(AppError::ConfigError {
                        message: format!("Config file {} not found", path.display()),
                    });
                }
                Self::read_from(path)
            }
            None => match default_config_dir() {
                Some(dir) if dir.join(CONFIG_FILE_NAME).is_file() => {
                    Self::read_from(&dir.join(CONFIG_FILE_NAME))
                }
                _ => Ok(Self::default()),
            },
        }
    }

    fn read_from(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: AppConfig =
            serde_json::from_str(&content).map_err(|e| AppError::ConfigError {
                message: format!("Failed to parse {}: {}", path.display(), e),
            })?;
        config.root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.conversion.max_width_min == 0
            || self.conversion.max_width_min > self.conversion.max_width_max
        {
            return Err(AppError::ConfigError {
                message: format!(
                    "Invalid max width bounds {}..={}",
                    self.conversion.max_width_min, self.conversion.max_width_max
                ),
            });
        }
        if !self.conversion.angle.is_finite() {
            return Err(AppError::ConfigError {
                message: "Default angle must be a finite number".to_string(),
            });
        }
        Ok(())
    }

    pub fn session_file_path(&self) -> PathBuf {
        if self.last_session_file.is_absolute() {
            self.last_session_file.clone()
        } else {
            self.root.join(&self.last_session_file)
        }
    }

    pub fn max_width_bounds(&self) -> MaxWidthBounds {
        MaxWidthBounds {
            min: self.conversion.max_width_min,
            max: self.conversion.max_width_max,
        }
    }

    /// Conversion settings the application starts with.
    ///
    /// A configured default outside the bounds is clamped into them.
    pub fn default_settings(&self) -> ConversionSettings {
        let bounds = self.max_width_bounds();
        ConversionSettings {
            max_width: self.conversion.max_width.clamp(bounds.min, bounds.max),
            angle: self.conversion.angle,
        }
    }
}
