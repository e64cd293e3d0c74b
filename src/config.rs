//! Configuration loading using Figment.
//!
//! Strongly-typed settings for the upload pipeline, loaded from:
//! 1. a `photobooth.toml` file (base configuration)
//! 2. environment variables prefixed with `PHOTOBOOTH_` (section and key
//!    separated by `__`, e.g. `PHOTOBOOTH_UPLOAD__DRIVE_FOLDER`)
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration with all uploads switched off except the local
//! archive.
//!
//! # Example
//! ```no_run
//! use photobooth_upload::config::Settings;
//!
//! # fn main() -> Result<(), photobooth_upload::error::UploadError> {
//! let settings = Settings::load()?;
//! settings.validate()?;
//! println!("Uploading to drive: {}", settings.upload.to_drive);
//! # Ok(())
//! # }
//! ```

use crate::error::{UploadError, UploadResult};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level settings for the upload pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,
    /// Photo capture output settings
    #[serde(default)]
    pub photo: PhotoConfig,
    /// Upload destination settings
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Photo output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoConfig {
    /// Number of pictures taken per capture session
    #[serde(default = "default_num_pics")]
    pub num_pics: u32,
    /// Directory the archive uploader copies finished pictures into
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,
    /// File extension of captured images
    #[serde(default = "default_image_ext")]
    pub image_ext: String,
}

/// Upload destination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Whether to upload captured pictures to the cloud drive
    #[serde(default)]
    pub to_drive: bool,
    /// Whether to copy captured pictures into the local archive
    #[serde(default = "default_true")]
    pub to_archive: bool,
    /// Name of the drive folder to upload into
    #[serde(default)]
    pub drive_folder: String,
    /// Account that owns the drive
    #[serde(default)]
    pub google_account: String,
    /// Directory holding client secrets and cached credentials
    #[serde(default = "default_secrets_dir")]
    pub secrets_dir: PathBuf,
}

fn default_app_name() -> String {
    "Photobooth".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_num_pics() -> u32 {
    4
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("archive")
}

fn default_image_ext() -> String {
    "jpg".to_string()
}

fn default_true() -> bool {
    true
}

/// Default secrets location under the user's config directory, falling back
/// to a relative path when the platform reports none.
pub fn default_secrets_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("photobooth")
        .join("secrets")
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            num_pics: default_num_pics(),
            archive_dir: default_archive_dir(),
            image_ext: default_image_ext(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            to_drive: false,
            to_archive: true,
            drive_folder: String::new(),
            google_account: String::new(),
            secrets_dir: default_secrets_dir(),
        }
    }
}

impl Settings {
    /// Load configuration from `photobooth.toml` and environment variables.
    ///
    /// Environment variables override file values with the `PHOTOBOOTH_`
    /// prefix and `__` between section and key, e.g.
    /// `PHOTOBOOTH_APPLICATION__LOG_LEVEL=debug`.
    pub fn load() -> UploadResult<Self> {
        Self::load_from("photobooth.toml")
    }

    /// Load configuration from a specific file path.
    pub fn load_from<P: AsRef<Path>>(path: P) -> UploadResult<Self> {
        let settings: Settings = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("PHOTOBOOTH_").split("__"))
            .extract()?;
        Ok(settings)
    }

    /// Validate configuration after loading.
    pub fn validate(&self) -> UploadResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.as_str()) {
            return Err(UploadError::Configuration(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.photo.num_pics == 0 {
            return Err(UploadError::Configuration(
                "num_pics must be greater than 0".to_string(),
            ));
        }

        if self.upload.to_drive && self.upload.drive_folder.trim().is_empty() {
            return Err(UploadError::Configuration(
                "Drive upload is enabled but no drive_folder is configured".to_string(),
            ));
        }

        if self.upload.to_archive && self.photo.archive_dir.as_os_str().is_empty() {
            return Err(UploadError::Configuration(
                "Archive upload is enabled but archive_dir is empty".to_string(),
            ));
        }

        Ok(())
    }
}
