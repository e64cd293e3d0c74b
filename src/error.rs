//! Custom error types for the crate.
//!
//! This module defines the primary error type, `UploadError`, used across the
//! upload pipeline. Using the `thiserror` crate, it gives every failure mode a
//! single home:
//!
//! - **`Config`**: wraps `figment` errors from parsing the configuration file
//!   or environment overrides.
//! - **`Configuration`**: semantic configuration problems that parse fine but
//!   are logically wrong (e.g. drive upload enabled with no folder named).
//!   Caught by the validation step.
//! - **`Io`**: standard `std::io::Error`, covering file copies, credential
//!   cache reads, and worker thread spawning.
//! - **`Serialization`**: `serde_json` failures when reading or writing the
//!   cached credentials file.
//! - **`Auth`**: failures reported by the injected authorization flow.
//! - **`Drive`**: failures reported by the injected drive client.
//! - **`FolderNotFound`**: the configured destination folder does not exist on
//!   the drive; the operator has to create it, so it gets its own variant with
//!   an actionable message.
//! - **`Tracing`**: logging initialization problems.
//!
//! With `#[from]`, `UploadError` is created seamlessly from the underlying
//! error types, keeping `?` usable throughout the crate.

use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type UploadResult<T> = std::result::Result<T, UploadError>;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Configuration validation error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Drive error: {0}")]
    Drive(String),

    #[error("Invalid folder: [{0}]. Please create this folder on the drive")]
    FolderNotFound(String),

    #[error("Tracing initialization error: {0}")]
    Tracing(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_not_found_names_the_folder() {
        let err = UploadError::FolderNotFound("Photobooth".into());
        assert!(err.to_string().contains("[Photobooth]"));
    }

    #[test]
    fn io_errors_convert_with_question_mark() {
        fn fails() -> UploadResult<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?;
            Ok(())
        }
        match fails() {
            Err(UploadError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
