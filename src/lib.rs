//! # Photobooth Upload Library
//!
//! This crate is the upload pipeline of a photobooth: it takes batches of
//! freshly captured picture files and pushes them to their destinations
//! (cloud drive folder, local archive) on background worker threads, so the
//! interactive capture loop never waits on network or disk I/O.
//!
//! ## Crate Structure
//!
//! - **`processor`**: the concurrency core. A `BackgroundProcessor` runs one
//!   worker thread per uploader, draining a FIFO queue of batches with
//!   fail-isolated batch execution and type-safe shutdown.
//! - **`uploaders`**: concrete batch workers (`DriveUploader` over an
//!   injected `DriveClient`, `ArchiveUploader` for local copies) and the
//!   `UploadDispatcher` registry that owns and orchestrates them.
//! - **`auth`**: cached-credential lifecycle for the cloud capability; the
//!   interactive consent flow is injected via the `AuthFlow` trait.
//! - **`config`**: typed settings loaded from `photobooth.toml` plus
//!   `PHOTOBOOTH_`-prefixed environment overrides. See [`config::Settings`].
//! - **`logging`**: `tracing` initialization with env-filter level control.
//! - **`error`**: the crate-wide [`error::UploadError`] enum and
//!   [`error::UploadResult`] alias.

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod processor;
pub mod uploaders;

pub use error::{UploadError, UploadResult};
pub use processor::{BackgroundProcessor, BatchWorker, ParamStore};
pub use uploaders::UploadDispatcher;
