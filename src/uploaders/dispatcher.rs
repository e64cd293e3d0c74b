//! Upload orchestration.
//!
//! [`UploadDispatcher`] is the explicit registry that replaces per-uploader
//! global singletons: it owns one [`BackgroundProcessor`] per enabled upload
//! destination for the life of the process, fans captured batches out to all
//! of them, and shuts them down together. Each destination runs on its own
//! worker thread with its own queue; a slow drive upload never delays the
//! local archive copy.

use crate::config::Settings;
use crate::error::{UploadError, UploadResult};
use crate::processor::{BackgroundProcessor, BatchWorker};
use crate::uploaders::archive::ArchiveUploader;
use crate::uploaders::drive::{DriveClient, DriveUploader};
use std::path::PathBuf;

/// Object-safe facade over a [`BackgroundProcessor`] whose items are file
/// paths, so processors with different worker types can share one registry.
trait ImageSink: Send + Sync {
    fn submit(&self, batch: Vec<PathBuf>) -> bool;
    fn shutdown(&self);
    fn wait(&self);
    fn is_alive(&self) -> bool;
}

impl<W> ImageSink for BackgroundProcessor<W>
where
    W: BatchWorker<Item = PathBuf>,
{
    fn submit(&self, batch: Vec<PathBuf>) -> bool {
        self.kick_off(batch)
    }

    fn shutdown(&self) {
        self.cleanup();
    }

    fn wait(&self) {
        self.join();
    }

    fn is_alive(&self) -> bool {
        self.is_alive()
    }
}

/// Long-lived owner of the upload processors.
#[derive(Default)]
pub struct UploadDispatcher {
    sinks: Vec<(String, Box<dyn ImageSink>)>,
}

impl UploadDispatcher {
    /// Empty dispatcher; uploaders are added with [`register`].
    ///
    /// [`register`]: UploadDispatcher::register
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dispatcher with the uploaders the configuration enables.
    ///
    /// `drive_client` must be provided when `[upload] to_drive` is on; it is
    /// the injected cloud capability.
    pub fn from_settings<C: DriveClient>(
        settings: &Settings,
        drive_client: Option<C>,
    ) -> UploadResult<Self> {
        settings.validate()?;
        let mut dispatcher = Self::new();

        if settings.upload.to_archive {
            tracing::info!(dir = %settings.photo.archive_dir.display(), "archive upload enabled");
            let uploader = ArchiveUploader::new(settings.photo.archive_dir.clone());
            dispatcher.register("archive", BackgroundProcessor::new("archive", uploader)?);
        } else {
            tracing::info!("archive upload OFF in configuration");
        }

        if settings.upload.to_drive {
            tracing::info!(folder = %settings.upload.drive_folder, "drive upload enabled");
            let client = drive_client.ok_or_else(|| {
                UploadError::Configuration(
                    "Drive upload is enabled but no drive client was provided".to_string(),
                )
            })?;
            let uploader = DriveUploader::new(client, settings.upload.drive_folder.clone());
            dispatcher.register("drive", BackgroundProcessor::new("drive", uploader)?);
        } else {
            tracing::info!("drive upload OFF in configuration");
        }

        Ok(dispatcher)
    }

    /// Add a processor under a destination name.
    pub fn register<W>(&mut self, name: impl Into<String>, processor: BackgroundProcessor<W>)
    where
        W: BatchWorker<Item = PathBuf>,
    {
        self.sinks.push((name.into(), Box::new(processor)));
    }

    /// Fan one captured batch out to every registered destination.
    ///
    /// Each destination gets its own copy of the batch and accepts or rejects
    /// it independently (its `pre_work` runs on this thread). Returns how
    /// many destinations accepted.
    pub fn upload_images(&self, images: &[PathBuf]) -> usize {
        let mut accepted = 0;
        for (name, sink) in &self.sinks {
            if sink.submit(images.to_vec()) {
                tracing::info!(uploader = %name, count = images.len(), "batch accepted");
                accepted += 1;
            } else {
                tracing::warn!(uploader = %name, "batch rejected");
            }
        }
        accepted
    }

    /// Request graceful shutdown of every uploader. Idempotent, non-blocking.
    pub fn cleanup(&self) {
        for (name, sink) in &self.sinks {
            tracing::info!(uploader = %name, "shutting down");
            sink.shutdown();
        }
    }

    /// Block until every worker thread has exited. Call after [`cleanup`].
    ///
    /// [`cleanup`]: UploadDispatcher::cleanup
    pub fn join(&self) {
        for (_, sink) in &self.sinks {
            sink.wait();
        }
    }

    /// Names of destinations whose workers are still running.
    pub fn alive_uploaders(&self) -> Vec<&str> {
        self.sinks
            .iter()
            .filter(|(_, sink)| sink.is_alive())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uploaders::drive::FolderId;
    use std::path::Path;

    struct NullDrive;

    impl DriveClient for NullDrive {
        fn find_folder(&self, _name: &str) -> UploadResult<Option<FolderId>> {
            Ok(Some(FolderId("id".into())))
        }

        fn upload_file(&self, _path: &Path, _folder: &FolderId) -> UploadResult<()> {
            Ok(())
        }
    }

    #[test]
    fn from_settings_registers_enabled_uploaders() {
        let mut settings = Settings::default();
        settings.upload.to_drive = true;
        settings.upload.drive_folder = "Photobooth".into();

        let dispatcher = UploadDispatcher::from_settings(&settings, Some(NullDrive)).unwrap();
        assert_eq!(dispatcher.len(), 2);
        assert_eq!(dispatcher.alive_uploaders(), vec!["archive", "drive"]);

        dispatcher.cleanup();
        dispatcher.join();
        assert!(dispatcher.alive_uploaders().is_empty());
    }

    #[test]
    fn drive_enabled_without_client_is_an_error() {
        let mut settings = Settings::default();
        settings.upload.to_drive = true;
        settings.upload.drive_folder = "Photobooth".into();

        let result = UploadDispatcher::from_settings::<NullDrive>(&settings, None);
        assert!(matches!(result, Err(UploadError::Configuration(_))));
    }

    #[test]
    fn archive_only_when_drive_disabled() {
        let settings = Settings::default();
        let dispatcher = UploadDispatcher::from_settings::<NullDrive>(&settings, None).unwrap();
        assert_eq!(dispatcher.len(), 1);
        dispatcher.cleanup();
        dispatcher.join();
    }
}
