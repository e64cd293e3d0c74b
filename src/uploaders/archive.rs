//! Local archive uploader.
//!
//! The simplest concrete backend: copies each captured picture into a local
//! archive directory (often a mounted share or USB stick on the booth).
//! Needs no network and no credentials, which also makes it the reference
//! worker for exercising the background processor end to end.

use crate::error::{UploadError, UploadResult};
use crate::processor::{BatchWorker, ParamStore};
use std::fs;
use std::path::PathBuf;

/// Copies picture batches into an archive directory.
pub struct ArchiveUploader {
    archive_dir: PathBuf,
}

impl ArchiveUploader {
    pub fn new(archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            archive_dir: archive_dir.into(),
        }
    }
}

impl BatchWorker for ArchiveUploader {
    type Item = PathBuf;

    fn pre_work(&self, _params: &ParamStore, _batch: &[PathBuf]) -> bool {
        if self.archive_dir.as_os_str().is_empty() {
            tracing::warn!("no archive directory configured, rejecting batch");
            return false;
        }
        true
    }

    fn process(&self, _params: &ParamStore, batch: Vec<PathBuf>) -> UploadResult<()> {
        fs::create_dir_all(&self.archive_dir)?;

        for path in &batch {
            let file_name = path.file_name().ok_or_else(|| {
                UploadError::Configuration(format!(
                    "cannot archive '{}': no file name component",
                    path.display()
                ))
            })?;
            let dest = self.archive_dir.join(file_name);
            tracing::info!(file = %path.display(), dest = %dest.display(), "archiving");
            fs::copy(path, &dest)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_batch_into_archive() {
        let src = tempfile::tempdir().unwrap();
        let archive = tempfile::tempdir().unwrap();
        let archive_dir = archive.path().join("booth");

        let a = src.path().join("a.jpg");
        let b = src.path().join("b.jpg");
        fs::write(&a, b"picture a").unwrap();
        fs::write(&b, b"picture b").unwrap();

        let uploader = ArchiveUploader::new(&archive_dir);
        let params = ParamStore::default();
        uploader.process(&params, vec![a, b]).unwrap();

        assert_eq!(fs::read(archive_dir.join("a.jpg")).unwrap(), b"picture a");
        assert_eq!(fs::read(archive_dir.join("b.jpg")).unwrap(), b"picture b");
    }

    #[test]
    fn missing_source_file_is_an_io_error() {
        let archive = tempfile::tempdir().unwrap();
        let uploader = ArchiveUploader::new(archive.path());
        let params = ParamStore::default();

        let result = uploader.process(&params, vec![PathBuf::from("/no/such/pic.jpg")]);
        assert!(matches!(result, Err(UploadError::Io(_))));
    }

    #[test]
    fn pre_work_rejects_empty_archive_dir() {
        let uploader = ArchiveUploader::new("");
        let params = ParamStore::default();
        assert!(!uploader.pre_work(&params, &[PathBuf::from("a.jpg")]));
    }

    #[test]
    fn path_without_file_name_is_rejected() {
        let archive = tempfile::tempdir().unwrap();
        let uploader = ArchiveUploader::new(archive.path());
        let params = ParamStore::default();

        let result = uploader.process(&params, vec![PathBuf::from("/")]);
        assert!(matches!(result, Err(UploadError::Configuration(_))));
    }
}
