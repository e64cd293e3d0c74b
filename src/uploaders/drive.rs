//! Cloud drive uploader.
//!
//! [`DriveUploader`] is the batch worker that pushes captured pictures to a
//! cloud drive folder. The drive itself is an injected capability
//! ([`DriveClient`]); the REST calls, media encoding and OAuth plumbing stay
//! outside this crate. What lives here is the upload policy:
//!
//! - the destination folder comes from configuration, overridable per
//!   processor via the [`PARAM_DRIVE_FOLDER`] parameter
//! - the folder is resolved to an id once and cached until the configured
//!   name changes
//! - files in a batch are uploaded strictly in order, with per-file logging
//!
//! A missing destination folder is an error the operator must fix (create the
//! folder on the drive); the batch is abandoned and the worker moves on.

use crate::error::{UploadError, UploadResult};
use crate::processor::{BatchWorker, ParamStore};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Parameter name that overrides the configured destination folder.
pub const PARAM_DRIVE_FOLDER: &str = "drive_folder";

/// Opaque drive-side identifier of a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderId(pub String);

/// The injected cloud drive capability.
///
/// Implementations talk to the actual service. Calls are made from the worker
/// thread only, but the trait requires `Sync` because the worker value is
/// shared with the producer side.
pub trait DriveClient: Send + Sync + 'static {
    /// Look up a folder by name, returning its id if it exists.
    fn find_folder(&self, name: &str) -> UploadResult<Option<FolderId>>;

    /// Upload one local file into the given folder.
    fn upload_file(&self, path: &Path, folder: &FolderId) -> UploadResult<()>;
}

/// Uploads picture batches to a drive folder in the background.
pub struct DriveUploader<C: DriveClient> {
    client: C,
    folder_name: String,
    // (resolved name, id) so a folder change via params invalidates the cache
    resolved: Mutex<Option<(String, FolderId)>>,
}

impl<C: DriveClient> DriveUploader<C> {
    /// `folder_name` is the configured destination; it may be overridden at
    /// runtime through [`PARAM_DRIVE_FOLDER`].
    pub fn new(client: C, folder_name: impl Into<String>) -> Self {
        Self {
            client,
            folder_name: folder_name.into(),
            resolved: Mutex::new(None),
        }
    }

    fn destination(&self, params: &ParamStore) -> String {
        params
            .get(PARAM_DRIVE_FOLDER)
            .unwrap_or_else(|| self.folder_name.clone())
    }

    fn resolve_folder(&self, name: &str) -> UploadResult<FolderId> {
        let mut cached = self
            .resolved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some((cached_name, id)) = cached.as_ref() {
            if cached_name == name {
                return Ok(id.clone());
            }
        }

        let id = self
            .client
            .find_folder(name)?
            .ok_or_else(|| UploadError::FolderNotFound(name.to_string()))?;
        tracing::info!(folder = name, id = %id.0, "resolved drive folder");
        *cached = Some((name.to_string(), id.clone()));
        Ok(id)
    }
}

impl<C: DriveClient> BatchWorker for DriveUploader<C> {
    type Item = PathBuf;

    /// Reject batches before enqueue when no destination folder is named.
    fn pre_work(&self, params: &ParamStore, _batch: &[PathBuf]) -> bool {
        let destination = self.destination(params);
        if destination.trim().is_empty() {
            tracing::warn!("no drive folder configured, rejecting batch");
            return false;
        }
        true
    }

    fn process(&self, params: &ParamStore, batch: Vec<PathBuf>) -> UploadResult<()> {
        let folder_name = self.destination(params);
        let folder = self.resolve_folder(&folder_name)?;

        for path in &batch {
            tracing::info!(folder = %folder_name, file = %path.display(), "uploading");
            self.client.upload_file(path, &folder)?;
            tracing::info!(file = %path.display(), "upload complete");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Records uploads; knows a fixed set of folders.
    #[derive(Default)]
    struct FakeDrive {
        folders: Vec<String>,
        uploads: Arc<Mutex<Vec<(PathBuf, FolderId)>>>,
        lookups: Arc<Mutex<usize>>,
    }

    impl DriveClient for FakeDrive {
        fn find_folder(&self, name: &str) -> UploadResult<Option<FolderId>> {
            *self.lookups.lock().unwrap() += 1;
            Ok(self
                .folders
                .iter()
                .find(|f| f.as_str() == name)
                .map(|f| FolderId(format!("id-{f}"))))
        }

        fn upload_file(&self, path: &Path, folder: &FolderId) -> UploadResult<()> {
            self.uploads
                .lock()
                .unwrap()
                .push((path.to_path_buf(), folder.clone()));
            Ok(())
        }
    }

    fn batch(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn uploads_batch_in_order() {
        let uploads = Arc::new(Mutex::new(Vec::new()));
        let drive = FakeDrive {
            folders: vec!["Photobooth".into()],
            uploads: uploads.clone(),
            ..Default::default()
        };
        let uploader = DriveUploader::new(drive, "Photobooth");
        let params = ParamStore::default();

        uploader
            .process(&params, batch(&["a.jpg", "b.jpg", "c.jpg"]))
            .unwrap();

        let recorded = uploads.lock().unwrap();
        let files: Vec<_> = recorded.iter().map(|(p, _)| p.clone()).collect();
        assert_eq!(files, batch(&["a.jpg", "b.jpg", "c.jpg"]));
        assert!(recorded.iter().all(|(_, f)| f.0 == "id-Photobooth"));
    }

    #[test]
    fn missing_folder_is_reported() {
        let drive = FakeDrive::default();
        let uploader = DriveUploader::new(drive, "Nowhere");
        let params = ParamStore::default();

        match uploader.process(&params, batch(&["a.jpg"])) {
            Err(UploadError::FolderNotFound(name)) => assert_eq!(name, "Nowhere"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn folder_resolution_is_cached() {
        let lookups = Arc::new(Mutex::new(0));
        let drive = FakeDrive {
            folders: vec!["Photobooth".into()],
            lookups: lookups.clone(),
            ..Default::default()
        };
        let uploader = DriveUploader::new(drive, "Photobooth");
        let params = ParamStore::default();

        uploader.process(&params, batch(&["a.jpg"])).unwrap();
        uploader.process(&params, batch(&["b.jpg"])).unwrap();
        assert_eq!(*lookups.lock().unwrap(), 1);
    }

    #[test]
    fn param_override_changes_destination_and_invalidates_cache() {
        let uploads = Arc::new(Mutex::new(Vec::new()));
        let lookups = Arc::new(Mutex::new(0));
        let drive = FakeDrive {
            folders: vec!["Default".into(), "Wedding".into()],
            uploads: uploads.clone(),
            lookups: lookups.clone(),
        };
        let uploader = DriveUploader::new(drive, "Default");
        let params = ParamStore::default();

        uploader.process(&params, batch(&["a.jpg"])).unwrap();
        params.set(PARAM_DRIVE_FOLDER, "Wedding");
        uploader.process(&params, batch(&["b.jpg"])).unwrap();

        assert_eq!(*lookups.lock().unwrap(), 2);
        let recorded = uploads.lock().unwrap();
        assert_eq!(recorded[0].1 .0, "id-Default");
        assert_eq!(recorded[1].1 .0, "id-Wedding");
    }

    #[test]
    fn pre_work_rejects_empty_destination() {
        let uploader = DriveUploader::new(FakeDrive::default(), "");
        let params = ParamStore::default();
        assert!(!uploader.pre_work(&params, &batch(&["a.jpg"])));

        params.set(PARAM_DRIVE_FOLDER, "Photobooth");
        assert!(uploader.pre_work(&params, &batch(&["a.jpg"])));
    }
}
