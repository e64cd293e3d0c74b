//! Concrete upload destinations and their orchestration.

pub mod archive;
pub mod dispatcher;
pub mod drive;

pub use archive::ArchiveUploader;
pub use dispatcher::UploadDispatcher;
pub use drive::{DriveClient, DriveUploader, FolderId, PARAM_DRIVE_FOLDER};
