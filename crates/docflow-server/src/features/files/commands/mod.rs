pub mod delete;
pub mod upload;

pub use delete::{DeleteFileCommand, DeleteFileError, DeleteFileResponse};
pub use upload::{UploadFileCommand, UploadFileError, UploadFileResponse};
