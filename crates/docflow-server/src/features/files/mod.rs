pub mod commands;
pub mod queries;
pub mod routes;


pub use commands::{DeleteFileCommand, DeleteFileError, DeleteFileResponse};
pub use commands::{UploadFileCommand, UploadFileError, UploadFileResponse};

pub use queries::{GetContentError, GetContentQuery, GetContentResponse};
pub use queries::{GetProgressError, GetProgressQuery, GetProgressResponse};
pub use queries::{ListFilesError, ListFilesQuery, ListedFile};

pub use routes::files_routes;
