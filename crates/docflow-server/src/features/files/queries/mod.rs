pub mod get_content;
pub mod get_progress;
pub mod list;

pub use get_content::{GetContentError, GetContentQuery, GetContentResponse};
pub use get_progress::{GetProgressError, GetProgressQuery, GetProgressResponse};
pub use list::{ListFilesError, ListFilesQuery, ListedFile};
