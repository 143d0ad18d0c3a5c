pub mod bookmark;
pub mod note;
pub mod resource;
pub mod user;

pub use bookmark::{Bookmark, BookmarkFields};
pub use note::{Note, NoteFields};
pub use resource::{Resource, ResourceMeta};
pub use user::{User, UserProfile};
