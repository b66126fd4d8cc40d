//! Comments and the in-memory index built while they are fetched.

mod index;
mod models;

pub use index::{CommentIndex, SongComments, UserComments};
pub use models::{normalize_comment, CommentRecord, SongRef, UserRef};
