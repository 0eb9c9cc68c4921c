//! Domain entities - the core business objects.

mod comment;
mod like;
mod post;
mod user;

pub use comment::{Comment, NewComment};
pub use like::{Like, NewLike};
pub use post::{NewPost, Post, PostUpdate};
pub use user::{User, UserUpdate};
