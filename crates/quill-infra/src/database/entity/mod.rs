//! SeaORM entities mirroring the migration schema.

pub mod comment;
pub mod like;
pub mod post;
pub mod user;
