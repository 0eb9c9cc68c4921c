//! Database connection management and SeaORM repositories.

mod base;
mod connection;
pub mod entity;
mod repositories;

pub use base::SqlBaseRepository;
pub use sea_orm::DbConn;
pub use connection::{DatabaseConfig, connect};
pub use repositories::{
    SqlCommentRepository, SqlLikeRepository, SqlPostRepository, SqlUserRepository,
};
