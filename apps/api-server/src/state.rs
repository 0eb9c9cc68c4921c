//! Application state - shared across all handlers.

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use quill_core::ports::{
    CommentRepository, LikeRepository, PasswordService, PostRepository, TokenService,
    UserRepository,
};
use quill_infra::database::{self, DbConn};
use quill_infra::{
    Argon2PasswordService, JwtTokenService, SqlCommentRepository, SqlLikeRepository,
    SqlPostRepository, SqlUserRepository,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
}

impl AppState {
    /// Wire repositories over `db` together with the auth services.
    pub fn new(
        db: DbConn,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            users: Arc::new(SqlUserRepository::new(db.clone())),
            posts: Arc::new(SqlPostRepository::new(db.clone())),
            likes: Arc::new(SqlLikeRepository::new(db.clone())),
            comments: Arc::new(SqlCommentRepository::new(db.clone())),
            db,
            tokens,
            passwords,
        }
    }

    /// Connect to the configured database, apply pending migrations and build the state.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let db = database::connect(&config.database).await?;

        Migrator::up(&db, None).await?;
        tracing::info!("Database schema up to date");

        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        tracing::info!("Application state initialized");

        Ok(Self::new(db, tokens, passwords))
    }
}
