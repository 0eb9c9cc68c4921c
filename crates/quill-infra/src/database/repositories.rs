//! SeaORM repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use quill_core::domain::{
    Comment, Like, NewComment, NewLike, NewPost, Post, PostUpdate, User, UserUpdate,
};
use quill_core::error::RepoError;
use quill_core::ports::{CommentRepository, LikeRepository, PostRepository, UserRepository};

use super::base::{SqlBaseRepository, map_db_err};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::like::{self, Entity as LikeEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};

/// SQL user repository.
pub type SqlUserRepository = SqlBaseRepository<UserEntity>;

/// SQL post repository.
pub type SqlPostRepository = SqlBaseRepository<PostEntity>;

/// SQL like repository.
pub type SqlLikeRepository = SqlBaseRepository<LikeEntity>;

/// SQL comment repository.
pub type SqlCommentRepository = SqlBaseRepository<CommentEntity>;

/// SQL drivers bind OFFSET/LIMIT as signed 64-bit integers.
const MAX_ROWS: u64 = i64::MAX as u64;

/// Mask an email for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let masked_local = match local.chars().next() {
                Some(first) if local.chars().count() > 1 => format!("{first}***"),
                _ => "***".to_string(),
            };
            format!("{masked_local}@{domain}")
        }
        None => "***".to_string(),
    }
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let active_model: user::ActiveModel = user.into();
        let model = active_model.insert(&self.db).await.map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn update(&self, id: &str, changes: UserUpdate) -> Result<User, RepoError> {
        let current = UserEntity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        let mut user: User = current.clone().into();
        if !changes.apply(&mut user) {
            return Ok(user);
        }

        // Only changed columns are written, so concurrent edits of other fields survive.
        let mut active_model = current.clone().into_active_model();
        if user.name != current.name {
            active_model.name = Set(user.name);
        }
        if user.email != current.email {
            active_model.email = Set(user.email);
        }

        let model = active_model.update(&self.db).await.map_err(map_db_err)?;

        Ok(model.into())
    }
}

#[async_trait]
impl PostRepository for SqlPostRepository {
    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by_asc(post::Column::Id)
            .offset(skip.min(MAX_ROWS))
            .limit(limit.min(MAX_ROWS))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_author(&self, author_id: &str) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_asc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let active_model: post::ActiveModel = post.into();
        let model = active_model.insert(&self.db).await.map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn update(&self, id: i32, changes: PostUpdate) -> Result<Post, RepoError> {
        let current = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        let mut post: Post = current.clone().into();
        if changes.is_empty() {
            return Ok(post);
        }
        changes.apply(&mut post, Utc::now());

        let mut active_model = current.clone().into_active_model();
        if post.title != current.title {
            active_model.title = Set(post.title);
        }
        if post.content != current.content {
            active_model.content = Set(post.content);
        }
        active_model.updated_at = Set(post.updated_at.map(Into::into));

        let model = active_model.update(&self.db).await.map_err(map_db_err)?;

        Ok(model.into())
    }
}

fn already_liked() -> RepoError {
    RepoError::Constraint("Post already liked".to_string())
}

#[async_trait]
impl LikeRepository for SqlLikeRepository {
    async fn create(&self, like: NewLike) -> Result<Like, RepoError> {
        let existing = LikeEntity::find()
            .filter(like::Column::PostId.eq(like.post_id))
            .filter(like::Column::UserId.eq(like.user_id.as_str()))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        if existing.is_some() {
            return Err(already_liked());
        }

        // Racing inserts that pass the check are stopped by the (post_id, user_id) index.
        let active_model: like::ActiveModel = like.into();
        let model = active_model.insert(&self.db).await.map_err(|e| match map_db_err(e) {
            RepoError::Constraint(_) => already_liked(),
            other => other,
        })?;

        Ok(model.into())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Like>, RepoError> {
        let result = LikeEntity::find()
            .filter(like::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_post(&self, post_id: i32) -> Result<Vec<Like>, RepoError> {
        let result = LikeEntity::find()
            .filter(like::Column::PostId.eq(post_id))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CommentRepository for SqlCommentRepository {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let active_model: comment::ActiveModel = comment.into();
        let model = active_model.insert(&self.db).await.map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::UserId.eq(user_id))
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_post(&self, post_id: i32) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::mask_email;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("alice@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }
}
