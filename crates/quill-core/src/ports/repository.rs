use async_trait::async_trait;

use crate::domain::{
    Comment, Like, NewComment, NewLike, NewPost, Post, PostUpdate, User, UserUpdate,
};
use crate::error::RepoError;

/// Generic repository trait for lookups and deletes by primary key.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID. `RepoError::NotFound` if nothing was deleted.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, String> {
    async fn list(&self) -> Result<Vec<User>, RepoError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Insert a new user. `RepoError::Constraint` if the email is taken.
    async fn create(&self, user: User) -> Result<User, RepoError>;

    /// Apply a partial update in one transaction.
    async fn update(&self, id: &str, changes: UserUpdate) -> Result<User, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i32> {
    /// Page through posts in id order.
    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<Post>, RepoError>;

    async fn find_by_author(&self, author_id: &str) -> Result<Vec<Post>, RepoError>;

    /// Insert a post. `RepoError::ForeignKey` if the author does not exist.
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Apply a partial update in one transaction.
    async fn update(&self, id: i32, changes: PostUpdate) -> Result<Post, RepoError>;
}

/// Like repository.
#[async_trait]
pub trait LikeRepository: BaseRepository<Like, i32> {
    /// Insert a like unless one already exists for the pair, in which case
    /// `RepoError::Constraint` is returned.
    async fn create(&self, like: NewLike) -> Result<Like, RepoError>;

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Like>, RepoError>;

    async fn find_by_post(&self, post_id: i32) -> Result<Vec<Like>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, i32> {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError>;

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Comment>, RepoError>;

    /// Comments on a post, oldest first.
    async fn find_by_post(&self, post_id: i32) -> Result<Vec<Comment>, RepoError>;
}
