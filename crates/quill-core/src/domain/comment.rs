use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Comment entity - text a user left on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i32,
    pub post_id: i32,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub post_id: i32,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl NewComment {
    /// Build a comment, rejecting blank content.
    pub fn new(post_id: i32, user_id: String, content: String) -> Result<Self, DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::Validation(
                "Comment content must not be empty".to_string(),
            ));
        }

        Ok(Self {
            post_id,
            user_id,
            content,
            created_at: Utc::now(),
        })
    }
}
