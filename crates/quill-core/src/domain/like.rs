use serde::{Deserialize, Serialize};

/// Like entity - a user liked a post. At most one per (post, user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: i32,
    pub post_id: i32,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLike {
    pub post_id: i32,
    pub user_id: String,
}
