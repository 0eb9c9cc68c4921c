use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post entity - represents a blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    /// Unset until the first update.
    pub updated_at: Option<DateTime<Utc>>,
}

/// A post that has not been stored yet; the id is assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    pub fn new(title: String, content: String, author_id: String) -> Self {
        Self {
            title,
            content,
            author_id,
            created_at: Utc::now(),
        }
    }
}

/// Partial post update. Only fields that are present are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }

    /// Merge the update into `post`, stamping `updated_at` when anything was written.
    pub fn apply(self, post: &mut Post, now: DateTime<Utc>) {
        if self.is_empty() {
            return;
        }
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(content) = self.content {
            post.content = content;
        }
        post.updated_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_post() -> Post {
        Post {
            id: 1,
            title: "Hello".to_string(),
            content: "World".to_string(),
            author_id: "author".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_apply_sets_updated_at() {
        let mut post = stored_post();
        let now = Utc::now();

        PostUpdate {
            title: Some("Hi".to_string()),
            content: None,
        }
        .apply(&mut post, now);

        assert_eq!(post.title, "Hi");
        assert_eq!(post.content, "World");
        assert_eq!(post.updated_at, Some(now));
    }

    #[test]
    fn test_empty_update_is_noop() {
        let mut post = stored_post();
        let before = post.clone();

        PostUpdate::default().apply(&mut post, Utc::now());

        assert_eq!(post, before);
    }
}
