use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub movie_id: i64,
    pub user_id: Uuid,
    pub content: String,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A comment together with its nested replies.
///
/// No derived `Clone`, `Debug` or `Serialize`: each would recurse once per
/// reply level. Use `services::comment_tree::forest_to_json` for output.
pub struct CommentNode {
    pub id: Uuid,
    pub movie_id: i64,
    pub user_id: Uuid,
    pub content: String,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<CommentNode>,
}

impl From<Comment> for CommentNode {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            movie_id: comment.movie_id,
            user_id: comment.user_id,
            content: comment.content,
            parent_id: comment.parent_id,
            created_at: comment.created_at,
            replies: Vec::new(),
        }
    }
}

impl std::fmt::Debug for CommentNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentNode")
            .field("id", &self.id)
            .field("movie_id", &self.movie_id)
            .field("parent_id", &self.parent_id)
            .field("replies", &self.replies.len())
            .finish()
    }
}

// Unlink replies before dropping so a long reply chain is freed without deep recursion.
impl Drop for CommentNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.replies);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.replies);
        }
    }
}
