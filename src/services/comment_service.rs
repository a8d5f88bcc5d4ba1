use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::is_foreign_key_violation;
use crate::database::models::{Comment, CommentNode};
use crate::error::ApiError;

use super::comment_tree::build_forest;

const COMMENT_COLUMNS: &str = "id, movie_id, user_id, content, parent_id, created_at";

const MOVIE_FK: &str = "comments_movie_id_fkey";
const PARENT_FK: &str = "comments_parent_id_fkey";

/// Body for both top-level comments and replies; a reply takes its parent from the path.
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub movie_id: i64,
    pub content: String,
}

/// Threaded discussion attached to movies.
pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn add_top_level(&self, content: &str, movie_id: i64, user_id: Uuid) -> Result<Comment, ApiError> {
        info!("Adding comment to movie {} by user {}", movie_id, user_id);
        self.insert(content, movie_id, None, user_id).await
    }

    /// The parent must exist. It is not required to belong to `movie_id`.
    pub async fn add_reply(
        &self,
        content: &str,
        movie_id: i64,
        parent_id: Uuid,
        user_id: Uuid,
    ) -> Result<Comment, ApiError> {
        info!("Adding reply to comment {} by user {}", parent_id, user_id);
        self.insert(content, movie_id, Some(parent_id), user_id).await
    }

    /// Every thread rooted at a top-level comment of the movie, replies nested.
    pub async fn get_tree(&self, movie_id: i64) -> Result<Vec<CommentNode>, ApiError> {
        info!("Fetching comments for movie {}", movie_id);

        let rows = sqlx::query_as::<_, Comment>(&format!(
            "WITH RECURSIVE thread AS (
                 SELECT {COMMENT_COLUMNS} FROM comments
                 WHERE movie_id = $1 AND parent_id IS NULL
                 UNION ALL
                 SELECT c.id, c.movie_id, c.user_id, c.content, c.parent_id, c.created_at
                 FROM comments c
                 JOIN thread t ON c.parent_id = t.id
             )
             SELECT {COMMENT_COLUMNS} FROM thread"
        ))
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        let forest = build_forest(rows);
        if forest.is_empty() {
            warn!("No comments found for movie {}", movie_id);
            return Err(ApiError::not_found("No comments found for this movie"));
        }

        info!("Found {} top-level comments for movie {}", forest.len(), movie_id);
        Ok(forest)
    }

    async fn insert(
        &self,
        content: &str,
        movie_id: i64,
        parent_id: Option<Uuid>,
        user_id: Uuid,
    ) -> Result<Comment, ApiError> {
        let inserted = sqlx::query_as::<_, Comment>(&format!(
            "INSERT INTO comments (id, movie_id, user_id, content, parent_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(movie_id)
        .bind(user_id)
        .bind(content)
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(comment) => {
                info!("Comment {} created", comment.id);
                Ok(comment)
            }
            Err(e) if is_foreign_key_violation(&e, Some(PARENT_FK)) => {
                warn!("Parent comment {:?} not found", parent_id);
                Err(ApiError::not_found("Parent comment not found"))
            }
            Err(e) if is_foreign_key_violation(&e, Some(MOVIE_FK)) => {
                warn!("Movie with id {} does not exist", movie_id);
                Err(ApiError::not_found(format!("Movie with id {} does not exist", movie_id)))
            }
            Err(e) => Err(e.into()),
        }
    }
}
