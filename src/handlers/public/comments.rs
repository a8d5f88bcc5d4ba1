// handlers/public/comments.rs - GET /comments/:movie_id

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::services::forest_to_json;
use crate::AppState;

/// Nested comment threads for a movie, oldest root first.
///
/// The body is rendered by `forest_to_json` rather than `Json`, since reply
/// chains can be arbitrarily deep.
pub async fn comment_tree_get(
    State(state): State<AppState>,
    movie_id: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(movie_id) = movie_id?;
    let tree = state.comments().get_tree(movie_id).await?;

    let body = forest_to_json(&tree).map_err(|e| {
        tracing::error!("Failed to render comments for movie {}: {}", movie_id, e);
        ApiError::internal_server_error("Failed to render comments")
    })?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
