// handlers/protected/comments.rs - POST /comments/ and POST /comments/reply/:parent_id

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    response::Json,
};
use uuid::Uuid;

use crate::database::models::Comment;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::services::CommentRequest;
use crate::AppState;

pub async fn comment_post(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<Json<Comment>, ApiError> {
    let Json(request) = payload?;
    let comment = state
        .comments()
        .add_top_level(&request.content, request.movie_id, user.id)
        .await?;
    Ok(Json(comment))
}

/// The parent comment id comes from the path, not the body.
pub async fn comment_reply_post(
    State(state): State<AppState>,
    user: CurrentUser,
    parent_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<Json<Comment>, ApiError> {
    let Path(parent_id) = parent_id?;
    let Json(request) = payload?;
    let reply = state
        .comments()
        .add_reply(&request.content, request.movie_id, parent_id, user.id)
        .await?;
    Ok(Json(reply))
}
