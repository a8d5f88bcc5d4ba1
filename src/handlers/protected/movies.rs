// handlers/protected/movies.rs - catalog mutation, owner only

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    response::Json,
};

use crate::database::models::Movie;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::services::{MovieChanges, NewMovie};
use crate::AppState;

/// POST /movies/ - the caller becomes the owner
pub async fn movie_post(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<NewMovie>, JsonRejection>,
) -> ApiResult<Movie> {
    let Json(movie) = payload?;
    let created = state.movies().create(movie, user.id).await?;
    Ok(ApiResponse::new("Movie added successfully", created))
}

/// PUT /movies/:id - blank or placeholder fields keep their stored value
pub async fn movie_put(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<MovieChanges>, JsonRejection>,
) -> ApiResult<Movie> {
    let Path(id) = id?;
    let Json(changes) = payload?;
    let updated = state.movies().update(id, changes, user.id).await?;
    Ok(ApiResponse::new("Movie updated successfully", updated))
}

/// DELETE /movies/:id - responds with the movie as it was before deletion
pub async fn movie_delete(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Movie> {
    let Path(id) = id?;
    let deleted = state.movies().delete(id, user.id).await?;
    Ok(ApiResponse::new("Movie deleted successfully", deleted))
}
