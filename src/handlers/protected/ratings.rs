// handlers/protected/ratings.rs - POST /ratings/

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};

use crate::database::models::RatingSummary;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::services::RatingRequest;
use crate::AppState;

/// Set (or replace) the caller's score and return the refreshed average.
pub async fn rating_post(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<RatingRequest>, JsonRejection>,
) -> Result<Json<RatingSummary>, ApiError> {
    let Json(request) = payload?;
    let summary = state
        .ratings()
        .upsert(request.movie_id, user.id, request.rating)
        .await?;
    Ok(Json(summary))
}
