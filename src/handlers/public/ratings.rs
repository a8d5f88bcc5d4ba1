// handlers/public/ratings.rs - GET /ratings/?movie_id=

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
};
use serde::Deserialize;

use crate::database::models::RatingSummary;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RatingQuery {
    pub movie_id: i64,
}

/// Average score for a movie. Returned bare, without the envelope.
pub async fn rating_summary_get(
    State(state): State<AppState>,
    query: Result<Query<RatingQuery>, QueryRejection>,
) -> Result<Json<RatingSummary>, ApiError> {
    let Query(query) = query?;
    let summary = state.ratings().summary(query.movie_id).await?;
    Ok(Json(summary))
}
