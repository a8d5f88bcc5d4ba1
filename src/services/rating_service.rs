use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::database::is_unique_violation;
use crate::database::models::{Rating, RatingSummary};
use crate::error::ApiError;

use super::validation::check_score;

const UNIQUE_RATING: &str = "ratings_movie_user_key";

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub movie_id: i64,
    pub rating: i32,
}

/// One rating per (movie, user); averages are recomputed from the rows on every read.
pub struct RatingService {
    pool: PgPool,
}

impl RatingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn summary(&self, movie_id: i64) -> Result<RatingSummary, ApiError> {
        info!("Fetching ratings for movie {}", movie_id);
        let mut conn = self.pool.acquire().await?;
        summary_on(&mut *conn, movie_id).await
    }

    /// Insert or replace the caller's rating, then return the refreshed aggregate.
    pub async fn upsert(&self, movie_id: i64, user_id: Uuid, score: i32) -> Result<RatingSummary, ApiError> {
        check_score(score)?;

        let mut tx = self.pool.begin().await?;
        movie_title(&mut *tx, movie_id).await?;

        info!("Setting rating for movie {} by user {}", movie_id, user_id);
        let existing = sqlx::query_as::<_, Rating>(
            "SELECT id, movie_id, user_id, rating FROM ratings WHERE movie_id = $1 AND user_id = $2",
        )
        .bind(movie_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let written = match existing {
            Some(rating) => {
                info!("Rating already exists for movie {} by user {}", movie_id, user_id);
                sqlx::query("UPDATE ratings SET rating = $2 WHERE id = $1")
                    .bind(rating.id)
                    .bind(score)
                    .execute(&mut *tx)
                    .await
            }
            None => {
                sqlx::query("INSERT INTO ratings (id, movie_id, user_id, rating) VALUES ($1, $2, $3, $4)")
                    .bind(Uuid::new_v4())
                    .bind(movie_id)
                    .bind(user_id)
                    .bind(score)
                    .execute(&mut *tx)
                    .await
            }
        };

        let outcome = match written {
            Ok(_) => tx.commit().await,
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    error!("Rollback failed after rating write error: {}", rollback_err);
                }
                Err(e)
            }
        };

        if let Err(e) = outcome {
            if is_unique_violation(&e, Some(UNIQUE_RATING)) {
                warn!("Concurrent rating for movie {} by user {}: {}", movie_id, user_id, e);
                return Err(ApiError::conflict("Failed to set rating due to integrity constraints."));
            }
            error!("Unexpected error while setting rating for movie {}: {}", movie_id, e);
            return Err(ApiError::internal_server_error(
                "An unexpected error occurred while setting the rating.",
            ));
        }

        info!("Rating set for movie {} by user {}", movie_id, user_id);
        self.summary(movie_id).await
    }
}

async fn movie_title(conn: &mut PgConnection, movie_id: i64) -> Result<String, ApiError> {
    sqlx::query_scalar::<_, String>("SELECT title FROM movies WHERE id = $1")
        .bind(movie_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| {
            warn!("Movie with id {} does not exist", movie_id);
            ApiError::not_found(format!("Movie with id {} does not exist", movie_id))
        })
}

async fn summary_on(conn: &mut PgConnection, movie_id: i64) -> Result<RatingSummary, ApiError> {
    let movie_title = movie_title(conn, movie_id).await?;

    let average: Option<f64> = sqlx::query_scalar(
        "SELECT ROUND(AVG(rating)::numeric, 2)::float8 FROM ratings WHERE movie_id = $1",
    )
    .bind(movie_id)
    .fetch_one(&mut *conn)
    .await?;

    let Some(average_rating) = average else {
        warn!("No ratings found for movie {}", movie_id);
        return Err(ApiError::not_found(format!(
            "No ratings found for movie with id {}",
            movie_id
        )));
    };

    Ok(RatingSummary {
        movie_id,
        movie_title,
        average_rating,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_request_shape() {
        let request: RatingRequest = serde_json::from_str(r#"{"movie_id": 2, "rating": 4}"#).unwrap();
        assert_eq!(request.movie_id, 2);
        assert_eq!(request.rating, 4);
    }
}
