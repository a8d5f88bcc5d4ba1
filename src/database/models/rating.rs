use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Rating {
    pub id: Uuid,
    pub movie_id: i64,
    pub user_id: Uuid,
    pub rating: i32,
}

/// Aggregate view returned by the ratings endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    pub movie_id: i64,
    pub movie_title: String,
    pub average_rating: f64,
}
