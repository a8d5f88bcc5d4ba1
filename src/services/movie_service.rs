use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::models::Movie;
use crate::error::ApiError;

use super::validation::{provided, require_text};

const MOVIE_COLUMNS: &str = "id, title, description, release_date, user_id";

#[derive(Debug, Deserialize)]
pub struct NewMovie {
    pub title: String,
    pub description: String,
    pub release_date: NaiveDate,
}

/// Partial update of the text fields. Blank or placeholder text leaves the
/// stored value alone. A `release_date` in the body is ignored; the date is
/// fixed at creation.
#[derive(Debug, Default, Deserialize)]
pub struct MovieChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    Update,
    Delete,
}

impl Mutation {
    fn verb(self) -> &'static str {
        match self {
            Mutation::Update => "update",
            Mutation::Delete => "delete",
        }
    }
}

/// Movie catalog with owner-only mutation.
pub struct MovieService {
    pool: PgPool,
    page_size: i64,
}

impl MovieService {
    pub fn new(pool: PgPool, page_size: i64) -> Self {
        Self { pool, page_size }
    }

    /// First page of the catalog. An empty catalog is reported as not found.
    pub async fn list(&self) -> Result<Vec<Movie>, ApiError> {
        let movies = sqlx::query_as::<_, Movie>(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies ORDER BY id LIMIT $1 OFFSET 0"
        ))
        .bind(self.page_size)
        .fetch_all(&self.pool)
        .await?;

        if movies.is_empty() {
            warn!("No movies found");
            return Err(ApiError::not_found("No movies found"));
        }

        info!("Found {} movies", movies.len());
        Ok(movies)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Movie, ApiError> {
        sqlx::query_as::<_, Movie>(&format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                warn!("Movie with id={} not found", id);
                ApiError::not_found("Movie not found")
            })
    }

    /// Exact title match; the lowest id wins when titles repeat.
    pub async fn get_by_title(&self, title: &str) -> Result<Movie, ApiError> {
        sqlx::query_as::<_, Movie>(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE title = $1 ORDER BY id LIMIT 1"
        ))
        .bind(title)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            warn!("Movie with title={} not found", title);
            ApiError::not_found("Movie not found")
        })
    }

    pub async fn create(&self, movie: NewMovie, owner_id: Uuid) -> Result<Movie, ApiError> {
        info!("Adding movie by user with id={}", owner_id);

        require_text("Title", &movie.title)?;
        require_text("Description", &movie.description)?;

        let mut tx = self.pool.begin().await?;
        let created = sqlx::query_as::<_, Movie>(&format!(
            "INSERT INTO movies (title, description, release_date, user_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {MOVIE_COLUMNS}"
        ))
        .bind(&movie.title)
        .bind(&movie.description)
        .bind(movie.release_date)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        info!("Added movie with id={}", created.id);
        Ok(created)
    }

    pub async fn update(&self, id: i64, changes: MovieChanges, requester_id: Uuid) -> Result<Movie, ApiError> {
        info!("Updating movie with id={}", id);

        let mut tx = self.pool.begin().await?;
        let current = Self::lock_owned(&mut tx, id, requester_id, Mutation::Update).await?;

        let title = provided(changes.title.as_deref()).unwrap_or(current.title.as_str());
        let description = provided(changes.description.as_deref()).unwrap_or(current.description.as_str());

        let updated = sqlx::query_as::<_, Movie>(&format!(
            "UPDATE movies SET title = $2, description = $3
             WHERE id = $1
             RETURNING {MOVIE_COLUMNS}"
        ))
        .bind(id)
        .bind(title)
        .bind(description)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        info!("Updated movie with id={}", id);
        Ok(updated)
    }

    /// Delete a movie and return what it looked like before deletion.
    pub async fn delete(&self, id: i64, requester_id: Uuid) -> Result<Movie, ApiError> {
        info!("Deleting movie with id={}", id);

        let mut tx = self.pool.begin().await?;
        let snapshot = Self::lock_owned(&mut tx, id, requester_id, Mutation::Delete).await?;

        sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("Deleted movie with id={}", id);
        Ok(snapshot)
    }

    /// Load a movie for mutation, holding its row lock until the transaction ends.
    async fn lock_owned(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: i64,
        requester_id: Uuid,
        mutation: Mutation,
    ) -> Result<Movie, ApiError> {
        let movie = sqlx::query_as::<_, Movie>(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| {
            warn!("Movie with id={} not found", id);
            ApiError::not_found("Movie not found")
        })?;

        if movie.user_id != requester_id {
            warn!("User with id={} is not authorized to {} movie {}", requester_id, mutation.verb(), id);
            return Err(ApiError::forbidden(format!(
                "You are not authorized to {}",
                mutation.verb()
            )));
        }

        Ok(movie)
    }
}
