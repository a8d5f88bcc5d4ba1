// handlers/public/movies.rs - read-only catalog endpoints

use axum::extract::{rejection::PathRejection, Path, State};

use crate::database::models::Movie;
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// GET /movies/ - first page of the catalog (404 when empty)
pub async fn movies_list(State(state): State<AppState>) -> ApiResult<Vec<Movie>> {
    let movies = state.movies().list().await?;
    Ok(ApiResponse::new("Movies retrieved successfully", movies))
}

/// GET /movies/:id
pub async fn movie_get(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Movie> {
    let Path(id) = id?;
    let movie = state.movies().get_by_id(id).await?;
    Ok(ApiResponse::new("Movie retrieved successfully", movie))
}

/// GET /movies/by_title/:title
pub async fn movie_get_by_title(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> ApiResult<Movie> {
    let movie = state.movies().get_by_title(&title).await?;
    Ok(ApiResponse::new("Movie retrieved successfully", movie))
}
