pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::services::{CommentService, MovieService, RatingService, UserService};

/// Shared handler state. Cloned per request; everything inside is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        let tokens = TokenService::new(config.security.auth.clone());
        Self {
            pool,
            config: Arc::new(config),
            tokens: Arc::new(tokens),
        }
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.pool.clone())
    }

    pub fn movies(&self) -> MovieService {
        MovieService::new(self.pool.clone(), self.config.api.page_size)
    }

    pub fn ratings(&self) -> RatingService {
        RatingService::new(self.pool.clone())
    }

    pub fn comments(&self) -> CommentService {
        CommentService::new(self.pool.clone())
    }
}

/// Build the full HTTP router.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security.cors_origins);

    Router::new()
        .route("/", get(handlers::public::root))
        .route("/health", get(handlers::public::health))
        .merge(user_routes())
        .merge(movie_routes())
        .merge(rating_routes())
        .merge(comment_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

fn user_routes() -> Router<AppState> {
    use handlers::public::{login_post, signup_post};

    Router::new()
        .route("/signup", post(signup_post))
        .route("/login", post(login_post))
}

fn movie_routes() -> Router<AppState> {
    use handlers::protected::{movie_delete, movie_post, movie_put};
    use handlers::public::{movie_get, movie_get_by_title, movies_list};

    Router::new()
        .route("/movies", get(movies_list).post(movie_post))
        .route("/movies/", get(movies_list).post(movie_post))
        .route("/movies/:id", get(movie_get).put(movie_put).delete(movie_delete))
        .route("/movies/by_title/:title", get(movie_get_by_title))
}

fn rating_routes() -> Router<AppState> {
    use handlers::protected::rating_post;
    use handlers::public::rating_summary_get;

    Router::new()
        .route("/ratings", get(rating_summary_get).post(rating_post))
        .route("/ratings/", get(rating_summary_get).post(rating_post))
}

fn comment_routes() -> Router<AppState> {
    use handlers::protected::{comment_post, comment_reply_post};
    use handlers::public::comment_tree_get;

    Router::new()
        .route("/comments", post(comment_post))
        .route("/comments/", post(comment_post))
        .route("/comments/:movie_id", get(comment_tree_get))
        .route("/comments/reply/:parent_id", post(comment_reply_post))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
