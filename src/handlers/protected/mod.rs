// handlers/protected/mod.rs - Handlers that require `Authorization: Bearer <token>`

pub mod comments;
pub mod movies;
pub mod ratings;

pub use comments::{comment_post, comment_reply_post};
pub use movies::{movie_delete, movie_post, movie_put};
pub use ratings::rating_post;
