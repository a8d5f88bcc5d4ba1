// handlers/public/mod.rs - Handlers reachable without a bearer token

pub mod comments;
pub mod movies;
pub mod ratings;
pub mod system;
pub mod users;

pub use comments::comment_tree_get;
pub use movies::{movie_get, movie_get_by_title, movies_list};
pub use ratings::rating_summary_get;
pub use system::{health, root};
pub use users::{login_post, signup_post};
