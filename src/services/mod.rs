pub mod comment_service;
pub mod comment_tree;
pub mod movie_service;
pub mod rating_service;
pub mod user_service;
pub mod validation;

pub use comment_service::{CommentRequest, CommentService};
pub use comment_tree::{build_forest, forest_to_json};
pub use movie_service::{MovieChanges, MovieService, NewMovie};
pub use rating_service::{RatingRequest, RatingService};
pub use user_service::{SignupRequest, UserService};
