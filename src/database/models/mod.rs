pub mod comment;
pub mod movie;
pub mod rating;
pub mod user;

pub use comment::{Comment, CommentNode};
pub use movie::Movie;
pub use rating::{Rating, RatingSummary};
pub use user::{User, UserProfile};
