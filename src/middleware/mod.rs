pub mod auth;
pub mod response;

pub use auth::{authenticate, extract_bearer_token, CurrentUser};
pub use response::{ApiResponse, ApiResult};
