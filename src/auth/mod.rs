pub mod password;
pub mod token;

use thiserror::Error;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};

/// Reasons a bearer credential can be refused.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no bearer token presented")]
    MissingCredentials,

    #[error("token signature or format is invalid")]
    Invalid,

    #[error("token has expired")]
    Expired,

    #[error("token carries no subject")]
    MissingSubject,

    #[error("token subject no longer exists")]
    UserNotFound,
}
