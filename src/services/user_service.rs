use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{hash_password, verify_password};
use crate::database::is_unique_violation;
use crate::database::models::{User, UserProfile};
use crate::error::ApiError;

use super::validation::{require_text, MAX_EMAIL_LEN};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Credential store: persisted users and password checks.
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, hashed_password FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    /// Register a new user. Usernames and emails are unique.
    pub async fn signup(&self, request: SignupRequest) -> Result<UserProfile, ApiError> {
        info!("Creating user {}", request.username);

        require_text("Username", &request.username)?;
        require_text("Email", &request.email)?;
        require_text("Password", &request.password)?;
        if request.email.chars().count() > MAX_EMAIL_LEN {
            return Err(ApiError::validation_error(
                format!("Email must be at most {} characters", MAX_EMAIL_LEN),
                None,
            ));
        }

        let mut tx = self.pool.begin().await?;

        let taken: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
            .bind(&request.username)
            .fetch_one(&mut *tx)
            .await?;
        if taken {
            warn!("User with username={} already exists", request.username);
            return Err(ApiError::bad_request("User already exists"));
        }

        let hashed_password = hash_password(&request.password).map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            ApiError::internal_server_error("Failed to create user")
        })?;

        let inserted = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, email, hashed_password)
             VALUES ($1, $2, $3, $4)
             RETURNING id, username, email, hashed_password",
        )
        .bind(Uuid::new_v4())
        .bind(&request.username)
        .bind(&request.email)
        .bind(&hashed_password)
        .fetch_one(&mut *tx)
        .await;

        let user = match inserted {
            Ok(user) => user,
            Err(e) if is_unique_violation(&e, Some("users_email_key")) => {
                warn!("Email for user {} is already registered", request.username);
                return Err(ApiError::bad_request("Email already registered"));
            }
            Err(e) if is_unique_violation(&e, None) => {
                warn!("User with username={} already exists", request.username);
                return Err(ApiError::bad_request("User already exists"));
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;
        info!("User {} created successfully", user.username);
        Ok(user.into())
    }

    /// Check credentials. Unknown users and wrong passwords look the same to the caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>, ApiError> {
        let Some(user) = self.find_by_username(username).await? else {
            warn!("Authentication failed: user {} not found", username);
            return Ok(None);
        };

        if !verify_password(password, &user.hashed_password) {
            warn!("Authentication failed: incorrect password for user {}", username);
            return Ok(None);
        }

        info!("User {} authenticated successfully", username);
        Ok(Some(user))
    }
}
