// handlers/public/users.rs - POST /signup and POST /login

use axum::{
    extract::{rejection::FormRejection, rejection::JsonRejection, State},
    response::Json,
    Form,
};
use serde::{Deserialize, Serialize};

use crate::database::models::UserProfile;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::SignupRequest;
use crate::AppState;

/// OAuth2 password-grant style login form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// POST /signup - register a new account
///
/// Body: `{"username": "...", "email": "...", "password": "..."}`.
/// Responds with the stored profile; the password hash is never returned.
pub async fn signup_post(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<UserProfile> {
    let Json(request) = payload?;
    let profile = state.users().signup(request).await?;
    Ok(ApiResponse::new("User created successfully", profile))
}

/// POST /login - exchange form-encoded credentials for a bearer token
pub async fn login_post(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Form(form) = form?;

    let Some(user) = state.users().authenticate(&form.username, &form.password).await? else {
        return Err(ApiError::bad_request("Incorrect username or password"));
    };

    let access_token = state.tokens.issue(&user.username).map_err(|e| {
        tracing::error!("Failed to sign access token for {}: {}", user.username, e);
        ApiError::internal_server_error("Could not issue access token")
    })?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}
