#![allow(dead_code)]

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::{postgres::PgPoolOptions, PgPool};

use movie_rating_api::config::{AppConfig, AuthConfig, DatabaseConfig, Environment};
use movie_rating_api::database::{DatabaseManager, MIGRATOR};
use movie_rating_api::{app, AppState};

pub const SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn signup(&self, username: &str, password: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/signup"))
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": password,
            }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "signup failed: {}", res.status());
        Ok(res.json().await?)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let body: Value = res.json().await?;
        body["access_token"]
            .as_str()
            .map(str::to_string)
            .context("login response carries no access_token")
    }

    /// Sign up a fresh user, returning its stored id and a bearer token.
    pub async fn user_id_and_token(&self, username: &str) -> Result<(uuid::Uuid, String)> {
        let profile = self.signup(username, "secret-pass").await?;
        let id = profile["data"]["id"]
            .as_str()
            .context("signup response carries no id")?
            .parse()?;
        Ok((id, self.login(username, "secret-pass").await?))
    }

    /// Sign up and log in a fresh user, returning its bearer token.
    pub async fn user_token(&self, username: &str) -> Result<String> {
        self.signup(username, "secret-pass").await?;
        self.login(username, "secret-pass").await
    }

    pub async fn create_movie(&self, token: &str, title: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/movies/"))
            .bearer_auth(token)
            .json(&json!({
                "title": title,
                "description": "Test Description",
                "release_date": "2024-08-15",
            }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "create movie failed: {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["data"].clone())
    }
}

pub fn test_config(database_url: &str) -> AppConfig {
    let mut config = AppConfig::preset(Environment::Development);
    config.database = DatabaseConfig {
        url: database_url.to_string(),
        max_connections: 5,
        connection_timeout: 1,
    };
    config.security.auth = AuthConfig::new(
        SECRET,
        jsonwebtoken::Algorithm::HS256,
        chrono::Duration::minutes(AuthConfig::DEFAULT_TTL_MINUTES),
    );
    config
}

/// Serve the router on a free local port inside the current runtime.
pub async fn spawn_app(state: AppState) -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;

    let router = app(state);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            eprintln!("test server stopped: {}", e);
        }
    });

    Ok(TestServer {
        port,
        base_url: format!("http://127.0.0.1:{}", port),
        client: Client::builder().timeout(Duration::from_secs(10)).build()?,
    })
}

/// Server backed by a pool that never connects. Only for requests that
/// must be answered before any storage access.
pub async fn spawn_without_database() -> Result<TestServer> {
    let config = test_config("postgres://postgres@127.0.0.1:1/unreachable");
    let pool = DatabaseManager::connect_lazy(&config.database)?;
    spawn_app(AppState::new(pool, config)).await
}

/// Server backed by a freshly migrated schema of `TEST_DATABASE_URL`.
/// Returns `None` (and the test should return early) when no database is configured.
pub async fn spawn_with_database() -> Result<Option<TestServer>> {
    Ok(spawn_with_pool().await?.map(|(server, _pool)| server))
}

/// Like [`spawn_with_database`], also handing back the pool the server uses.
pub async fn spawn_with_pool() -> Result<Option<(TestServer, PgPool)>> {
    let Some(pool) = test_pool().await? else {
        return Ok(None);
    };
    let config = test_config(&std::env::var("TEST_DATABASE_URL")?);
    let server = spawn_app(AppState::new(pool.clone(), config)).await?;
    Ok(Some((server, pool)))
}

pub async fn test_pool() -> Result<Option<PgPool>> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping database test");
        return Ok(None);
    };

    let schema = format!("test_{}", uuid::Uuid::new_v4().simple());

    let admin = PgPoolOptions::new().max_connections(1).connect(&url).await?;
    sqlx::query(&format!("CREATE SCHEMA {}", schema))
        .execute(&admin)
        .await?;
    admin.close().await;

    let search_path = format!("SET search_path TO {}", schema);
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .after_connect(move |conn, _meta| {
            let search_path = search_path.clone();
            Box::pin(async move {
                sqlx::query(&search_path).execute(conn).await?;
                Ok(())
            })
        })
        .connect(&url)
        .await?;

    MIGRATOR.run(&pool).await?;
    Ok(Some(pool))
}
