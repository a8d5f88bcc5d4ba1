mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn signup_returns_profile_without_hash() -> Result<()> {
    let Some(server) = common::spawn_with_database().await? else {
        return Ok(());
    };

    let body = server.signup("testuser", "testpassword").await?;

    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["data"]["username"], "testuser");
    assert_eq!(body["data"]["email"], "testuser@example.com");
    assert!(body["data"]["id"].is_string());
    assert!(body["data"].get("hashed_password").is_none());
    assert!(body["data"].get("password").is_none());
    Ok(())
}

#[tokio::test]
async fn duplicate_username_is_rejected() -> Result<()> {
    let Some(server) = common::spawn_with_database().await? else {
        return Ok(());
    };
    server.signup("dupe", "testpassword").await?;

    let res = server
        .client
        .post(server.url("/signup"))
        .json(&json!({ "username": "dupe", "email": "other@example.com", "password": "x" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "User already exists");

    // The first account still logs in; the rejected one was never stored.
    server.login("dupe", "testpassword").await?;
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected() -> Result<()> {
    let Some(server) = common::spawn_with_database().await? else {
        return Ok(());
    };
    server.signup("first", "testpassword").await?;

    let res = server
        .client
        .post(server.url("/signup"))
        .json(&json!({ "username": "second", "email": "first@example.com", "password": "x" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "Email already registered");
    Ok(())
}

#[tokio::test]
async fn login_issues_bearer_token() -> Result<()> {
    let Some(server) = common::spawn_with_database().await? else {
        return Ok(());
    };
    server.signup("loginuser", "testpassword").await?;

    let res = server
        .client
        .post(server.url("/login"))
        .form(&[("username", "loginuser"), ("password", "testpassword")])
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["token_type"], "bearer");
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    Ok(())
}

#[tokio::test]
async fn bad_credentials_do_not_say_which_part_was_wrong() -> Result<()> {
    let Some(server) = common::spawn_with_database().await? else {
        return Ok(());
    };
    server.signup("realuser", "testpassword").await?;

    for (username, password) in [("realuser", "wrongpassword"), ("nobody", "testpassword")] {
        let res = server
            .client
            .post(server.url("/login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = res.json().await?;
        assert_eq!(body["detail"], "Incorrect username or password");
    }
    Ok(())
}

#[tokio::test]
async fn token_acts_as_the_user_who_logged_in() -> Result<()> {
    let Some(server) = common::spawn_with_database().await? else {
        return Ok(());
    };
    let alice = server.user_token("alice").await?;
    let bob = server.user_token("bob").await?;

    let movie = server.create_movie(&alice, "Alice's Film").await?;
    let id = movie["id"].as_i64().unwrap_or_default();

    let res = server
        .client
        .delete(server.url(&format!("/movies/{}", id)))
        .bearer_auth(&bob)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .delete(server.url(&format!("/movies/{}", id)))
        .bearer_auth(&alice)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
