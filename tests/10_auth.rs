mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = reqwest::get(server.url("/health")).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn register_then_login_resolves_to_the_same_user() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/auth/register"))
        .json(&json!({ "name": "A", "email": "a@x.com", "password": "secret1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let registered: Value = res.json().await?;
    assert_eq!(registered["message"], "User registered successfully");
    assert_eq!(registered["user"]["email"], "a@x.com");
    assert_eq!(registered["user"]["name"], "A");
    assert!(registered["user"].get("hashedPassword").is_none());
    let user_id = registered["user"]["id"].as_str().unwrap().to_string();

    let res = client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "email": "a@x.com", "password": "secret1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let logged_in: Value = res.json().await?;
    assert_eq!(logged_in["message"], "Login successful");
    assert_eq!(logged_in["user"]["id"], user_id.as_str());

    let token = logged_in["token"].as_str().unwrap();
    let identity = server.state.tokens.verify(token)?;
    assert_eq!(identity.user_id.to_string(), user_id);
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_conflict() -> Result<()> {
    let server = common::spawn_server().await?;
    common::register_user(&server, "A", "dup@x.com", "secret1").await?;

    let res = reqwest::Client::new()
        .post(server.url("/api/auth/register"))
        .json(&json!({ "name": "B", "email": "dup@x.com", "password": "another1" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn registration_validation_reports_each_field() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = reqwest::Client::new()
        .post(server.url("/api/auth/register"))
        .json(&json!({ "name": "", "email": "not-an-email", "password": "123" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    for field in ["name", "email", "password"] {
        assert!(body["field_errors"][field].is_array(), "missing error for {field}");
    }
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_invalid_json() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = reqwest::Client::new()
        .post(server.url("/api/auth/login"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn bad_credentials_do_not_reveal_which_part_was_wrong() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    common::register_user(&server, "A", "known@x.com", "secret1").await?;

    let wrong_password = client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "email": "known@x.com", "password": "wrong-one" }))
        .send()
        .await?;
    let unknown_email = client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "email": "nobody@x.com", "password": "secret1" }))
        .send()
        .await?;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    let a: Value = wrong_password.json().await?;
    let b: Value = unknown_email.json().await?;
    assert_eq!(a["message"], "Invalid credentials");
    assert_eq!(a, b);
    Ok(())
}

#[tokio::test]
async fn me_requires_a_bearer_token() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let (user_id, token) = common::register_user(&server, "A", "me@x.com", "secret1").await?;

    let anonymous = client.get(server.url("/api/auth/me")).send().await?;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let forged = client
        .get(server.url("/api/auth/me"))
        .bearer_auth("forged.token.value")
        .send()
        .await?;
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);

    let res = client.get(server.url("/api/auth/me")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["user"]["id"], user_id.as_str());
    assert_eq!(body["user"]["email"], "me@x.com");
    Ok(())
}

#[tokio::test]
async fn me_for_a_vanished_user_is_not_found() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.state.tokens.issue(uuid::Uuid::new_v4())?;

    let res = reqwest::Client::new()
        .get(server.url("/api/auth/me"))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
