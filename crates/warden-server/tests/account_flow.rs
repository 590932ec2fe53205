//! End-to-end flows through the full router and middleware stack.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use warden_server::handler::routes;
use warden_server::middleware::{
    CorsConfig, RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt,
};
use warden_server::service::{ServiceConfig, ServiceState};

async fn create_server() -> anyhow::Result<TestServer> {
    let config = ServiceConfig::builder()
        .with_session_secret("integration-session-secret-of-32-bytes-or-more")
        .with_argon2_memory_kib(1024u32)
        .with_argon2_iterations(1u32)
        .build()?;
    let state = ServiceState::from_config(&config).await?;

    let app = routes()
        .with_state(state)
        .with_security(&CorsConfig::default())
        .with_observability()
        .with_metrics()
        .with_recovery(&RecoveryConfig::default());

    Ok(TestServer::new(app)?)
}

async fn login(server: &TestServer, email: &str, password: &str) -> Value {
    let response = server
        .post("/auth/token")
        .json(&json!({"email": email, "password": password}))
        .await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
async fn register_login_and_rename() -> anyhow::Result<()> {
    let server = create_server().await?;

    let response = server
        .post("/auth/register")
        .json(&json!({"email": "a@x.com", "password": "secret123"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(
        response.json::<Value>(),
        json!({"id": 1, "email": "a@x.com", "name": null})
    );

    let tokens = login(&server, "a@x.com", "secret123").await;
    let access = tokens["accessToken"].as_str().unwrap_or_default();

    let response = server
        .patch("/profile")
        .authorization_bearer(access)
        .json(&json!({"name": "A"}))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"id": 1, "email": "a@x.com", "name": "A"})
    );
    assert!(response.maybe_header("x-request-id").is_some());
    Ok(())
}

#[tokio::test]
async fn refreshed_access_token_reaches_profile() -> anyhow::Result<()> {
    let server = create_server().await?;
    server
        .post("/auth/register")
        .json(&json!({"email": "b@x.com", "password": "secret123", "name": "Bee"}))
        .await
        .assert_status(StatusCode::CREATED);

    let tokens = login(&server, "b@x.com", "secret123").await;
    let response = server
        .post("/auth/token/refresh")
        .json(&json!({"refreshToken": tokens["refreshToken"]}))
        .await;
    response.assert_status_ok();
    let access = response.json::<Value>()["accessToken"]
        .as_str()
        .unwrap_or_default()
        .to_owned();

    let response = server.get("/profile").authorization_bearer(access).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["name"], "Bee");
    Ok(())
}

#[tokio::test]
async fn tampered_token_is_rejected() -> anyhow::Result<()> {
    let server = create_server().await?;
    server
        .post("/auth/register")
        .json(&json!({"email": "c@x.com", "password": "secret123"}))
        .await
        .assert_status(StatusCode::CREATED);

    let tokens = login(&server, "c@x.com", "secret123").await;
    let access = tokens["accessToken"].as_str().unwrap_or_default();

    // Swap one character in the middle of the signature segment.
    let index = access.len() - 10;
    let replacement = if &access[index..=index] == "A" { "B" } else { "A" };
    let access = format!("{}{}{}", &access[..index], replacement, &access[index + 1..]);

    let response = server.get("/profile").authorization_bearer(access).await;
    response.assert_status_unauthorized();
    assert_eq!(response.json::<Value>()["name"], "unauthenticated");
    Ok(())
}

#[tokio::test]
async fn concurrent_registrations_admit_one() -> anyhow::Result<()> {
    let server = create_server().await?;

    let attempts = (0..8).map(|_| async {
        server
            .post("/auth/register")
            .json(&json!({"email": "race@x.com", "password": "secret123"}))
            .await
            .status_code()
    });
    let statuses = futures::future::join_all(attempts).await;

    let created = statuses
        .iter()
        .filter(|status| **status == StatusCode::CREATED)
        .count();
    let rejected = statuses
        .iter()
        .filter(|status| **status == StatusCode::BAD_REQUEST)
        .count();
    assert_eq!(created, 1);
    assert_eq!(rejected, statuses.len() - 1);
    Ok(())
}

#[tokio::test]
async fn missing_authorization_is_json_401() -> anyhow::Result<()> {
    let server = create_server().await?;

    let response = server.get("/profile").await;
    response.assert_status_unauthorized();
    let body: Value = response.json();
    assert_eq!(body["name"], "unauthenticated");
    assert!(body["message"].is_string());
    Ok(())
}
