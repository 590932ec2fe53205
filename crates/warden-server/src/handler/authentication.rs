//! Registration and token endpoints.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;

use crate::extract::{Json, ValidateJson};
use crate::handler::request::{Login, RefreshToken, Register, VerifyToken};
use crate::handler::response::{AccessTokenResponse, Profile, TokenPairResponse, VerifiedToken};
use crate::handler::Result;
use crate::service::{AccountStore, ServiceState, SessionIssuer};

/// Tracing target for authentication operations.
const TRACING_TARGET: &str = "warden_server::handler::authentication";

/// Creates a new account.
#[tracing::instrument(skip_all)]
async fn register(
    State(account_store): State<AccountStore>,
    ValidateJson(request): ValidateJson<Register>,
) -> Result<(StatusCode, Json<Profile>)> {
    tracing::trace!(target: TRACING_TARGET, "Registration attempt");

    let account = account_store.register(request.into()).await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

/// Exchanges credentials for an access and refresh token pair.
#[tracing::instrument(skip_all)]
async fn obtain_token(
    State(account_store): State<AccountStore>,
    State(session_issuer): State<SessionIssuer>,
    ValidateJson(request): ValidateJson<Login>,
) -> Result<Json<TokenPairResponse>> {
    tracing::trace!(target: TRACING_TARGET, "Login attempt");

    let account = account_store
        .verify_credentials(&request.email, &request.password)
        .await?;
    let tokens = session_issuer.issue(account.id)?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = account.id,
        "Token pair issued"
    );

    Ok(Json(tokens.into()))
}

/// Exchanges a refresh token for a new access token.
#[tracing::instrument(skip_all)]
async fn refresh_token(
    State(session_issuer): State<SessionIssuer>,
    ValidateJson(request): ValidateJson<RefreshToken>,
) -> Result<Json<AccessTokenResponse>> {
    let access_token = session_issuer.refresh(&request.refresh_token)?;
    Ok(Json(access_token.into()))
}

/// Reports whether a token of either kind is currently valid.
#[tracing::instrument(skip_all)]
async fn verify_token(
    State(session_issuer): State<SessionIssuer>,
    ValidateJson(request): ValidateJson<VerifyToken>,
) -> Result<Json<VerifiedToken>> {
    let claims = session_issuer.verify(&request.token)?;
    Ok(Json(claims.into()))
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/token", post(obtain_token))
        .route("/auth/token/refresh", post(refresh_token))
        .route("/auth/token/verify", post(verify_token))
}

#[cfg(test)]
mod test {
    use axum::body::Bytes;
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::handler::test::{create_test_server, obtain_tokens, register_account};

    #[tokio::test]
    async fn register_returns_created_account() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .post("/auth/register")
            .json(&json!({"email": "A@X.Com", "password": "secret123", "name": "Alice"}))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["id"], 1);
        assert_eq!(body["email"], "a@x.com");
        assert_eq!(body["name"], "Alice");
        assert!(body.get("password").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn register_trims_and_lowercases_email() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .post("/auth/register")
            .json(&json!({"email": "  A@X.com ", "password": "secret123"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.json::<Value>()["email"], "a@x.com");

        let response = server
            .post("/auth/token")
            .json(&json!({"email": "  A@X.com ", "password": "secret123"}))
            .await;
        response.assert_status_ok();
        Ok(())
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() -> anyhow::Result<()> {
        let server = create_test_server()?;
        register_account(&server, "a@x.com", "secret123").await;

        let response = server
            .post("/auth/register")
            .json(&json!({"email": "A@x.com", "password": "secret123"}))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["name"], "duplicate_email");
        assert!(body["errors"]["email"].is_array());
        Ok(())
    }

    #[tokio::test]
    async fn register_reports_password_policy() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .post("/auth/register")
            .json(&json!({"email": "a@x.com", "password": "1234"}))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["name"], "invalid_password");
        assert_eq!(body["errors"]["password"].as_array().map(Vec::len), Some(2));
        Ok(())
    }

    #[tokio::test]
    async fn register_rejects_bad_email_and_bad_json() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .post("/auth/register")
            .json(&json!({"email": "not-an-email", "password": "secret123"}))
            .await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["name"], "validation_error");
        assert!(body["errors"]["email"].is_array());

        let response = server
            .post("/auth/register")
            .bytes(Bytes::from_static(b"{not json"))
            .content_type("application/json")
            .await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["name"], "validation_error");
        Ok(())
    }

    #[tokio::test]
    async fn obtain_token_returns_pair() -> anyhow::Result<()> {
        let server = create_test_server()?;
        register_account(&server, "a@x.com", "secret123").await;

        let response = server
            .post("/auth/token")
            .json(&json!({"email": "a@x.com", "password": "secret123"}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["accessToken"].is_string());
        assert!(body["refreshToken"].is_string());
        assert!(body["expiresAt"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn credential_failures_share_one_body() -> anyhow::Result<()> {
        let server = create_test_server()?;
        register_account(&server, "a@x.com", "secret123").await;

        let wrong_password = server
            .post("/auth/token")
            .json(&json!({"email": "a@x.com", "password": "wrong-password"}))
            .await;
        let unknown_email = server
            .post("/auth/token")
            .json(&json!({"email": "nobody@x.com", "password": "secret123"}))
            .await;

        wrong_password.assert_status_unauthorized();
        unknown_email.assert_status_unauthorized();
        assert_eq!(wrong_password.json::<Value>(), unknown_email.json::<Value>());
        assert_eq!(wrong_password.json::<Value>()["name"], "invalid_credentials");
        Ok(())
    }

    #[tokio::test]
    async fn refresh_and_verify_tokens() -> anyhow::Result<()> {
        let server = create_test_server()?;
        register_account(&server, "a@x.com", "secret123").await;
        let (access, refresh) = obtain_tokens(&server, "a@x.com", "secret123").await;

        let response = server
            .post("/auth/token/refresh")
            .json(&json!({"refreshToken": refresh}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["accessToken"].is_string());

        let response = server
            .post("/auth/token/verify")
            .json(&json!({"token": access}))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["tokenType"], "access");

        let response = server
            .post("/auth/token/verify")
            .json(&json!({"token": refresh}))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["tokenType"], "refresh");
        Ok(())
    }

    #[tokio::test]
    async fn refresh_rejects_access_token() -> anyhow::Result<()> {
        let server = create_test_server()?;
        register_account(&server, "a@x.com", "secret123").await;
        let (access, _) = obtain_tokens(&server, "a@x.com", "secret123").await;

        let response = server
            .post("/auth/token/refresh")
            .json(&json!({"refreshToken": access}))
            .await;

        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["name"], "unauthenticated");
        assert_eq!(body["context"], "token is of the wrong kind");
        Ok(())
    }

    #[tokio::test]
    async fn verify_rejects_garbage() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .post("/auth/token/verify")
            .json(&json!({"token": "garbage"}))
            .await;

        response.assert_status_unauthorized();
        assert_eq!(response.json::<Value>()["context"], "token is malformed");
        Ok(())
    }
}
