//! Profile endpoints for the authenticated account.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};

use crate::extract::{AuthSubject, Json, ValidateJson};
use crate::handler::Result;
use crate::handler::request::{ChangePassword, UpdateProfile};
use crate::handler::response::Profile;
use crate::service::{ProfileService, ServiceState};

/// Tracing target for profile operations.
const TRACING_TARGET: &str = "warden_server::handler::profile";

/// Returns the caller's profile.
#[tracing::instrument(skip_all, fields(account_id = subject.account_id()))]
async fn get_profile(
    subject: AuthSubject,
    State(profile_service): State<ProfileService>,
) -> Result<Json<Profile>> {
    let account = profile_service.get_profile(subject.account_id()).await?;
    Ok(Json(account.into()))
}

/// Applies a partial update to the caller's profile (`PATCH` and `PUT`).
#[tracing::instrument(skip_all, fields(account_id = subject.account_id()))]
async fn update_profile(
    subject: AuthSubject,
    State(profile_service): State<ProfileService>,
    Json(request): Json<UpdateProfile>,
) -> Result<Json<Profile>> {
    let patch = request.into_patch()?;
    let account = profile_service
        .update_profile(subject.account_id(), patch)
        .await?;

    tracing::debug!(target: TRACING_TARGET, "Profile update applied");
    Ok(Json(account.into()))
}

/// Changes the caller's password.
#[tracing::instrument(skip_all, fields(account_id = subject.account_id()))]
async fn change_password(
    subject: AuthSubject,
    State(profile_service): State<ProfileService>,
    ValidateJson(request): ValidateJson<ChangePassword>,
) -> Result<StatusCode> {
    profile_service
        .change_password(
            subject.account_id(),
            &request.current_password,
            &request.new_password,
        )
        .await?;

    tracing::info!(target: TRACING_TARGET, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route(
            "/profile",
            get(get_profile).patch(update_profile).put(update_profile),
        )
        .route("/profile/password", post(change_password))
}

#[cfg(test)]
mod test {
    use axum::http::header::AUTHORIZATION;
    use axum::http::{HeaderValue, StatusCode};
    use serde_json::{Value, json};

    use crate::handler::test::{create_test_server, obtain_tokens, register_account};

    #[tokio::test]
    async fn get_profile_requires_token() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get("/profile").await;
        response.assert_status_unauthorized();
        assert_eq!(response.json::<Value>()["name"], "unauthenticated");
        Ok(())
    }

    #[tokio::test]
    async fn get_profile_accepts_jwt_scheme() -> anyhow::Result<()> {
        let server = create_test_server()?;
        register_account(&server, "a@x.com", "secret123").await;
        let (access, _) = obtain_tokens(&server, "a@x.com", "secret123").await;

        let response = server
            .get("/profile")
            .add_header(AUTHORIZATION, HeaderValue::from_str(&format!("JWT {access}"))?)
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["email"], "a@x.com");
        Ok(())
    }

    #[tokio::test]
    async fn refresh_token_is_not_accepted_as_access() -> anyhow::Result<()> {
        let server = create_test_server()?;
        register_account(&server, "a@x.com", "secret123").await;
        let (_, refresh) = obtain_tokens(&server, "a@x.com", "secret123").await;

        let response = server.get("/profile").authorization_bearer(refresh).await;
        response.assert_status_unauthorized();
        Ok(())
    }

    #[tokio::test]
    async fn patch_updates_only_name() -> anyhow::Result<()> {
        let server = create_test_server()?;
        register_account(&server, "a@x.com", "secret123").await;
        let (access, _) = obtain_tokens(&server, "a@x.com", "secret123").await;

        let response = server
            .patch("/profile")
            .authorization_bearer(&access)
            .json(&json!({"name": "A", "email": "evil@x.com", "id": 99}))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({"id": 1, "email": "a@x.com", "name": "A"})
        );

        let response = server.get("/profile").authorization_bearer(&access).await;
        assert_eq!(
            response.json::<Value>(),
            json!({"id": 1, "email": "a@x.com", "name": "A"})
        );
        Ok(())
    }

    #[tokio::test]
    async fn put_is_partial() -> anyhow::Result<()> {
        let server = create_test_server()?;
        register_account(&server, "a@x.com", "secret123").await;
        let (access, _) = obtain_tokens(&server, "a@x.com", "secret123").await;

        server
            .put("/profile")
            .authorization_bearer(&access)
            .json(&json!({"name": "Alice"}))
            .await
            .assert_status_ok();

        let response = server
            .put("/profile")
            .authorization_bearer(&access)
            .json(&json!({}))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["name"], "Alice");
        Ok(())
    }

    #[tokio::test]
    async fn rejects_blank_and_null_names() -> anyhow::Result<()> {
        let server = create_test_server()?;
        register_account(&server, "a@x.com", "secret123").await;
        let (access, _) = obtain_tokens(&server, "a@x.com", "secret123").await;

        for body in [json!({"name": ""}), json!({"name": "   "}), json!({"name": null})] {
            let response = server
                .patch("/profile")
                .authorization_bearer(&access)
                .json(&body)
                .await;
            response.assert_status_bad_request();
            let body: Value = response.json();
            assert_eq!(body["name"], "validation_error");
            assert!(body["errors"]["name"].is_array());
        }
        Ok(())
    }

    #[tokio::test]
    async fn change_password_flow() -> anyhow::Result<()> {
        let server = create_test_server()?;
        register_account(&server, "a@x.com", "secret123").await;
        let (access, _) = obtain_tokens(&server, "a@x.com", "secret123").await;

        let response = server
            .post("/profile/password")
            .authorization_bearer(&access)
            .json(&json!({"currentPassword": "wrong-password", "newPassword": "newsecret456"}))
            .await;
        response.assert_status_bad_request();
        assert!(response.json::<Value>()["errors"]["currentPassword"].is_array());

        server
            .post("/profile/password")
            .authorization_bearer(&access)
            .json(&json!({"currentPassword": "secret123", "newPassword": "newsecret456"}))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .post("/auth/token")
            .json(&json!({"email": "a@x.com", "password": "newsecret456"}))
            .await
            .assert_status_ok();
        Ok(())
    }
}
