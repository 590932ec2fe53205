//! Liveness endpoint.

use axum::Router;
use axum::extract::State;
use axum::routing::get;

use crate::extract::Json;
use crate::handler::response::Health;
use crate::handler::{ErrorKind, Result};
use crate::service::{AccountStore, ServiceState};

const TRACING_TARGET: &str = "warden_server::handler::health";

/// Reports whether the storage backend is reachable.
async fn health(State(account_store): State<AccountStore>) -> Result<Json<Health>> {
    let storage = account_store.backend_name();

    if let Err(error) = account_store.health_check().await {
        tracing::warn!(
            target: TRACING_TARGET,
            storage,
            error = %error,
            "Health check failed"
        );
        return Err(ErrorKind::ServiceUnavailable.with_resource(storage));
    }

    Ok(Json(Health {
        status: "ok".to_owned(),
        storage: storage.to_owned(),
    }))
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod test {
    use serde_json::{Value, json};

    use crate::handler::test::create_test_server;

    #[tokio::test]
    async fn reports_memory_backend() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get("/health").await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({"status": "ok", "storage": "memory"})
        );
        Ok(())
    }
}
