//! HTTP server startup and lifecycle management.

use std::future::{Future, pending};
use std::time::Instant;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::config::ServerConfig;
use crate::server::{Result, ServerError, shutdown_signal};
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Binds the configured address and serves `app` until a shutdown signal.
///
/// After the signal, in-flight requests get up to the configured shutdown
/// timeout to finish.
pub async fn serve(app: Router, server_config: ServerConfig) -> Result<()> {
    server_config
        .validate()
        .map_err(|err| ServerError::InvalidConfig(err.to_string()))?;

    let server_addr = server_config.server_addr();
    let listener = TcpListener::bind(server_addr).await.map_err(|err| {
        let error = ServerError::bind_error(server_addr, err);
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %server_addr,
            error = %error,
            code = error.error_code(),
            suggestion = error.suggestion(),
            "Failed to bind to address"
        );
        error
    })?;

    let local_addr = listener.local_addr().map_err(ServerError::Runtime)?;
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %local_addr,
        "Server is ready and listening for connections"
    );

    if server_config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "Server is bound to all interfaces. Ensure firewall rules are properly configured."
        );
    }

    let (drain_tx, drain_rx) = oneshot::channel();
    let signal = async move {
        shutdown_signal().await;
        let _ = drain_tx.send(());
    };

    let server = axum::serve(listener, app).with_graceful_shutdown(signal);
    serve_with_shutdown(&server_config, server.into_future(), drain_rx).await
}

/// Drives the server future and bounds the drain after shutdown starts.
///
/// `drain_started` resolves once the shutdown signal was received; from then
/// on in-flight requests get `shutdown_timeout` before they are abandoned.
async fn serve_with_shutdown<F>(
    server_config: &ServerConfig,
    server: F,
    drain_started: oneshot::Receiver<()>,
) -> Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    let start_time = Instant::now();
    let shutdown_timeout = server_config.shutdown_timeout();

    let drain_deadline = async move {
        if drain_started.await.is_ok() {
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                timeout_secs = shutdown_timeout.as_secs(),
                "Graceful shutdown initiated"
            );
            tokio::time::sleep(shutdown_timeout).await;
        } else {
            pending::<()>().await;
        }
    };

    let result = tokio::select! {
        result = server => result,
        () = drain_deadline => {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                timeout_secs = shutdown_timeout.as_secs(),
                "Shutdown timeout elapsed, abandoning in-flight requests"
            );
            Ok(())
        }
    };
    let uptime = start_time.elapsed();

    match result {
        Ok(()) => {
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                uptime_secs = uptime.as_secs(),
                shutdown_timeout_secs = server_config.shutdown_timeout,
                "Server shut down gracefully"
            );
            Ok(())
        }
        Err(err) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %err,
                kind = ?err.kind(),
                uptime_secs = uptime.as_secs(),
                "Server encountered an error"
            );
            Err(ServerError::Runtime(err))
        }
    }
}
