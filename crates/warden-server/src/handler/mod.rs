//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! ```rust
//! use warden_server::handler::routes;
//! use warden_server::service::{ServiceConfig, ServiceState};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServiceConfig::builder()
//!     .with_session_secret("change-me-to-a-long-random-secret-value")
//!     .build()?;
//! let state = ServiceState::from_config(&config).await?;
//! let router: axum::Router = routes().with_state(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod authentication;
mod error;
mod health;
mod profile;
pub mod request;
pub mod response;

use axum::Router;
use axum::http::Uri;

pub use crate::handler::error::{Error, ErrorKind, Result};
use crate::service::ServiceState;

/// Returns a [`Router`] with every route, still awaiting its state.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .merge(authentication::routes())
        .merge(profile::routes())
        .merge(health::routes())
        .fallback(fallback)
}

/// JSON 404 for unknown routes.
async fn fallback(uri: Uri) -> Error<'static> {
    ErrorKind::NotFound
        .with_resource("route")
        .with_context(format!("no route for '{}'", uri.path()))
}
