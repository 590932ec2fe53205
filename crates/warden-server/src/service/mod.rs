//! Application state and dependency injection.

pub mod account;
mod config;
mod profile;
pub mod security;
mod session;

use std::sync::Arc;

pub use crate::service::account::{
    AccountBackend, AccountId, AccountStore, MemoryAccountBackend, PgAccountBackend,
    Registration, UserAccount,
};
pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder, StorageBackend};
pub use crate::service::profile::{ProfilePatch, ProfileService};
pub use crate::service::security::{Argon2Costs, PasswordHasher, PasswordPolicy, SessionKeys};
pub use crate::service::session::{
    AccessToken, SessionClaims, SessionIssuer, TOKEN_AUDIENCE, TOKEN_ISSUER, TokenError,
    TokenKind, TokenPair,
};
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    pub account_store: AccountStore,
    pub session_issuer: SessionIssuer,
    pub profile_service: ProfileService,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Connects the configured storage backend, applying migrations for
    /// Postgres.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        config.validate()?;
        let backend = config.connect_storage().await?;
        Self::with_backend(config, backend)
    }

    /// Initializes application state over an already connected backend.
    pub fn with_backend(config: &ServiceConfig, backend: Arc<dyn AccountBackend>) -> Result<Self> {
        let account_store = AccountStore::new(
            backend,
            config.create_password_hasher()?,
            config.password_policy(),
        );

        let session_issuer = SessionIssuer::new(
            config.load_session_keys()?,
            config.access_token_ttl(),
            config.refresh_token_ttl(),
        );

        Ok(Self {
            profile_service: ProfileService::new(account_store.clone()),
            account_store,
            session_issuer,
        })
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(account_store: AccountStore);
impl_di!(session_issuer: SessionIssuer);
impl_di!(profile_service: ProfileService);
