//! Password hashing and verification using Argon2id.

use std::fmt;
use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version};

use crate::{Error, Result};

const TRACING_TARGET: &str = "warden_server::service::password_hasher";

/// Fixed input for the precomputed hash used by [`PasswordHasher::verify_dummy_password`].
const DUMMY_PASSWORD: &str = "warden-dummy-password-never-matches";

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Costs {
    /// Memory size in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Argon2Costs {
    /// Memory cost recommended by OWASP for Argon2id.
    pub const DEFAULT_MEMORY_KIB: u32 = 19 * 1024;
    /// Iteration count recommended by OWASP for Argon2id.
    pub const DEFAULT_ITERATIONS: u32 = 2;
    /// Parallelism recommended by OWASP for Argon2id.
    pub const DEFAULT_PARALLELISM: u32 = 1;
}

impl Default for Argon2Costs {
    fn default() -> Self {
        Self {
            memory_kib: Self::DEFAULT_MEMORY_KIB,
            iterations: Self::DEFAULT_ITERATIONS,
            parallelism: Self::DEFAULT_PARALLELISM,
        }
    }
}

/// Salted, deliberately slow password hashing.
///
/// Hashes are PHC strings (`$argon2id$v=19$m=...`) that embed their own
/// parameters, so hashes produced under older costs keep verifying after the
/// costs change.
#[derive(Clone)]
pub struct PasswordHasher {
    inner: Arc<PasswordHasherInner>,
}

struct PasswordHasherInner {
    argon2: Argon2<'static>,
    dummy_hash: String,
}

impl PasswordHasher {
    /// Creates a hasher with the given Argon2id costs.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the costs are outside the ranges
    /// Argon2 accepts.
    pub fn new(costs: Argon2Costs) -> Result<Self> {
        let params = Params::new(costs.memory_kib, costs.iterations, costs.parallelism, None)
            .map_err(|e| {
                Error::config(format!("invalid argon2 parameters: {e}"))
            })?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, DUMMY_PASSWORD)?;

        tracing::debug!(
            target: TRACING_TARGET,
            memory_kib = costs.memory_kib,
            iterations = costs.iterations,
            parallelism = costs.parallelism,
            "Password hasher initialized"
        );

        Ok(Self {
            inner: Arc::new(PasswordHasherInner { argon2, dummy_hash }),
        })
    }

    /// Hashes a password with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        hash_with(&self.inner.argon2, password)
    }

    /// Verifies a password against a stored PHC hash.
    ///
    /// Returns `Ok(false)` on a mismatch. Fails only if the stored hash cannot
    /// be parsed or the verification itself errors.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %e,
                "Invalid password hash format"
            );
            Error::internal("password_hasher", "stored hash is malformed")
        })?;

        match self
            .inner
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(ArgonError::Password) => {
                tracing::debug!(target: TRACING_TARGET, "Password mismatch");
                Ok(false)
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "Password verification failed"
                );
                Err(Error::internal("password_hasher", "verification failed"))
            }
        }
    }

    /// Runs a verification that always fails.
    ///
    /// Spends the same work as a real verification so that a missing account
    /// cannot be told apart from a wrong password by response time.
    pub fn verify_dummy_password(&self, password: &str) -> bool {
        let _ = self.verify_password(password, &self.inner.dummy_hash);
        false
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "Password hashing failed"
            );
            Error::internal("password_hasher", "hashing failed")
        })
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_hasher() -> anyhow::Result<PasswordHasher> {
        let costs = Argon2Costs {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        };
        Ok(PasswordHasher::new(costs)?)
    }

    #[test]
    fn hash_and_verify_password() -> anyhow::Result<()> {
        let hasher = cheap_hasher()?;
        let hash = hasher.hash_password("secret123")?;

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("secret123", &hash)?);
        assert!(!hasher.verify_password("secret124", &hash)?);

        Ok(())
    }

    #[test]
    fn hash_produces_unique_salts() -> anyhow::Result<()> {
        let hasher = cheap_hasher()?;

        let hash1 = hasher.hash_password("secret123")?;
        let hash2 = hasher.hash_password("secret123")?;

        assert_ne!(hash1, hash2);
        assert!(hasher.verify_password("secret123", &hash1)?);
        assert!(hasher.verify_password("secret123", &hash2)?);

        Ok(())
    }

    #[test]
    fn hashes_carry_their_own_parameters() -> anyhow::Result<()> {
        let old = cheap_hasher()?;
        let hash = old.hash_password("secret123")?;

        let new = PasswordHasher::new(Argon2Costs {
            memory_kib: 2048,
            iterations: 2,
            parallelism: 1,
        })?;
        assert!(new.verify_password("secret123", &hash)?);

        Ok(())
    }

    #[test]
    fn invalid_hash_is_an_internal_error() -> anyhow::Result<()> {
        let hasher = cheap_hasher()?;
        let error = hasher
            .verify_password("secret123", "not_a_valid_hash_format")
            .unwrap_err();
        assert_eq!(error.kind(), crate::ErrorKind::Internal);
        Ok(())
    }

    #[test]
    fn dummy_verification_never_matches() -> anyhow::Result<()> {
        let hasher = cheap_hasher()?;
        assert!(!hasher.verify_dummy_password(DUMMY_PASSWORD));
        assert!(!hasher.verify_dummy_password("secret123"));
        Ok(())
    }

    #[test]
    fn rejects_out_of_range_costs() {
        let costs = Argon2Costs {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        let error = PasswordHasher::new(costs).unwrap_err();
        assert_eq!(error.kind(), crate::ErrorKind::Config);
    }
}
