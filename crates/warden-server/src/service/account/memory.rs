//! Process-local account storage.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::RwLock;

use super::{AccountBackend, AccountChanges, AccountId, NewAccountRecord, UserAccount};
use crate::{Error, Result};

/// In-memory backend; contents are lost when the process exits.
///
/// Ids start at 1 and increase by one per account.
#[derive(Debug, Default)]
pub struct MemoryAccountBackend {
    inner: RwLock<MemoryAccounts>,
}

#[derive(Debug, Default)]
struct MemoryAccounts {
    accounts: BTreeMap<AccountId, UserAccount>,
    ids_by_email: HashMap<String, AccountId>,
    last_id: AccountId,
}

impl MemoryAccountBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountBackend for MemoryAccountBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, record: NewAccountRecord) -> Result<UserAccount> {
        // Uniqueness check and insert happen under one write lock.
        let mut guard = self.inner.write().await;
        if guard.ids_by_email.contains_key(&record.email) {
            return Err(Error::duplicate_email());
        }

        guard.last_id += 1;
        let account = UserAccount {
            id: guard.last_id,
            email: record.email,
            password_hash: record.password_hash,
            name: record.name,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            created_at: Timestamp::now(),
            last_login_at: None,
        };

        guard.ids_by_email.insert(account.email.clone(), account.id);
        guard.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<UserAccount>> {
        let guard = self.inner.read().await;
        Ok(guard.accounts.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        let guard = self.inner.read().await;
        Ok(guard
            .ids_by_email
            .get(email)
            .and_then(|id| guard.accounts.get(id))
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let guard = self.inner.read().await;
        Ok(guard.ids_by_email.contains_key(email))
    }

    async fn update(&self, id: AccountId, changes: AccountChanges) -> Result<Option<UserAccount>> {
        let mut guard = self.inner.write().await;
        let Some(account) = guard.accounts.get_mut(&id) else {
            return Ok(None);
        };

        changes.apply_to(account);
        Ok(Some(account.clone()))
    }

    async fn record_login(&self, id: AccountId) -> Result<Option<UserAccount>> {
        let mut guard = self.inner.write().await;
        let Some(account) = guard.accounts.get_mut(&id) else {
            return Ok(None);
        };

        account.last_login_at = Some(Timestamp::now().max(account.created_at));
        Ok(Some(account.clone()))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ErrorKind;

    fn record(email: &str) -> NewAccountRecord {
        NewAccountRecord {
            email: email.to_owned(),
            password_hash: "$argon2id$placeholder".to_owned(),
            name: None,
        }
    }

    #[tokio::test]
    async fn ids_start_at_one() -> anyhow::Result<()> {
        let backend = MemoryAccountBackend::new();
        let first = backend.insert(record("a@example.com")).await?;
        let second = backend.insert(record("b@example.com")).await?;

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(first.is_active);
        assert!(!first.is_staff && !first.is_superuser);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_duplicate_email() -> anyhow::Result<()> {
        let backend = MemoryAccountBackend::new();
        backend.insert(record("a@example.com")).await?;

        let error = backend.insert(record("a@example.com")).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DuplicateEmail);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_inserts_admit_one() {
        let backend = Arc::new(MemoryAccountBackend::new());
        let attempts = (0..8).map(|_| {
            let backend = Arc::clone(&backend);
            async move { backend.insert(record("race@example.com")).await }
        });

        let results = futures::future::join_all(attempts).await;
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| e.kind() == ErrorKind::DuplicateEmail)
        );
    }

    #[tokio::test]
    async fn update_missing_account_returns_none() -> anyhow::Result<()> {
        let backend = MemoryAccountBackend::new();
        let changes = AccountChanges {
            is_active: Some(false),
            ..AccountChanges::default()
        };
        assert!(backend.update(42, changes).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn record_login_is_not_before_creation() -> anyhow::Result<()> {
        let backend = MemoryAccountBackend::new();
        let created = backend.insert(record("a@example.com")).await?;

        let account = backend.record_login(created.id).await?;
        let last_login_at = account.and_then(|a| a.last_login_at);
        assert!(last_login_at.is_some_and(|at| at >= created.created_at));
        assert!(backend.record_login(42).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn finds_by_email_and_id() -> anyhow::Result<()> {
        let backend = MemoryAccountBackend::new();
        let created = backend.insert(record("a@example.com")).await?;

        assert_eq!(backend.find_by_email("a@example.com").await?, Some(created.clone()));
        assert_eq!(backend.find_by_id(created.id).await?, Some(created));
        assert!(backend.email_exists("a@example.com").await?);
        assert!(!backend.email_exists("b@example.com").await?);
        Ok(())
    }
}
