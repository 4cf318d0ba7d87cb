use crate::domain::account::Account;
use crate::domain::error::DomainError;
use crate::domain::repository::AccountRepository;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace, warn};

/// Accounts keyed by email, held for the lifetime of the process.
#[derive(Clone)]
pub struct InMemoryAccountRepository {
    storage: Arc<RwLock<HashMap<String, Account>>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    #[instrument(skip(self, account), fields(account_id = %account.id, email = %account.email))]
    async fn insert(&self, account: Account) -> Result<()> {
        trace!("Acquiring write lock for account storage");
        let mut storage = self.storage.write().await;
        // check and insert under the same guard
        match storage.entry(account.email.clone()) {
            Entry::Occupied(_) => {
                warn!("Email already present in storage");
                Err(DomainError::DuplicateAccount.into())
            }
            Entry::Vacant(slot) => {
                slot.insert(account);
                debug!("Account saved to memory storage");
                Ok(())
            }
        }
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let storage = self.storage.read().await;
        let account = storage.get(email).cloned();
        match &account {
            Some(a) => debug!(account_id = %a.id, "Account found in storage"),
            None => trace!("Account not found in storage"),
        }
        Ok(account)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.storage.read().await.len())
    }

    async fn close(&self) {
        let mut storage = self.storage.write().await;
        debug!(accounts = storage.len(), "Dropping in-memory accounts");
        storage.clear();
    }
}
