use crate::domain::account::Account;
use anyhow::Result;
use async_trait::async_trait;

/// Persistence boundary for accounts, keyed by normalized email.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Atomically inserts `account`, failing with
    /// [`DomainError::DuplicateAccount`](crate::domain::error::DomainError::DuplicateAccount)
    /// when an account with the same email is already stored.
    async fn insert(&self, account: Account) -> Result<()>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    async fn count(&self) -> Result<usize>;

    /// Releases underlying resources. The repository must not be used afterwards.
    async fn close(&self) {}
}
