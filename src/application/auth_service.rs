use crate::domain::account::{Account, LoginRequest, SignupRequest};
use crate::domain::error::DomainError;
use crate::domain::repository::AccountRepository;
use crate::infrastructure::security::PasswordHashing;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};
use uuid::Uuid;

/// Signup and login on top of an injected account store.
///
/// Requests are expected to have passed
/// [`signup_validation`](crate::domain::validation::signup_validation) /
/// [`login_validation`](crate::domain::validation::login_validation) already.
pub struct AuthService<R: AccountRepository + ?Sized> {
    accounts: Arc<R>,
    hashing: PasswordHashing,
}

impl<R: AccountRepository + ?Sized> AuthService<R> {
    pub fn new(accounts: Arc<R>, hashing: PasswordHashing) -> Self {
        Self { accounts, hashing }
    }

    pub fn accounts(&self) -> &Arc<R> {
        &self.accounts
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn signup(&self, req: SignupRequest) -> Result<Account> {
        trace!("Starting signup");

        if self.accounts.find_by_email(&req.email).await?.is_some() {
            warn!("Account already exists");
            return Err(DomainError::DuplicateAccount.into());
        }

        let password_hash = self.hash_password(req.password).await?;

        let account = Account {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            email: req.email,
            password_hash,
            created_at: Utc::now(),
        };

        debug!(account_id = %account.id, "Saving account to store");
        // a concurrent signup may win between lookup and insert; the store rejects it
        self.accounts.insert(account.clone()).await?;

        info!(account_id = %account.id, "Account created");
        Ok(account)
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<Account> {
        trace!("Starting login");

        let account = self
            .accounts
            .find_by_email(&req.email)
            .await?
            .ok_or_else(|| {
                warn!("Unknown email during login");
                DomainError::InvalidCredentials
            })?;

        if !self.verify_password(req.password, account.password_hash.clone()).await? {
            warn!(account_id = %account.id, "Wrong password during login");
            return Err(DomainError::InvalidCredentials.into());
        }

        info!(account_id = %account.id, "Login successful");
        Ok(account)
    }

    async fn hash_password(&self, password: String) -> Result<String> {
        let hashing = self.hashing.clone();
        let hash = tokio::task::spawn_blocking(move || hashing.hash(&password))
            .await
            .map_err(|e| DomainError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| {
                error!(error = %e, "Failed to hash password");
                DomainError::Internal(format!("Failed to hash password: {}", e))
            })?;
        Ok(hash)
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool> {
        let hashing = self.hashing.clone();
        let valid = tokio::task::spawn_blocking(move || hashing.verify(&password, &hash))
            .await
            .map_err(|e| DomainError::Internal(format!("Verification task failed: {}", e)))?
            .map_err(|e| {
                error!(error = %e, "Stored password hash is unreadable");
                DomainError::Internal(format!("Failed to verify password: {}", e))
            })?;
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::InMemoryAccountRepository;

    fn service() -> AuthService<InMemoryAccountRepository> {
        AuthService::new(
            Arc::new(InMemoryAccountRepository::new()),
            PasswordHashing::new(1024, 1, 1).unwrap(),
        )
    }

    fn ann() -> SignupRequest {
        SignupRequest {
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password: "secret1".to_string(),
        }
    }

    fn login_as(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn domain_error(err: &anyhow::Error) -> &DomainError {
        err.downcast_ref::<DomainError>().expect("domain error")
    }

    #[tokio::test]
    async fn test_signup_stores_hash_not_plaintext() {
        let service = service();
        let account = service.signup(ann()).await.unwrap();

        assert_eq!(account.name, "Ann");
        assert_eq!(account.email, "ann@x.com");
        assert_ne!(account.password_hash, "secret1");

        let stored = service.accounts().find_by_email("ann@x.com").await.unwrap().unwrap();
        assert_eq!(stored.id, account.id);
        assert!(!stored.password_hash.contains("secret1"));
    }

    #[tokio::test]
    async fn test_second_signup_with_same_email_is_duplicate() {
        let service = service();
        service.signup(ann()).await.unwrap();

        let err = service.signup(ann()).await.unwrap_err();
        assert!(matches!(domain_error(&err), DomainError::DuplicateAccount));
        assert_eq!(service.accounts().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_login_with_correct_password() {
        let service = service();
        let created = service.signup(ann()).await.unwrap();

        let account = service.login(login_as("ann@x.com", "secret1")).await.unwrap();
        assert_eq!(account.id, created.id);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_fail_identically() {
        let service = service();
        service.signup(ann()).await.unwrap();

        let wrong = service.login(login_as("ann@x.com", "wrong")).await.unwrap_err();
        let unknown = service.login(login_as("bob@x.com", "secret1")).await.unwrap_err();

        assert!(matches!(domain_error(&wrong), DomainError::InvalidCredentials));
        assert!(matches!(domain_error(&unknown), DomainError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_login_does_not_write() {
        let service = service();
        service.signup(ann()).await.unwrap();

        let _ = service.login(login_as("ann@x.com", "secret1")).await;
        let _ = service.login(login_as("bob@x.com", "secret1")).await;
        assert_eq!(service.accounts().count().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_signups_create_exactly_one_account() {
        let service = Arc::new(service());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.signup(ann()).await })
            })
            .collect();

        let mut created = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(e) if matches!(domain_error(&e), DomainError::DuplicateAccount) => duplicates += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(duplicates, 7);
        assert_eq!(service.accounts().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_stored_hash_is_internal_error() {
        let service = service();
        service
            .accounts()
            .insert(Account {
                id: "broken".to_string(),
                name: "Ann".to_string(),
                email: "ann@x.com".to_string(),
                password_hash: "garbage".to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let err = service.login(login_as("ann@x.com", "secret1")).await.unwrap_err();
        assert!(matches!(domain_error(&err), DomainError::Internal(_)));
    }
}
