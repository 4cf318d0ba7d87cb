use crate::domain::account::Account;
use crate::domain::error::DomainError;
use crate::domain::repository::AccountRepository;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};

const CREATE_ACCOUNTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS accounts (
        id            TEXT PRIMARY KEY,
        name          TEXT NOT NULL,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at    TEXT NOT NULL
    )";

type AccountRow = (String, String, String, String, DateTime<Utc>);

/// SQLite-backed store. Email uniqueness is enforced by the table's
/// `UNIQUE` constraint, so concurrent inserts cannot both succeed.
#[derive(Clone)]
pub struct SqliteAccountRepository {
    pool: SqlitePool,
}

impl SqliteAccountRepository {
    /// Opens (creating if needed) the database at `url` and ensures the schema.
    #[instrument]
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid sqlite url {}", url))?
            .create_if_missing(true);

        // an in-memory database lives and dies with its single connection
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .context("failed to open sqlite database")?;

        sqlx::query(CREATE_ACCOUNTS_TABLE)
            .execute(&pool)
            .await
            .context("failed to create accounts table")?;

        info!("SQLite account store ready");
        Ok(Self { pool })
    }
}

fn store_unavailable(action: &str, err: sqlx::Error) -> anyhow::Error {
    warn!(error = %err, action = action, "SQLite operation failed");
    DomainError::StoreUnavailable(format!("failed to {}: {}", action, err)).into()
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
    #[instrument(skip(self, account), fields(account_id = %account.id, email = %account.email))]
    async fn insert(&self, account: Account) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO accounts (id, name, email, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!("Account row inserted");
                Ok(())
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                warn!("Unique constraint rejected duplicate email");
                Err(DomainError::DuplicateAccount.into())
            }
            Err(e) => Err(store_unavailable("insert account", e)),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT id, name, email, password_hash, created_at FROM accounts WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_unavailable("query account by email", e))?;

        Ok(row.map(|(id, name, email, password_hash, created_at)| Account {
            id,
            name,
            email,
            password_hash,
            created_at,
        }))
    }

    async fn count(&self) -> Result<usize> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| store_unavailable("count accounts", e))?;
        Ok(count as usize)
    }

    async fn close(&self) {
        info!("Closing SQLite connection pool");
        self.pool.close().await;
    }
}
