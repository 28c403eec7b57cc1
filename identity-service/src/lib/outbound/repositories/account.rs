use std::str::FromStr;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::account::errors::AccountError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::NewAccount;
use crate::domain::account::models::Role;
use crate::domain::ledger::models::HashedToken;
use crate::domain::account::ports::AccountRepository;

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, AccountError> {
    let id: Uuid = row
        .try_get("id")
        .map_err(|e| AccountError::Database(e.to_string()))?;
    let email: String = row
        .try_get("email")
        .map_err(|e| AccountError::Database(e.to_string()))?;
    let password_hash: String = row
        .try_get("password_hash")
        .map_err(|e| AccountError::Database(e.to_string()))?;
    let role: String = row
        .try_get("role")
        .map_err(|e| AccountError::Database(e.to_string()))?;
    let name: String = row
        .try_get("name")
        .map_err(|e| AccountError::Database(e.to_string()))?;
    let verified: bool = row
        .try_get("verified")
        .map_err(|e| AccountError::Database(e.to_string()))?;
    let suspended: bool = row
        .try_get("suspended")
        .map_err(|e| AccountError::Database(e.to_string()))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| AccountError::Database(e.to_string()))?;

    Ok(Account {
        id: AccountId(id),
        email: EmailAddress::new(email)?,
        password_hash,
        role: Role::from_str(&role)?,
        name,
        verified,
        suspended,
        created_at,
    })
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create(
        &self,
        account: NewAccount,
        verification: HashedToken,
    ) -> Result<Account, AccountError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        let row = sqlx::query(
            r#"
            INSERT INTO accounts (id, email, password_hash, role, name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING created_at
            "#,
        )
        .bind(account.id.0)
        .bind(account.email.as_str())
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(&account.name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some("accounts_email_key")
                {
                    return AccountError::DuplicateEmail(account.email.as_str().to_string());
                }
            }
            AccountError::Database(e.to_string())
        })?;

        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| AccountError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO profiles (account_id, company_name, stage, expertise, hourly_rate)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(account.id.0)
        .bind(&account.profile.company_name)
        .bind(&account.profile.stage)
        .bind(&account.profile.expertise)
        .bind(account.profile.hourly_rate)
        .execute(&mut *tx)
        .await
        .map_err(|e| AccountError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO email_verifications (account_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(account.id.0)
        .bind(&verification.hash)
        .bind(verification.expires_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| AccountError::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        Ok(Account {
            id: account.id,
            email: account.email,
            password_hash: account.password_hash,
            role: account.role,
            name: account.name,
            verified: false,
            suspended: false,
            created_at,
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, role, name, verified, suspended, created_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::Database(e.to_string()))?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, role, name, verified, suspended, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::Database(e.to_string()))?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn set_verified(&self, id: &AccountId) -> Result<(), AccountError> {
        sqlx::query("UPDATE accounts SET verified = TRUE WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        Ok(())
    }

    async fn set_password_hash(&self, id: &AccountId, hash: &str) -> Result<(), AccountError> {
        sqlx::query("UPDATE accounts SET password_hash = $2 WHERE id = $1")
            .bind(id.0)
            .bind(hash)
            .execute(&self.pool)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        Ok(())
    }
}
