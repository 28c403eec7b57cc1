use async_trait::async_trait;
use auth_core::opaque::hash_token;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::account::models::AccountId;
use crate::domain::ledger::models::HashedToken;
use crate::domain::ledger::models::TokenPurpose;
use crate::domain::ledger::ports::LedgerError;
use crate::domain::ledger::ports::TokenLedger;

pub struct PostgresTokenLedger {
    pool: PgPool,
}

impl PostgresTokenLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Table names come from this closed set only; never from input.
fn table(purpose: TokenPurpose) -> &'static str {
    match purpose {
        TokenPurpose::EmailVerification => "email_verifications",
        TokenPurpose::PasswordReset => "password_resets",
        TokenPurpose::RefreshSession => "refresh_sessions",
    }
}

#[async_trait]
impl TokenLedger for PostgresTokenLedger {
    async fn store(
        &self,
        purpose: TokenPurpose,
        account_id: &AccountId,
        token: HashedToken,
        user_agent: Option<String>,
    ) -> Result<(), LedgerError> {
        match purpose {
            TokenPurpose::EmailVerification => {
                // Replace-all: the freshest token is the only live one.
                let mut tx = self
                    .pool
                    .begin()
                    .await
                    .map_err(|e| LedgerError::Database(e.to_string()))?;

                sqlx::query("DELETE FROM email_verifications WHERE account_id = $1")
                    .bind(account_id.0)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| LedgerError::Database(e.to_string()))?;

                sqlx::query(
                    r#"
                    INSERT INTO email_verifications (account_id, token_hash, expires_at)
                    VALUES ($1, $2, $3)
                    "#,
                )
                .bind(account_id.0)
                .bind(&token.hash)
                .bind(token.expires_at)
                .execute(&mut *tx)
                .await
                .map_err(|e| LedgerError::Database(e.to_string()))?;

                tx.commit()
                    .await
                    .map_err(|e| LedgerError::Database(e.to_string()))?;
            }
            TokenPurpose::PasswordReset => {
                // At most one reset per account, newest wins.
                sqlx::query(
                    r#"
                    INSERT INTO password_resets (account_id, token_hash, expires_at)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (account_id)
                    DO UPDATE SET token_hash = EXCLUDED.token_hash,
                                  expires_at = EXCLUDED.expires_at
                    "#,
                )
                .bind(account_id.0)
                .bind(&token.hash)
                .bind(token.expires_at)
                .execute(&self.pool)
                .await
                .map_err(|e| LedgerError::Database(e.to_string()))?;
            }
            TokenPurpose::RefreshSession => {
                // Additive: one row per login keeps other devices signed in.
                sqlx::query(
                    r#"
                    INSERT INTO refresh_sessions (account_id, token_hash, user_agent, expires_at)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(account_id.0)
                .bind(&token.hash)
                .bind(user_agent)
                .bind(token.expires_at)
                .execute(&self.pool)
                .await
                .map_err(|e| LedgerError::Database(e.to_string()))?;
            }
        }

        Ok(())
    }

    async fn consume(
        &self,
        purpose: TokenPurpose,
        plaintext: &str,
    ) -> Result<AccountId, LedgerError> {
        let hash = hash_token(plaintext);

        // Single-use purposes delete the row in the same statement that
        // matches it, so a replay races against nothing.
        let query = match purpose {
            TokenPurpose::EmailVerification | TokenPurpose::PasswordReset => format!(
                "DELETE FROM {} WHERE token_hash = $1 AND expires_at > now() \
                 RETURNING account_id",
                table(purpose)
            ),
            TokenPurpose::RefreshSession => {
                "SELECT account_id FROM refresh_sessions \
                 WHERE token_hash = $1 AND expires_at > now()"
                    .to_string()
            }
        };

        let row = sqlx::query(&query)
            .bind(&hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .ok_or(LedgerError::TokenNotFound)?;

        let account_id: Uuid = row
            .try_get("account_id")
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(AccountId(account_id))
    }

    async fn revoke_by_token(
        &self,
        purpose: TokenPurpose,
        plaintext: &str,
    ) -> Result<(), LedgerError> {
        let hash = hash_token(plaintext);

        sqlx::query(&format!(
            "DELETE FROM {} WHERE token_hash = $1",
            table(purpose)
        ))
        .bind(&hash)
        .execute(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(())
    }

    async fn revoke_for_account(
        &self,
        purpose: TokenPurpose,
        account_id: &AccountId,
    ) -> Result<(), LedgerError> {
        sqlx::query(&format!(
            "DELETE FROM {} WHERE account_id = $1",
            table(purpose)
        ))
        .bind(account_id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(())
    }
}
