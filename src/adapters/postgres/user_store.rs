//! PostgreSQL adapter for the `UserStore` port.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::user::{Contact, UserRecord};
use crate::ports::{GrantOutcome, StoreError, UserStore};

/// Store backed by the `user_info` table (plus `processed_stripe_events`
/// for webhook idempotency).
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create tables if they do not exist. Runs once at startup; there is no
    /// migrations engine.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_info (
                recurse_id bigint UNIQUE NOT NULL,
                lob_address_id text NOT NULL DEFAULT '',
                accepts_physical_mail boolean NOT NULL DEFAULT false,
                num_credits bigint NOT NULL DEFAULT 0,
                user_name text NOT NULL DEFAULT '',
                user_email text NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS processed_stripe_events (event_id text PRIMARY KEY)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn record_from_row(row: &sqlx::postgres::PgRow) -> UserRecord {
        UserRecord {
            recurse_id: row.get("recurse_id"),
            lob_address_id: row.get("lob_address_id"),
            accepts_physical_mail: row.get("accepts_physical_mail"),
            num_credits: row.get("num_credits"),
            user_name: row.get("user_name"),
            user_email: row.get("user_email"),
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn upsert(&self, record: &UserRecord) -> Result<(), StoreError> {
        // Credits are deliberately absent from the conflict update: a
        // re-registered address must not reset a paid balance.
        sqlx::query(
            r#"
            INSERT INTO user_info
                (recurse_id, lob_address_id, accepts_physical_mail, user_name, user_email)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (recurse_id) DO UPDATE SET
                lob_address_id = excluded.lob_address_id,
                accepts_physical_mail = excluded.accepts_physical_mail,
                user_name = excluded.user_name,
                user_email = excluded.user_email
            "#,
        )
        .bind(record.recurse_id)
        .bind(&record.lob_address_id)
        .bind(record.accepts_physical_mail)
        .bind(&record.user_name)
        .bind(&record.user_email)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, member_id: i64) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT recurse_id, lob_address_id, accepts_physical_mail,
                   num_credits, user_name, user_email
            FROM user_info WHERE recurse_id = $1
            "#,
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::record_from_row))
    }

    async fn credits(&self, member_id: i64) -> Result<i64, StoreError> {
        let credits: Option<i64> =
            sqlx::query_scalar("SELECT num_credits FROM user_info WHERE recurse_id = $1")
                .bind(member_id)
                .fetch_optional(&self.pool)
                .await?;

        credits.ok_or(StoreError::NotFound(member_id))
    }

    async fn try_spend_credit(&self, member_id: i64) -> Result<Option<i64>, StoreError> {
        // Single conditional update so concurrent sends cannot race the
        // balance below zero.
        let remaining: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE user_info
            SET num_credits = num_credits - 1
            WHERE recurse_id = $1 AND num_credits > 0
            RETURNING num_credits
            "#,
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(remaining)
    }

    async fn grant_credits_for_event(
        &self,
        event_id: &str,
        member_id: i64,
        amount: i64,
    ) -> Result<GrantOutcome, StoreError> {
        // One transaction: an error after the dedup insert rolls the event
        // id back out, so the provider's retry gets another chance at the
        // grant instead of being swallowed as a duplicate.
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO processed_stripe_events (event_id) VALUES ($1) ON CONFLICT DO NOTHING",
        )
        .bind(event_id)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(GrantOutcome::Duplicate);
        }

        let updated =
            sqlx::query("UPDATE user_info SET num_credits = num_credits + $2 WHERE recurse_id = $1")
                .bind(member_id)
                .bind(amount)
                .execute(&mut *tx)
                .await?;

        tx.commit().await?;

        if updated.rows_affected() == 0 {
            // No member row to credit; the event id stays recorded so the
            // delivery is not retried against us forever.
            return Ok(GrantOutcome::UnknownMember);
        }
        Ok(GrantOutcome::Granted)
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>, StoreError> {
        let rows = sqlx::query(
            "SELECT recurse_id, accepts_physical_mail, user_name, user_email FROM user_info",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| Contact {
                recurse_id: row.get("recurse_id"),
                accepts_physical_mail: row.get("accepts_physical_mail"),
                name: row.get("user_name"),
                email: row.get("user_email"),
            })
            .collect())
    }

    async fn delete(&self, member_id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM user_info WHERE recurse_id = $1")
            .bind(member_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(member_id));
        }
        Ok(())
    }
}
