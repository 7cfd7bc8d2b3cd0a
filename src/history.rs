use alloy_primitives::{Address, U256};
use chrono::Utc;
use eyre::Result;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::info;

/// Append-only SQLite audit log of liquidation attempts and cycle events.
/// Diagnostic only: nothing in here is ever read back into a cycle, so
/// position data always comes from the chain.
#[derive(Clone)]
pub struct HistoryStore {
    pool: Pool<Sqlite>,
}

impl HistoryStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = Pool::<Sqlite>::connect_with(options).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS liquidation_attempts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                borrower TEXT NOT NULL,
                health_factor REAL NOT NULL,
                debt_to_cover TEXT NOT NULL,
                tx_hash TEXT,
                outcome TEXT NOT NULL,
                timestamp DATETIME NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cycle_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                cycle INTEGER NOT NULL,
                event_type TEXT NOT NULL,
                details TEXT,
                timestamp DATETIME NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        info!("History database initialized at {}", database_url);
        Ok(Self { pool })
    }

    pub async fn record_attempt(
        &self,
        borrower: Address,
        health_factor: f64,
        debt_to_cover: U256,
        tx_hash: Option<&str>,
        outcome: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO liquidation_attempts (
                borrower, health_factor, debt_to_cover, tx_hash, outcome, timestamp
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(borrower.to_string())
        .bind(health_factor)
        .bind(debt_to_cover.to_string())
        .bind(tx_hash)
        .bind(outcome)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn log_cycle_event(
        &self,
        cycle: u64,
        event_type: &str,
        details: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cycle_events (cycle, event_type, details, timestamp)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(cycle as i64)
        .bind(event_type)
        .bind(details)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn attempt_count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM liquidation_attempts")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn attempts_round_trip() {
        let history = HistoryStore::connect("sqlite::memory:").await.unwrap();

        let borrower = Address::from([7u8; 20]);
        history
            .record_attempt(borrower, 0.92, U256::from(5_000_000_000u64), Some("0xabc"), "executed")
            .await
            .unwrap();
        history
            .record_attempt(borrower, 0.95, U256::from(1_000u64), None, "not_ready")
            .await
            .unwrap();

        assert_eq!(history.attempt_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn cycle_events_are_appended() {
        let history = HistoryStore::connect("sqlite::memory:").await.unwrap();

        history.log_cycle_event(1, "cycle_complete", Some("idle")).await.unwrap();
        history.log_cycle_event(2, "cycle_error", None).await.unwrap();

        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cycle_events")
            .fetch_one(&history.pool)
            .await
            .unwrap();
        assert_eq!(row.0, 2);
    }
}
