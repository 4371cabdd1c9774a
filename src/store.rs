// src/store.rs

// Хранилище снапшотов: абстрактный key -> blob (сериализованный SceneState).
// Ядро использует его только для restore на старте и периодических save.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::Mutex;

#[derive(Debug)]
pub enum StoreError {
    Database(sqlx::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Database(err) => write!(f, "database error: {}", err),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

/// Контракт хранилища снапшотов. Blob для ядра непрозрачен.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Upsert: последняя запись побеждает.
    async fn save(&self, session_id: &str, state_json: &str) -> Result<(), StoreError>;
    async fn load_all(&self) -> Result<HashMap<String, String>, StoreError>;
    async fn delete(&self, session_id: &str) -> Result<(), StoreError>;
}

/// Postgres-хранилище: одна строка на сессию плюс отметка времени.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Подключается к базе и создает таблицу снапшотов, если ее нет.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session_snapshots (
                session_id TEXT PRIMARY KEY,
                state_json JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl SnapshotStore for PgStore {
    async fn save(&self, session_id: &str, state_json: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO session_snapshots (session_id, state_json, updated_at)
            VALUES ($1, $2::jsonb, NOW())
            ON CONFLICT (session_id) DO UPDATE
            SET state_json = EXCLUDED.state_json, updated_at = NOW()
            "#,
        )
        .bind(session_id)
        .bind(state_json)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_all(&self) -> Result<HashMap<String, String>, StoreError> {
        let rows =
            sqlx::query("SELECT session_id, state_json::text AS state_json FROM session_snapshots")
                .fetch_all(&self.pool)
                .await?;

        let mut snapshots = HashMap::with_capacity(rows.len());
        for row in rows {
            let session_id: String = row.try_get("session_id")?;
            let state_json: String = row.try_get("state_json")?;
            snapshots.insert(session_id, state_json);
        }
        Ok(snapshots)
    }

    async fn delete(&self, session_id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM session_snapshots WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Хранилище в памяти — для тестов и запуска без базы.
#[derive(Default)]
pub struct MemoryStore {
    snapshots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn save(&self, session_id: &str, state_json: &str) -> Result<(), StoreError> {
        self.snapshots
            .lock()
            .await
            .insert(session_id.to_string(), state_json.to_string());
        Ok(())
    }

    async fn load_all(&self) -> Result<HashMap<String, String>, StoreError> {
        Ok(self.snapshots.lock().await.clone())
    }

    async fn delete(&self, session_id: &str) -> Result<(), StoreError> {
        self.snapshots.lock().await.remove(session_id);
        Ok(())
    }
}
