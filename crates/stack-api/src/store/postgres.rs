//! PostgreSQL 사용자 저장소.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool, Postgres};
use stack_core::{DatabaseConfig, NewUser, UserRecord};
use tokio::sync::Mutex;
use tracing::{info, trace};
use uuid::Uuid;

use super::{StoreError, StoreHandle, StoreProvider, UserStore};

/// DB에서 조회한 사용자 row
#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

const SELECT_USER: &str = r#"
    SELECT id, first_name, last_name, email, password_hash, created_at
    FROM users
"#;

/// PostgreSQL 연결 풀.
#[derive(Clone)]
pub struct PgStoreProvider {
    pool: PgPool,
}

impl PgStoreProvider {
    /// 설정으로 연결 풀을 생성합니다.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_secs)))
            .connect(&config.url)
            .await?;

        info!(max_connections = config.max_connections, "PostgreSQL pool created");
        Ok(Self { pool })
    }

    /// 기존 풀을 감쌉니다.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `users` 테이블 마이그레이션 실행.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

#[async_trait]
impl StoreProvider for PgStoreProvider {
    async fn acquire(&self) -> Result<StoreHandle, StoreError> {
        let conn = self.pool.acquire().await?;
        trace!(backend = "postgres", "store handle acquired");
        Ok(StoreHandle::new(PgSession {
            conn: Mutex::new(conn),
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

/// 요청 하나가 점유하는 풀 연결.
///
/// `PoolConnection`은 drop 시 풀로 반환됩니다.
struct PgSession {
    conn: Mutex<PoolConnection<Postgres>>,
}

impl Drop for PgSession {
    fn drop(&mut self) {
        trace!(backend = "postgres", "store handle released");
    }
}

#[async_trait]
impl UserStore for PgSession {
    async fn find_by_email(&self, email: &str) -> Result<UserRecord, StoreError> {
        let mut conn = self.conn.lock().await;
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE email = $1"))
            .bind(email)
            .fetch_optional(&mut **conn)
            .await?;

        row.map(UserRecord::from).ok_or(StoreError::NotFound)
    }

    async fn find_by_id(&self, id: &str) -> Result<UserRecord, StoreError> {
        let id = Uuid::parse_str(id).map_err(|_| StoreError::NotFound)?;
        let mut conn = self.conn.lock().await;
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut **conn)
            .await?;

        row.map(UserRecord::from).ok_or(StoreError::NotFound)
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let record = user.into_record();
        let mut conn = self.conn.lock().await;
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, first_name, last_name, email, password_hash, created_at
            "#,
        )
        .bind(record.id)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.created_at)
        .fetch_one(&mut **conn)
        .await?;

        Ok(row.into())
    }
}
