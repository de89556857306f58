//! 사용자 저장소.
//!
//! 인증 파이프라인은 저장소를 두 단계로 사용합니다:
//! - [`StoreProvider`]: 프로세스 전역 풀. 요청마다 핸들을 하나씩 발급합니다.
//! - [`StoreHandle`]: 요청 범위 핸들. 마지막 복제본이 drop되면 풀로 반환됩니다.
//!
//! # 구현체
//!
//! - [`PgStoreProvider`]: PostgreSQL (`sqlx::PgPool`)
//! - [`MemoryStoreProvider`]: 프로세스 내 메모리 (테스트 및 DB 미설정 시)

mod memory;
mod postgres;

pub use memory::{MemoryStoreProvider, MemoryUserStore};
pub use postgres::PgStoreProvider;

use std::sync::Arc;

use async_trait::async_trait;
use stack_core::{NewUser, StackError, UserRecord};

/// 저장소 에러.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("사용자를 찾을 수 없습니다")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("저장소 백엔드 에러: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(DUPLICATE_EMAIL.to_string())
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

impl From<StoreError> for StackError {
    fn from(err: StoreError) -> Self {
        StackError::Store(err.to_string())
    }
}

/// 중복 이메일 충돌 메시지.
pub const DUPLICATE_EMAIL: &str = "a user with this email already exists";

/// 사용자 저장소 연산.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 이메일로 사용자 조회.
    async fn find_by_email(&self, email: &str) -> Result<UserRecord, StoreError>;

    /// ID로 사용자 조회. ID 형식이 잘못되었으면 `NotFound`.
    async fn find_by_id(&self, id: &str) -> Result<UserRecord, StoreError>;

    /// 새 사용자 생성. 이메일이 이미 존재하면 `Conflict`.
    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError>;
}

/// 요청 범위 저장소 핸들을 발급하는 풀.
#[async_trait]
pub trait StoreProvider: Send + Sync {
    /// 요청 하나가 사용할 핸들을 획득합니다.
    async fn acquire(&self) -> Result<StoreHandle, StoreError>;

    /// 백엔드 연결 상태 확인.
    async fn ping(&self) -> Result<(), StoreError>;

    /// 백엔드 이름 (로그/헬스 체크용).
    fn backend(&self) -> &'static str;
}

/// 요청 범위 저장소 핸들.
///
/// 복제는 같은 연결을 공유합니다. 모든 복제본이 drop되는 시점에
/// 연결이 풀로 반환됩니다.
#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<dyn UserStore>,
}

impl StoreHandle {
    pub fn new(store: impl UserStore + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }
}

impl std::ops::Deref for StoreHandle {
    type Target = dyn UserStore;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle").finish_non_exhaustive()
    }
}
