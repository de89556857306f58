//! 모든 핸들러와 미들웨어에서 공유되는 애플리케이션 상태.
//!
//! 시작 시 한 번 구성되며 이후 변경되지 않습니다. `Arc`로 래핑되어
//! 요청 간에 잠금 없이 공유됩니다.

use std::sync::Arc;

use crate::auth::TokenCodec;
use crate::store::StoreProvider;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 사용자 저장소 풀 - 요청마다 핸들 발급
    pub store: Arc<dyn StoreProvider>,

    /// 토큰 발급/검증기
    pub tokens: Arc<TokenCodec>,

    /// Basic 인증 challenge realm
    pub realm: String,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    ///
    /// # 인자
    /// * `store` - 저장소 풀
    /// * `tokens` - 토큰 코덱
    pub fn new(store: Arc<dyn StoreProvider>, tokens: TokenCodec) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
            realm: "Restricted".to_string(),
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Basic 인증 realm 설정.
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store.backend())
            .field("realm", &self.realm)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// 테스트용 서명 시크릿.
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

/// 테스트용 AppState 생성 헬퍼.
///
/// 메모리 저장소와 고정 시크릿을 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    create_test_state_with_store(crate::store::MemoryStoreProvider::new())
}

/// 주어진 메모리 저장소로 테스트용 AppState 생성.
///
/// 호출자가 저장소 복제본을 유지하면 발급된 핸들 수를 확인할 수 있습니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state_with_store(store: crate::store::MemoryStoreProvider) -> AppState {
    use crate::auth::TokenConfig;

    let tokens = TokenCodec::new(TokenConfig::new(TEST_SECRET))
        .expect("test secret is non-empty");
    AppState::new(Arc::new(store), tokens)
}
