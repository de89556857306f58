//! HTTP 인증 파이프라인 및 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API (가입, 토큰 발급, 현재 사용자)
//! - 요청 단위 인증 미들웨어 체인 (연결 할당 → Basic/Bearer 인증)
//! - HS256 세션 토큰
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: 자격증명 검증, 토큰, 헤더 파싱
//! - [`context`]: 요청 범위 컨텍스트
//! - [`middleware`]: 인증 체인 빌더 및 HTTP 미들웨어
//! - [`store`]: 사용자 저장소 (PostgreSQL, 메모리)
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`openapi`]: OpenAPI 문서

pub mod auth;
pub mod context;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod store;

pub use auth::{AuthError, Claims, TokenCodec, TokenConfig, TOKEN_TTL_SECS};
pub use context::{ContextKey, RequestContext};
pub use error::{ApiError, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::{metrics_layer, Chain};
pub use routes::create_api_router;
pub use state::AppState;
pub use store::{
    MemoryStoreProvider, PgStoreProvider, StoreError, StoreHandle, StoreProvider, UserStore,
};

#[cfg(any(test, feature = "test-utils"))]
pub use state::{create_test_state, create_test_state_with_store, TEST_SECRET};
