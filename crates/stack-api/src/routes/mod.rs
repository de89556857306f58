//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 저장소 연결 확인 (readiness)
//! - `/api/v1/auth/signup` - 가입 (연결 할당)
//! - `/api/v1/auth/signin` - 토큰 발급 (연결 할당 → Basic 인증)
//! - `/api/v1/auth/me` - 현재 사용자 (연결 할당 → Bearer 인증)

pub mod auth;
pub mod health;

pub use auth::{auth_router, SignUpRequest, SignUpResponse, TokenResponse};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 인증 체인은 생성 시점에 상태를 캡처하므로 `state`를 받습니다.
pub fn create_api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/api/v1/auth", auth_router(state))
}
