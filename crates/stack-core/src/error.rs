//! 인증 스택의 시작 단계 에러 타입.
//!
//! 설정 로드와 저장소 준비 중 발생하는 에러를 분류합니다.
//! 요청 처리 경로의 에러와 HTTP 상태 코드 매핑은 API 크레이트가 담당합니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum StackError {
    /// 설정 에러 (서명 시크릿 미설정, 잘못된 설정값 등)
    #[error("설정 에러: {0}")]
    Config(String),

    /// 저장소 연결 또는 마이그레이션 실패
    #[error("저장소 에러: {0}")]
    Store(String),
}

/// 인증 스택 작업을 위한 Result 타입.
pub type StackResult<T> = Result<T, StackError>;

impl From<config::ConfigError> for StackError {
    fn from(err: config::ConfigError) -> Self {
        StackError::Config(err.to_string())
    }
}
