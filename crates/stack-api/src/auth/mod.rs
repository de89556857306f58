//! 인증 구성 요소.
//!
//! 미들웨어 단계가 조합하는 기본 요소를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`TokenCodec`]: HS256 세션 토큰 발급/검증
//! - [`verify`]: 이메일/비밀번호 자격증명 검증
//! - [`parse_basic`], [`parse_bearer`]: `Authorization` 헤더 파싱
//! - 비밀번호 해싱 함수 (Argon2id)

mod header;
mod jwt;
mod password;
mod verifier;

pub use header::{parse_basic, parse_bearer, HeaderError};
pub use jwt::{Claims, TokenCodec, TokenConfig, TokenRejection, TOKEN_TTL_SECS};
pub use password::{hash_password, verify_password, PasswordError};
pub use verifier::verify;

use crate::store::StoreError;

/// 인증 에러.
///
/// `Unauthorized`와 `InvalidToken`은 HTTP 401로 응답되며 세부 사유는
/// 로그에만 남습니다.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("인증 실패")]
    Unauthorized,
    #[error("유효하지 않은 토큰: {0}")]
    InvalidToken(TokenRejection),
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(String),
    #[error("저장소 에러: {0}")]
    Store(StoreError),
}

impl From<TokenRejection> for AuthError {
    fn from(rejection: TokenRejection) -> Self {
        AuthError::InvalidToken(rejection)
    }
}
