//! HTTP 에러 응답.
//!
//! 인증 파이프라인의 모든 거부 응답은 이 타입을 거칩니다. 응답 본문은
//! 평문이며, 401 응답은 사유와 무관하게 같은 본문을 사용합니다.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::auth::{AuthError, PasswordError};
use crate::store::StoreError;

/// API 에러.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Basic 인증 실패 (`WWW-Authenticate` challenge 포함)
    #[error("Not authorized")]
    Challenge { realm: String },
    /// 알 수 없는 토큰 주체 등
    #[error("Not authorized")]
    Unauthorized,
    /// 토큰 누락/검증 실패
    #[error("Invalid Token")]
    InvalidToken,
    #[error("{0}")]
    BadRequest(String),
    /// 중복 계정, 잘못된 가입 필드
    #[error("{0}")]
    Conflict(String),
    /// 핸들러가 기대한 컨텍스트 값이 없음 (미들웨어 구성 오류)
    #[error("No {0} context")]
    MissingContext(&'static str),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Challenge { .. } | ApiError::Unauthorized | ApiError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::MissingContext(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::MissingContext(_) => {
                error!(error = %self, "handler mounted without required middleware");
                self.to_string()
            }
            ApiError::Internal(message) => {
                error!(error = %message, "internal error");
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let mut response = (status, body).into_response();
        if let ApiError::Challenge { realm } = &self {
            let challenge = format!("Basic realm=\"{}\"", realm);
            match HeaderValue::from_str(&challenge) {
                Ok(value) => {
                    response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
                }
                Err(_) => {
                    response.headers_mut().insert(
                        header::WWW_AUTHENTICATE,
                        HeaderValue::from_static("Basic realm=\"Restricted\""),
                    );
                }
            }
        }
        response
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(message) => ApiError::Conflict(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized => ApiError::Unauthorized,
            AuthError::InvalidToken(_) => ApiError::InvalidToken,
            AuthError::Encoding(message) => ApiError::Internal(message),
            AuthError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

/// 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;
