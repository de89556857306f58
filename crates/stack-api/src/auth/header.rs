//! `Authorization` 헤더 파싱.
//!
//! 헤더 값은 `<scheme> <payload>` 형태로 정확히 두 부분이어야 합니다.
//! 스킴 비교는 대소문자를 구분하지 않습니다.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine};
use stack_core::Credentials;

/// 헤더 파싱 에러. 인증 단계에서는 모두 401로 응답됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("Authorization 헤더가 없습니다")]
    Missing,
    #[error("Authorization 헤더 형식 오류")]
    Malformed,
    #[error("지원하지 않는 인증 스킴")]
    WrongScheme,
    #[error("base64 디코딩 실패")]
    InvalidBase64,
    #[error("UTF-8이 아닌 자격증명")]
    InvalidUtf8,
    #[error("자격증명에 ':' 구분자가 없습니다")]
    MissingSeparator,
}

impl HeaderError {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderError::Missing => "missing_header",
            HeaderError::Malformed => "malformed_header",
            HeaderError::WrongScheme => "wrong_scheme",
            HeaderError::InvalidBase64 => "invalid_base64",
            HeaderError::InvalidUtf8 => "invalid_utf8",
            HeaderError::MissingSeparator => "missing_separator",
        }
    }
}

fn authorization(headers: &HeaderMap) -> Result<(&str, &str), HeaderError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(HeaderError::Missing)?
        .to_str()
        .map_err(|_| HeaderError::Malformed)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(payload), None) if !scheme.is_empty() && !payload.is_empty() => {
            Ok((scheme, payload))
        }
        _ => Err(HeaderError::Malformed),
    }
}

/// `Authorization: Basic base64(email:password)`에서 자격증명을 추출합니다.
pub fn parse_basic(headers: &HeaderMap) -> Result<Credentials, HeaderError> {
    let (scheme, payload) = authorization(headers)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(HeaderError::WrongScheme);
    }

    let decoded = STANDARD
        .decode(payload)
        .map_err(|_| HeaderError::InvalidBase64)?;
    let pair = String::from_utf8(decoded).map_err(|_| HeaderError::InvalidUtf8)?;

    Credentials::from_basic_pair(&pair).ok_or(HeaderError::MissingSeparator)
}

/// `Authorization: Bearer <token>`에서 토큰을 추출합니다.
pub fn parse_bearer(headers: &HeaderMap) -> Result<String, HeaderError> {
    let (scheme, token) = authorization(headers)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(HeaderError::WrongScheme);
    }
    Ok(token.to_string())
}
