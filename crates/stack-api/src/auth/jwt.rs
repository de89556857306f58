//! JWT 세션 토큰.
//!
//! 프로세스 전역 시크릿 하나와 고정 알고리즘(HS256)으로 토큰을 서명합니다.
//! 토큰은 서버에 저장되지 않으며, 유효성은 서명/알고리즘/만료만으로 결정됩니다.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use stack_core::{AuthConfig, Identity, StackError, StackResult};

use super::AuthError;

/// 토큰 유효 기간 (24시간).
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT 페이로드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 ID
    pub sub: String,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// `now` 시점에 발급되는 Claims.
    pub fn for_identity(identity: &Identity, now: i64) -> Self {
        Self {
            sub: identity.id.clone(),
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        }
    }

    /// `now`가 만료 시각을 지났는지 확인. `now == exp`는 아직 유효합니다.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.exp
    }
}

/// 토큰 거부 사유. 로그와 메트릭에만 사용되며 클라이언트에는 노출되지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenRejection {
    #[error("malformed token")]
    Malformed,
    #[error("unexpected signing algorithm")]
    WrongAlgorithm,
    #[error("signature mismatch")]
    BadSignature,
    #[error("unexpected claims shape")]
    BadClaims,
    #[error("token expired")]
    Expired,
}

impl TokenRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenRejection::Malformed => "malformed",
            TokenRejection::WrongAlgorithm => "wrong_algorithm",
            TokenRejection::BadSignature => "bad_signature",
            TokenRejection::BadClaims => "bad_claims",
            TokenRejection::Expired => "expired",
        }
    }
}

/// 토큰 서명 설정.
pub struct TokenConfig {
    secret: SecretString,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::from(secret.into()),
        }
    }

    /// `auth` 설정 섹션에서 생성. 시크릿이 비어 있으면 설정 에러.
    pub fn from_auth_config(config: &AuthConfig) -> StackResult<Self> {
        Ok(Self {
            secret: config.signing_secret()?,
        })
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// 토큰 발급/검증기.
///
/// 시작 시 한 번 생성되어 `Arc`로 공유됩니다. 생성 이후 불변입니다.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// 코덱 생성. 빈 시크릿은 거부됩니다.
    pub fn new(config: TokenConfig) -> StackResult<Self> {
        let secret = config.secret.expose_secret();
        if secret.trim().is_empty() {
            return Err(StackError::Config("token signing secret is empty".to_string()));
        }

        // 만료는 직접 검사 (leeway 없음, exp == now 허용)
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// 현재 시각 기준으로 토큰을 발급합니다.
    pub fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        self.issue_at(identity, Utc::now().timestamp())
    }

    /// `now` 시점 기준으로 토큰을 발급합니다.
    pub fn issue_at(&self, identity: &Identity, now: i64) -> Result<String, AuthError> {
        self.encode_claims(&Claims::for_identity(identity, now))
    }

    /// 임의의 Claims를 서명합니다.
    pub fn encode_claims(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding)
            .map_err(|e| AuthError::Encoding(e.to_string()))
    }

    /// 현재 시각 기준으로 토큰을 검증합니다.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// `now` 시점 기준으로 토큰을 검증합니다.
    ///
    /// 헤더의 알고리즘을 먼저 확인한 뒤 서명, Claims 형태, 만료 순으로 검사합니다.
    pub fn validate_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| TokenRejection::Malformed)?;
        if header.alg != ALGORITHM {
            return Err(TokenRejection::WrongAlgorithm.into());
        }

        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenRejection::BadSignature,
                ErrorKind::InvalidAlgorithm => TokenRejection::WrongAlgorithm,
                ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => {
                    TokenRejection::BadClaims
                }
                _ => TokenRejection::Malformed,
            }
        })?;

        if data.claims.is_expired_at(now) {
            return Err(TokenRejection::Expired.into());
        }

        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .finish_non_exhaustive()
    }
}
