//! 설정 관리.
//!
//! 기본값 → 설정 파일(선택) → 환경 변수(`STACK__` 접두사) 순으로 병합합니다.
//!
//! ```text
//! STACK__AUTH__JWT_SECRET=...        # 필수
//! STACK__DATABASE__URL=postgres://... # 비어 있으면 메모리 저장소 사용
//! STACK__SERVER__PORT=8080
//! ```

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{StackError, StackResult};
use crate::logging::LogFormat;

/// 환경 변수 접두사.
pub const ENV_PREFIX: &str = "STACK";

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 인증 설정
    #[serde(default)]
    pub auth: AuthConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 전체 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// `host:port` 형식의 바인딩 주소.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 연결 URL. 비어 있으면 메모리 저장소를 사용합니다.
    pub url: String,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 획득 타임아웃 (초)
    pub connection_timeout_secs: u64,
    /// 유휴 타임아웃 (초)
    pub idle_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            connection_timeout_secs: 30,
            idle_timeout_secs: 300,
        }
    }
}

impl DatabaseConfig {
    /// 외부 데이터베이스가 설정되었는지 확인합니다.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// 인증 설정.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// 토큰 서명용 공유 시크릿
    pub jwt_secret: String,
    /// Basic 인증 challenge의 realm
    pub realm: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            realm: "Restricted".to_string(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("realm", &self.realm)
            .finish()
    }
}

impl AuthConfig {
    /// 서명 시크릿을 반환합니다.
    ///
    /// # Errors
    /// 시크릿이 비어 있으면 `StackError::Config`를 반환합니다.
    pub fn signing_secret(&self) -> StackResult<SecretString> {
        if self.jwt_secret.trim().is_empty() {
            return Err(StackError::Config(format!(
                "auth.jwt_secret is not set (use {}__AUTH__JWT_SECRET)",
                ENV_PREFIX
            )));
        }
        Ok(SecretString::from(self.jwt_secret.clone()))
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨 필터 (예: "info", "stack_api=debug")
    pub level: String,
    /// 출력 형식
    pub format: LogFormat,
    /// span 진입/종료 이벤트 기록
    pub span_events: bool,
    /// 파일명과 줄 번호 기록
    pub file: bool,
    /// 스레드 ID 기록
    pub thread_ids: bool,
    /// 대상(모듈 경로) 기록
    pub target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            span_events: false,
            file: true,
            thread_ids: false,
            target: true,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 건너뜁니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = Self::defaults()?
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(Self::environment());

        builder.build()?.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load(DEFAULT_CONFIG_PATH)
    }

    /// TOML 문자열에서 설정을 로드합니다 (환경 변수 미적용).
    pub fn from_toml(contents: &str) -> Result<Self, config::ConfigError> {
        Self::defaults()?
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// 시작 전 필수 설정을 검증합니다.
    pub fn validate(&self) -> StackResult<()> {
        self.auth.signing_secret()?;
        if self.server.port == 0 {
            return Err(StackError::Config("server.port must be non-zero".to_string()));
        }
        Ok(())
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    {
        config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("auth.realm", "Restricted")
    }

    /// 환경 변수 소스. 값은 문자열로 유지되고 숫자 필드만 역직렬화 시 변환됩니다.
    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
    }
}
