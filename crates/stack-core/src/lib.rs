//! # Stack Core
//!
//! 인증 스택의 핵심 도메인 모델 및 공통 인프라를 제공합니다.
//!
//! 이 크레이트는 API 크레이트 전반에서 사용되는 기본 타입을 제공합니다:
//! - 자격증명(Credentials) 및 인증된 신원(Identity)
//! - 사용자 저장소 레코드
//! - 설정 관리
//! - 로깅 인프라
//! - 에러 분류 체계

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
