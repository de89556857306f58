//! 인증 도메인 모델.

pub mod credentials;
pub mod identity;

pub use credentials::Credentials;
pub use identity::{Identity, NewUser, UserRecord};
