//! 인증된 신원과 사용자 저장소 레코드.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 인증된 주체.
///
/// 비밀번호 관련 필드를 갖지 않으므로 요청 컨텍스트로 비밀 정보가
/// 넘어갈 수 없습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct Identity {
    /// 사용자 ID (불투명 문자열)
    pub id: String,
    /// 이메일
    pub email: String,
    /// 이름
    pub first_name: String,
    /// 성
    pub last_name: String,
}

/// 저장소에 보관되는 사용자 레코드.
#[derive(Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// PHC 형식 비밀번호 해시
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// 해시를 버리고 인증된 신원으로 변환합니다.
    pub fn into_identity(self) -> Identity {
        Identity {
            id: self.id.to_string(),
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// 새 사용자 생성 입력. 비밀번호는 이미 해싱된 상태여야 합니다.
#[derive(Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    /// 생성 시각과 새 ID를 부여해 레코드로 변환합니다.
    pub fn into_record(self) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password_hash: self.password_hash,
            created_at: Utc::now(),
        }
    }
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}
