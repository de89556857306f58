//! 이메일/비밀번호 자격증명 검증.

use once_cell::sync::Lazy;
use stack_core::{Credentials, Identity};
use tracing::debug;

use super::{hash_password, verify_password, AuthError};
use crate::store::{StoreError, UserStore};

/// 존재하지 않는 이메일 검증에 쓰는 고정 해시.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| hash_password("unknown-account").ok());

/// 자격증명을 저장소의 사용자와 대조합니다.
///
/// 알 수 없는 이메일과 비밀번호 불일치는 모두 [`AuthError::Unauthorized`]로
/// 응답되며, 구분은 debug 로그에만 남습니다. 알 수 없는 이메일도
/// 고정 해시에 대해 Argon2 검증을 한 번 수행하므로 두 경로의 비용이 같습니다.
/// 저장소 장애는 [`AuthError::Store`]로 전달됩니다.
pub async fn verify(credentials: &Credentials, store: &dyn UserStore) -> Result<Identity, AuthError> {
    let record = match store.find_by_email(&credentials.email).await {
        Ok(record) => record,
        Err(StoreError::NotFound) => {
            if let Some(hash) = DUMMY_HASH.as_deref() {
                let _ = verify_password(credentials.password(), hash);
            }
            debug!(reason = "unknown_email", "credential verification failed");
            return Err(AuthError::Unauthorized);
        }
        Err(e) => return Err(AuthError::Store(e)),
    };

    if let Err(e) = verify_password(credentials.password(), &record.password_hash) {
        debug!(reason = %e, user_id = %record.id, "credential verification failed");
        return Err(AuthError::Unauthorized);
    }

    Ok(record.into_identity())
}
