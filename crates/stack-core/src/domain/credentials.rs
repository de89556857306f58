//! 이메일/비밀번호 자격증명.
//!
//! 검증 단계에서만 잠시 존재하며 어디에도 평문으로 저장되지 않습니다.

use secrecy::{ExposeSecret, SecretString};

/// 요청에서 추출한 자격증명.
///
/// `Debug` 출력에서 비밀번호는 가려집니다.
pub struct Credentials {
    /// 이메일 (사용자 식별자)
    pub email: String,
    password: SecretString,
}

impl Credentials {
    /// 새 자격증명 생성.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// `email:password` 형식의 디코딩된 Basic 페어를 파싱합니다.
    ///
    /// 첫 번째 `:`를 기준으로 나누며, 비밀번호에는 `:`가 포함될 수 있습니다.
    /// 구분자가 없으면 `None`을 반환합니다.
    pub fn from_basic_pair(pair: &str) -> Option<Self> {
        let (email, password) = pair.split_once(':')?;
        Some(Self::new(email, password))
    }

    /// 평문 비밀번호를 노출합니다. 해시 비교 시에만 사용합니다.
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_basic_pair() {
        let creds = Credentials::from_basic_pair("ada@example.com:hunter2").unwrap();
        assert_eq!(creds.email, "ada@example.com");
        assert_eq!(creds.password(), "hunter2");
    }

    #[test]
    fn test_basic_pair_password_with_colon() {
        let creds = Credentials::from_basic_pair("ada@example.com:a:b:c").unwrap();
        assert_eq!(creds.email, "ada@example.com");
        assert_eq!(creds.password(), "a:b:c");
    }

    #[test]
    fn test_basic_pair_without_colon() {
        assert!(Credentials::from_basic_pair("ada@example.com").is_none());
        assert!(Credentials::from_basic_pair("").is_none());
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("ada@example.com", "hunter2");
        let printed = format!("{:?}", creds);
        assert!(printed.contains("ada@example.com"));
        assert!(!printed.contains("hunter2"));
    }

    proptest! {
        #[test]
        fn prop_split_is_lossless(email in "[^:]{0,32}", password in ".{0,32}") {
            let pair = format!("{}:{}", email, password);
            let creds = Credentials::from_basic_pair(&pair).unwrap();
            prop_assert_eq!(&creds.email, &email);
            prop_assert_eq!(creds.password(), password.as_str());
        }
    }
}
