//! 메모리 기반 사용자 저장소.
//!
//! DB 없이 서버를 띄우거나 테스트할 때 사용합니다. 발급된 핸들 수를
//! 추적하므로 핸들 반환 여부를 검증할 수 있습니다.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use stack_core::{NewUser, UserRecord};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreHandle, StoreProvider, UserStore, DUPLICATE_EMAIL};

#[derive(Default)]
struct Tables {
    by_id: HashMap<Uuid, UserRecord>,
    by_email: HashMap<String, Uuid>,
}

/// 메모리 사용자 테이블.
#[derive(Default)]
pub struct MemoryUserStore {
    tables: RwLock<Tables>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 사용자 수.
    pub async fn len(&self) -> usize {
        self.tables.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<UserRecord, StoreError> {
        let tables = self.tables.read().await;
        tables
            .by_email
            .get(email)
            .and_then(|id| tables.by_id.get(id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_id(&self, id: &str) -> Result<UserRecord, StoreError> {
        let id = Uuid::parse_str(id).map_err(|_| StoreError::NotFound)?;
        self.tables
            .read()
            .await
            .by_id
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.by_email.contains_key(&user.email) {
            return Err(StoreError::Conflict(DUPLICATE_EMAIL.to_string()));
        }

        let record = user.into_record();
        tables.by_email.insert(record.email.clone(), record.id);
        tables.by_id.insert(record.id, record.clone());
        Ok(record)
    }
}

/// 메모리 저장소 핸들 발급자.
#[derive(Clone, Default)]
pub struct MemoryStoreProvider {
    store: Arc<MemoryUserStore>,
    outstanding: Arc<AtomicUsize>,
}

impl MemoryStoreProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 공유 테이블 접근 (시드 데이터 주입 등).
    pub fn store(&self) -> &Arc<MemoryUserStore> {
        &self.store
    }

    /// 아직 반환되지 않은 핸들 수.
    pub fn outstanding_handles(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoreProvider for MemoryStoreProvider {
    async fn acquire(&self) -> Result<StoreHandle, StoreError> {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        Ok(StoreHandle::new(MemorySession {
            store: Arc::clone(&self.store),
            outstanding: Arc::clone(&self.outstanding),
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// 요청 하나에 발급된 메모리 세션.
struct MemorySession {
    store: Arc<MemoryUserStore>,
    outstanding: Arc<AtomicUsize>,
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(backend = "memory", "store handle released");
    }
}

#[async_trait]
impl UserStore for MemorySession {
    async fn find_by_email(&self, email: &str) -> Result<UserRecord, StoreError> {
        self.store.find_by_email(email).await
    }

    async fn find_by_id(&self, id: &str) -> Result<UserRecord, StoreError> {
        self.store.find_by_id(id).await
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        self.store.create(user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryUserStore::new();
        let created = store.create(new_user("grace@example.com")).await.unwrap();

        let by_email = store.find_by_email("grace@example.com").await.unwrap();
        assert_eq!(by_email.id, created.id);

        let by_id = store.find_by_id(&created.id.to_string()).await.unwrap();
        assert_eq!(by_id.email, "grace@example.com");
    }

    #[tokio::test]
    async fn test_not_found() {
        let store = MemoryUserStore::new();
        assert!(matches!(
            store.find_by_email("nobody@example.com").await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.find_by_id(&Uuid::new_v4().to_string()).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.find_by_id("not-a-uuid").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_keeps_original() {
        let store = MemoryUserStore::new();
        let original = store.create(new_user("grace@example.com")).await.unwrap();

        let mut duplicate = new_user("grace@example.com");
        duplicate.first_name = "Impostor".to_string();
        let result = store.create(duplicate).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));

        let stored = store.find_by_email("grace@example.com").await.unwrap();
        assert_eq!(stored.id, original.id);
        assert_eq!(stored.first_name, "Grace");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_handles_are_released_on_drop() {
        let provider = MemoryStoreProvider::new();
        assert_eq!(provider.outstanding_handles(), 0);

        let first = provider.acquire().await.unwrap();
        let second = provider.acquire().await.unwrap();
        let first_clone = first.clone();
        assert_eq!(provider.outstanding_handles(), 2);

        drop(first);
        assert_eq!(provider.outstanding_handles(), 2);
        drop(first_clone);
        assert_eq!(provider.outstanding_handles(), 1);
        drop(second);
        assert_eq!(provider.outstanding_handles(), 0);
    }

    #[tokio::test]
    async fn test_handles_share_tables() {
        let provider = MemoryStoreProvider::new();
        let writer = provider.acquire().await.unwrap();
        writer.create(new_user("ada@example.com")).await.unwrap();

        let reader = provider.acquire().await.unwrap();
        assert!(reader.find_by_email("ada@example.com").await.is_ok());
        assert_eq!(provider.store().len().await, 1);
    }
}
