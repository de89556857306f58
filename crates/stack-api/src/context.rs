//! 요청 범위 컨텍스트.
//!
//! 미들웨어 단계가 다음 단계와 핸들러에 값을 넘기는 불변 저장소입니다.
//! 각 단계는 기존 컨텍스트를 확장한 새 컨텍스트를 요청 extensions에
//! 다시 넣으며, 부모 컨텍스트는 변경되지 않습니다.
//!
//! 키는 [`ContextKey`]를 구현한 마커 타입이고 조회 결과는 항상 `Option`입니다.
//!
//! ```rust,ignore
//! struct TraceIdKey;
//! impl ContextKey for TraceIdKey {
//!     type Value = String;
//! }
//!
//! let ctx = RequestContext::new().with_value::<TraceIdKey>("abc".to_string());
//! assert_eq!(ctx.get::<TraceIdKey>().map(String::as_str), Some("abc"));
//! ```

use std::any::{Any, TypeId};
use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use stack_core::Identity;

use crate::store::StoreHandle;

/// 컨텍스트 키.
pub trait ContextKey: 'static {
    type Value: Send + Sync + 'static;
}

/// 저장소 핸들 (연결 할당 단계가 설정).
pub(crate) struct StoreKey;

impl ContextKey for StoreKey {
    type Value = StoreHandle;
}

/// 인증된 신원 (인증 단계가 설정).
pub(crate) struct IdentityKey;

impl ContextKey for IdentityKey {
    type Value = Identity;
}

struct Entry {
    key: TypeId,
    value: Box<dyn Any + Send + Sync>,
    parent: Option<Arc<Entry>>,
}

/// 불변 요청 컨텍스트.
///
/// 복제는 `Arc` 하나를 복사합니다. 확장된 컨텍스트는 부모 체인을 공유합니다.
#[derive(Clone, Default)]
pub struct RequestContext {
    head: Option<Arc<Entry>>,
}

impl RequestContext {
    /// 빈 컨텍스트.
    pub fn new() -> Self {
        Self::default()
    }

    /// `K`가 `value`를 가리키는 새 컨텍스트를 반환합니다.
    ///
    /// 같은 키가 부모에 있으면 새 값이 우선합니다.
    #[must_use]
    pub fn with_value<K: ContextKey>(&self, value: K::Value) -> Self {
        Self {
            head: Some(Arc::new(Entry {
                key: TypeId::of::<K>(),
                value: Box::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// `K`에 연결된 값 조회.
    pub fn get<K: ContextKey>(&self) -> Option<&K::Value> {
        let key = TypeId::of::<K>();
        let mut cursor = self.head.as_deref();
        while let Some(entry) = cursor {
            if entry.key == key {
                return entry.value.downcast_ref::<K::Value>();
            }
            cursor = entry.parent.as_deref();
        }
        None
    }

    pub fn contains<K: ContextKey>(&self) -> bool {
        self.get::<K>().is_some()
    }

    /// 요청에 할당된 저장소 핸들.
    pub fn store(&self) -> Option<&StoreHandle> {
        self.get::<StoreKey>()
    }

    /// 인증된 신원.
    pub fn identity(&self) -> Option<&Identity> {
        self.get::<IdentityKey>()
    }

    pub(crate) fn with_store(&self, handle: StoreHandle) -> Self {
        self.with_value::<StoreKey>(handle)
    }

    pub(crate) fn with_identity(&self, identity: Identity) -> Self {
        self.with_value::<IdentityKey>(identity)
    }

    fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.head.as_deref();
        while let Some(entry) = cursor {
            depth += 1;
            cursor = entry.parent.as_deref();
        }
        depth
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("entries", &self.depth())
            .field("store", &self.store().is_some())
            .field("identity", &self.identity().map(|i| i.id.as_str()))
            .finish()
    }
}

/// 요청 extensions에서 컨텍스트를 꺼냅니다. 없으면 빈 컨텍스트.
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default())
    }
}
