//! API 서버용 HTTP middleware.
//!
//! - [`Chain`]: 인증 단계 조합 빌더 (연결 할당 → Basic/Bearer 인증)
//! - [`metrics_layer`]: HTTP 메트릭 수집

mod chain;
mod metrics;
mod stages;

pub use chain::{BasicAuthed, BearerAuthed, Chain, ChainStage, Provisioned, Stage, Unprovisioned};
pub use metrics::metrics_layer;
pub use stages::{basic_auth, bearer_auth, provision_store};
