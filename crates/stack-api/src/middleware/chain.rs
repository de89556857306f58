//! 인증 단계 조합 빌더.
//!
//! 단계 순서를 타입 상태로 강제합니다:
//!
//! - 인증 단계는 연결 할당 이후에만 추가할 수 있습니다.
//! - 한 라우트는 Basic 또는 Bearer 중 하나만 사용합니다.
//! - Sign-In 라우트는 Basic 인증 체인에서만 만들 수 있습니다.
//!
//! ```rust,ignore
//! let sign_in = Chain::new(state.clone()).provision_store().basic_auth().sign_in_route();
//! let me = Chain::new(state).provision_store().bearer_auth().wrap(get(me));
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{post, MethodRouter};

use super::stages::{basic_auth, bearer_auth, provision_store};
use crate::routes::auth::sign_in;
use crate::state::AppState;

mod sealed {
    pub trait Sealed {}
}

/// 체인 상태 마커.
pub trait ChainStage: sealed::Sealed {}

/// 아무 단계도 없는 체인.
pub struct Unprovisioned;
/// 저장소 핸들이 할당되는 체인.
pub struct Provisioned;
/// Basic 인증까지 구성된 체인.
pub struct BasicAuthed;
/// Bearer 인증까지 구성된 체인.
pub struct BearerAuthed;

impl sealed::Sealed for Unprovisioned {}
impl sealed::Sealed for Provisioned {}
impl sealed::Sealed for BasicAuthed {}
impl sealed::Sealed for BearerAuthed {}
impl ChainStage for Unprovisioned {}
impl ChainStage for Provisioned {}
impl ChainStage for BasicAuthed {}
impl ChainStage for BearerAuthed {}

/// 미들웨어 단계.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ProvisionStore,
    BasicAuth,
    BearerAuth,
}

/// 미들웨어 체인 빌더.
pub struct Chain<S: ChainStage> {
    state: Arc<AppState>,
    stages: Vec<Stage>,
    _stage: PhantomData<S>,
}

impl<S: ChainStage> Chain<S> {
    fn push<T: ChainStage>(mut self, stage: Stage) -> Chain<T> {
        self.stages.push(stage);
        Chain {
            state: self.state,
            stages: self.stages,
            _stage: PhantomData,
        }
    }

    /// 바깥쪽부터 실행 순서대로 나열한 단계.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// 핸들러를 체인으로 감쌉니다. 첫 단계가 가장 바깥쪽 레이어가 됩니다.
    pub fn wrap(self, route: MethodRouter<Arc<AppState>>) -> MethodRouter<Arc<AppState>> {
        let state = self.state;
        self.stages.iter().rev().fold(route, |route, stage| match stage {
            Stage::ProvisionStore => route.layer(from_fn_with_state(state.clone(), provision_store)),
            Stage::BasicAuth => route.layer(from_fn_with_state(state.clone(), basic_auth)),
            Stage::BearerAuth => route.layer(from_fn_with_state(state.clone(), bearer_auth)),
        })
    }
}

impl Chain<Unprovisioned> {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            stages: Vec::new(),
            _stage: PhantomData,
        }
    }

    /// 연결 할당 단계 추가.
    pub fn provision_store(self) -> Chain<Provisioned> {
        self.push(Stage::ProvisionStore)
    }
}

impl Chain<Provisioned> {
    /// Basic 인증 단계 추가.
    pub fn basic_auth(self) -> Chain<BasicAuthed> {
        self.push(Stage::BasicAuth)
    }

    /// Bearer 인증 단계 추가.
    pub fn bearer_auth(self) -> Chain<BearerAuthed> {
        self.push(Stage::BearerAuth)
    }
}

impl Chain<BasicAuthed> {
    /// Sign-In 라우트 (`POST`).
    pub fn sign_in_route(self) -> MethodRouter<Arc<AppState>> {
        self.wrap(post(sign_in))
    }
}
