//! 인증 파이프라인 단계.
//!
//! 각 단계는 거부 시 응답 하나를 쓰고 멈추거나, 컨텍스트를 확장해
//! 다음 단계를 호출합니다. 요청의 컨텍스트는 extensions에 보관되며
//! 단계마다 확장된 컨텍스트로 교체됩니다.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use stack_core::auth_span;
use tracing::{debug, error, Instrument};

use crate::auth::{parse_basic, parse_bearer, verify, AuthError};
use crate::context::RequestContext;
use crate::error::ApiError;
use crate::metrics::record_auth_attempt;
use crate::state::AppState;
use crate::store::StoreError;

fn current_context(request: &Request) -> RequestContext {
    request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default()
}

/// 요청마다 저장소 핸들을 할당해 컨텍스트에 붙입니다.
///
/// 핸들은 요청과 컨텍스트 복제본이 모두 drop되는 시점에 반환되므로
/// 거부, 정상 응답, 패닉 어느 경로에서도 누수되지 않습니다.
pub async fn provision_store(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let span = auth_span!("provision", request.method(), request.uri().path());

    async move {
        let handle = match state.store.acquire().await {
            Ok(handle) => handle,
            Err(e) => {
                error!(error = %e, backend = state.store.backend(), "failed to acquire store handle");
                return ApiError::Internal(e.to_string()).into_response();
            }
        };

        let ctx = current_context(&request).with_store(handle);
        request.extensions_mut().insert(ctx);
        next.run(request).await
    }
    .instrument(span)
    .await
}

/// `Authorization: Basic` 자격증명을 검증해 신원을 붙입니다.
///
/// 모든 401 응답에 `WWW-Authenticate` challenge가 포함됩니다.
pub async fn basic_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let span = auth_span!("basic", request.method(), request.uri().path());

    async move {
        let challenge = || {
            ApiError::Challenge {
                realm: state.realm.clone(),
            }
            .into_response()
        };

        let ctx = current_context(&request);
        let Some(store) = ctx.store().cloned() else {
            error!("basic auth reached without a store handle");
            record_auth_attempt("basic", "no_store");
            return challenge();
        };

        let credentials = match parse_basic(request.headers()) {
            Ok(credentials) => credentials,
            Err(e) => {
                debug!(reason = e.as_str(), "rejected authorization header");
                record_auth_attempt("basic", e.as_str());
                return challenge();
            }
        };

        let identity = match verify(&credentials, &*store).await {
            Ok(identity) => identity,
            Err(AuthError::Store(e)) => {
                record_auth_attempt("basic", "store_error");
                return ApiError::Internal(e.to_string()).into_response();
            }
            Err(_) => {
                record_auth_attempt("basic", "bad_credentials");
                return challenge();
            }
        };

        debug!(user_id = %identity.id, "basic auth succeeded");
        record_auth_attempt("basic", "success");
        request
            .extensions_mut()
            .insert(ctx.with_identity(identity));
        next.run(request).await
    }
    .instrument(span)
    .await
}

/// `Authorization: Bearer` 토큰을 검증하고 주체를 조회해 신원을 붙입니다.
///
/// 저장소 핸들이 없으면 라우트 구성 오류로 보고 500을 응답합니다.
pub async fn bearer_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let span = auth_span!("bearer", request.method(), request.uri().path());

    async move {
        let ctx = current_context(&request);
        let Some(store) = ctx.store().cloned() else {
            error!("bearer auth reached without a store handle");
            record_auth_attempt("bearer", "no_store");
            return ApiError::MissingContext("database").into_response();
        };

        let token = match parse_bearer(request.headers()) {
            Ok(token) => token,
            Err(e) => {
                debug!(reason = e.as_str(), "rejected authorization header");
                record_auth_attempt("bearer", e.as_str());
                return ApiError::InvalidToken.into_response();
            }
        };

        let claims = match state.tokens.validate(&token) {
            Ok(claims) => claims,
            Err(e) => {
                let reason = match &e {
                    AuthError::InvalidToken(rejection) => rejection.as_str(),
                    _ => "invalid_token",
                };
                debug!(reason, "token rejected");
                record_auth_attempt("bearer", reason);
                return ApiError::InvalidToken.into_response();
            }
        };

        let identity = match store.find_by_id(&claims.sub).await {
            Ok(record) => record.into_identity(),
            Err(StoreError::NotFound) => {
                debug!(sub = %claims.sub, "token subject not found");
                record_auth_attempt("bearer", "unknown_subject");
                return ApiError::Unauthorized.into_response();
            }
            Err(e) => {
                record_auth_attempt("bearer", "store_error");
                return ApiError::Internal(e.to_string()).into_response();
            }
        };

        record_auth_attempt("bearer", "success");
        request
            .extensions_mut()
            .insert(ctx.with_identity(identity));
        next.run(request).await
    }
    .instrument(span)
    .await
}
