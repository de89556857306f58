//! 가입/로그인 endpoint.
//!
//! 각 라우트는 [`Chain`]으로 필요한 미들웨어 단계를 조합합니다.
//! 응답 에러 본문은 평문입니다.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use stack_core::{Identity, NewUser};
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::hash_password;
use crate::context::RequestContext;
use crate::error::{ApiError, ApiResult};
use crate::metrics::record_token_issued;
use crate::middleware::Chain;
use crate::state::AppState;

/// 가입 요청.
///
/// 비밀번호를 담고 있으므로 `Debug`를 구현하지 않습니다.
#[derive(Deserialize, Validate, ToSchema)]
pub struct SignUpRequest {
    /// 이름
    #[serde(rename = "first")]
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    /// 성
    #[serde(rename = "last")]
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    /// 이메일 (로그인 ID)
    #[validate(email)]
    pub email: String,
    /// 비밀번호 (8~128자)
    #[serde(rename = "pass")]
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// 가입 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignUpResponse {
    /// 항상 "success"
    pub result: String,
}

/// 토큰 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// HS256 JWT (24시간 유효)
    pub token: String,
}

/// 새 사용자 가입.
///
/// POST /api/v1/auth/signup
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    tag = "auth",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "가입 완료", body = SignUpResponse),
        (status = 400, description = "JSON 본문 형식 오류"),
        (status = 409, description = "중복 이메일 또는 잘못된 필드"),
        (status = 500, description = "저장소 에러")
    )
)]
pub async fn sign_up(
    ctx: RequestContext,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<SignUpResponse>)> {
    let store = ctx.store().ok_or(ApiError::MissingContext("database"))?;

    let request: SignUpRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    request
        .validate()
        .map_err(|e| ApiError::Conflict(e.to_string()))?;

    let password_hash = hash_password(&request.password)?;
    let record = store
        .create(NewUser {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            password_hash,
        })
        .await?;

    info!(user_id = %record.id, "user signed up");

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            result: "success".to_string(),
        }),
    ))
}

/// 인증된 사용자에게 토큰 발급.
///
/// Basic 인증 체인 뒤에서만 마운트됩니다 ([`Chain::sign_in_route`]).
///
/// POST /api/v1/auth/signin
#[utoipa::path(
    post,
    path = "/api/v1/auth/signin",
    tag = "auth",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "토큰 발급", body = TokenResponse),
        (status = 401, description = "인증 실패 (WWW-Authenticate 포함)")
    )
)]
pub(crate) async fn sign_in(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
) -> ApiResult<Json<TokenResponse>> {
    ctx.store().ok_or(ApiError::MissingContext("database"))?;
    let identity = ctx.identity().ok_or(ApiError::MissingContext("user"))?;

    let token = state.tokens.issue(identity)?;
    record_token_issued();
    info!(user_id = %identity.id, "token issued");

    Ok(Json(TokenResponse { token }))
}

/// 현재 인증된 사용자 조회.
///
/// GET /api/v1/auth/me
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "현재 사용자", body = Identity),
        (status = 401, description = "토큰 누락/검증 실패")
    )
)]
pub async fn me(ctx: RequestContext) -> ApiResult<Json<Identity>> {
    ctx.store().ok_or(ApiError::MissingContext("database"))?;
    let identity = ctx
        .identity()
        .cloned()
        .ok_or(ApiError::MissingContext("user"))?;

    Ok(Json(identity))
}

/// 인증 라우터 생성.
pub fn auth_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/signup",
            Chain::new(state.clone()).provision_store().wrap(post(sign_up)),
        )
        .route(
            "/signin",
            Chain::new(state.clone())
                .provision_store()
                .basic_auth()
                .sign_in_route(),
        )
        .route(
            "/me",
            Chain::new(state).provision_store().bearer_auth().wrap(get(me)),
        )
}
