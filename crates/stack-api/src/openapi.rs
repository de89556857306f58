//! OpenAPI 문서화 설정.
//!
//! utoipa로 OpenAPI 3.0 스펙을 생성하고 `/api-docs/openapi.json`에서 제공합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::{routing::get, Json, Router};
use utoipa::openapi::security::{Http, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::routes::{
    ComponentHealth, ComponentStatus, HealthResponse, SignUpRequest, SignUpResponse,
    TokenResponse,
};
use stack_core::Identity;

/// API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stack Auth API",
        description = "가입, Basic 인증 토큰 발급, Bearer 토큰 인증을 제공하는 REST API입니다."
    ),
    tags(
        (name = "auth", description = "가입 및 토큰 인증"),
        (name = "health", description = "헬스 체크")
    ),
    modifiers(&SecurityAddon),
    components(schemas(
        SignUpRequest,
        SignUpResponse,
        TokenResponse,
        Identity,
        HealthResponse,
        ComponentHealth,
        ComponentStatus,
    )),
    paths(
        crate::routes::health::health_check,
        crate::routes::health::health_ready,
        crate::routes::auth::sign_up,
        crate::routes::auth::sign_in,
        crate::routes::auth::me,
    )
)]
pub struct ApiDoc;

/// `basic_auth` / `bearer_auth` 보안 스킴 등록.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "basic_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
        );
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// OpenAPI JSON 라우터.
///
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn openapi_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}
