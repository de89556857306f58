//! 인증 파이프라인 통합 테스트
//!
//! 메모리 저장소 위에서 전체 라우터를 구동해 가입 → 토큰 발급 → Bearer 인증
//! 흐름과 거부 경로를 검증합니다.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use serde_json::Value;
use stack_api::auth::{Claims, TokenCodec, TokenConfig, TOKEN_TTL_SECS};
use stack_api::routes::create_api_router;
use stack_api::state::AppState;
use stack_api::store::MemoryStoreProvider;
use tower::ServiceExt;

const SECRET: &str = "integration-secret-key-with-enough-length";

struct TestApp {
    router: Router,
    store: MemoryStoreProvider,
}

impl TestApp {
    fn new() -> Self {
        let store = MemoryStoreProvider::new();
        let tokens = TokenCodec::new(TokenConfig::new(SECRET)).unwrap();
        let state = Arc::new(AppState::new(Arc::new(store.clone()), tokens));
        let router = create_api_router(state.clone()).with_state(state);
        Self { router, store }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn sign_up(&self, email: &str, password: &str) -> Response {
        let body = serde_json::json!({
            "first": "Test",
            "last": "User",
            "email": email,
            "pass": password,
        });
        self.send(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/signup")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn sign_in_with_header(&self, authorization: Option<&str>) -> Response {
        let mut builder = Request::builder().method("POST").uri("/api/v1/auth/signin");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Response {
        let encoded = STANDARD.encode(format!("{}:{}", email, password));
        self.sign_in_with_header(Some(&format!("Basic {}", encoded)))
            .await
    }

    async fn me_with_header(&self, authorization: Option<&str>) -> Response {
        let mut builder = Request::builder().uri("/api/v1/auth/me");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn me(&self, token: &str) -> Response {
        self.me_with_header(Some(&format!("Bearer {}", token))).await
    }
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn assert_challenge(response: &Response) {
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Basic realm=\"Restricted\""
    );
}

async fn token_for(app: &TestApp, email: &str, password: &str) -> String {
    let response = app.sign_in(email, password).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_sign_up_sign_in_me() {
    let app = TestApp::new();

    let response = app.sign_up("ada@example.com", "analytical-engine").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await, serde_json::json!({"result": "success"}));

    let token = token_for(&app, "ada@example.com", "analytical-engine").await;

    let response = app.me(&token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let identity = body_json(response).await;
    assert_eq!(identity["email"], "ada@example.com");
    assert_eq!(identity["first_name"], "Test");
    assert!(identity.get("password").is_none());
    assert!(identity.get("password_hash").is_none());
    assert!(!identity.to_string().contains("$argon2"));

    let codec = TokenCodec::new(TokenConfig::new(SECRET)).unwrap();
    let claims = codec.validate(&token).unwrap();
    assert_eq!(claims.sub, identity["id"].as_str().unwrap());
    assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);

    assert_eq!(app.store.outstanding_handles(), 0);
}

#[tokio::test]
async fn test_duplicate_sign_up_keeps_original() {
    let app = TestApp::new();

    assert_eq!(
        app.sign_up("ada@example.com", "original-password").await.status(),
        StatusCode::CREATED
    );

    let response = app.sign_up("ada@example.com", "replacement-password").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(!body_text(response).await.is_empty());

    assert_eq!(app.store.store().len().await, 1);
    assert_eq!(
        app.sign_in("ada@example.com", "original-password").await.status(),
        StatusCode::OK
    );
    assert_challenge(&app.sign_in("ada@example.com", "replacement-password").await);
}

#[tokio::test]
async fn test_sign_up_rejections() {
    let app = TestApp::new();

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/signup")
                .body(Body::from("{\"first\": 1"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(
        app.sign_up("not-an-email", "long-enough-password").await.status(),
        StatusCode::CONFLICT
    );
    assert_eq!(
        app.sign_up("ada@example.com", "short").await.status(),
        StatusCode::CONFLICT
    );
    assert!(app.store.store().is_empty().await);
    assert_eq!(app.store.outstanding_handles(), 0);
}

#[tokio::test]
async fn test_bad_credentials_challenge() {
    let app = TestApp::new();
    app.sign_up("ada@example.com", "analytical-engine").await;

    let response = app.sign_in("ada@example.com", "wrong-password").await;
    assert_challenge(&response);
    assert_eq!(body_text(response).await, "Not authorized");

    let response = app.sign_in("nobody@example.com", "analytical-engine").await;
    assert_challenge(&response);
    assert_eq!(body_text(response).await, "Not authorized");

    assert_eq!(app.store.outstanding_handles(), 0);
}

#[tokio::test]
async fn test_malformed_basic_headers() {
    let app = TestApp::new();
    app.sign_up("ada@example.com", "analytical-engine").await;

    let no_colon = format!("Basic {}", STANDARD.encode("ada@example.com"));
    let not_utf8 = format!("Basic {}", STANDARD.encode([0xc3, 0x28, b':', b'x']));
    let three_parts = format!("Basic {} extra", STANDARD.encode("ada@example.com:analytical-engine"));
    let cases: Vec<Option<&str>> = vec![
        None,
        Some(""),
        Some("Basic"),
        Some("Basic !!!"),
        Some("Bearer abc"),
        Some(no_colon.as_str()),
        Some(not_utf8.as_str()),
        Some(three_parts.as_str()),
    ];

    for case in cases {
        let response = app.sign_in_with_header(case).await;
        assert_challenge(&response);
    }

    assert_eq!(app.store.outstanding_handles(), 0);
}

#[tokio::test]
async fn test_password_with_colon() {
    let app = TestApp::new();
    app.sign_up("ada@example.com", "pass:word:with:colons").await;

    assert_eq!(
        app.sign_in("ada@example.com", "pass:word:with:colons").await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_invalid_bearer_tokens() {
    let app = TestApp::new();
    app.sign_up("ada@example.com", "analytical-engine").await;
    let valid = token_for(&app, "ada@example.com", "analytical-engine").await;

    let other_secret = TokenCodec::new(TokenConfig::new("a-completely-different-secret-key"))
        .unwrap()
        .encode_claims(&Claims {
            sub: "irrelevant".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 60,
        })
        .unwrap();

    let cases = [
        None,
        Some("Bearer".to_string()),
        Some("Bearer not.a.token".to_string()),
        Some(format!("Basic {}", valid)),
        Some(format!("Bearer {}", other_secret)),
        Some(format!("Bearer {}x", valid)),
    ];

    for case in cases {
        let response = app.me_with_header(case.as_deref()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_text(response).await, "Invalid Token");
    }

    assert_eq!(app.store.outstanding_handles(), 0);
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let app = TestApp::new();
    app.sign_up("ada@example.com", "analytical-engine").await;
    let token = token_for(&app, "ada@example.com", "analytical-engine").await;

    let codec = TokenCodec::new(TokenConfig::new(SECRET)).unwrap();
    let sub = codec.validate(&token).unwrap().sub;
    let now = Utc::now().timestamp();
    let expired = codec
        .encode_claims(&Claims {
            sub,
            iat: now - TOKEN_TTL_SECS - 10,
            exp: now - 10,
        })
        .unwrap();

    let response = app.me(&expired).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, "Invalid Token");
}

#[tokio::test]
async fn test_unknown_subject_not_authorized() {
    let app = TestApp::new();
    let codec = TokenCodec::new(TokenConfig::new(SECRET)).unwrap();
    let now = Utc::now().timestamp();

    for sub in [uuid::Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
        let token = codec
            .encode_claims(&Claims {
                sub,
                iat: now,
                exp: now + 60,
            })
            .unwrap();

        let response = app.me(&token).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_text(response).await, "Not authorized");
    }

    assert_eq!(app.store.outstanding_handles(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sign_ins() {
    let app = Arc::new(TestApp::new());
    let users: Vec<(String, String)> = (0..8)
        .map(|i| (format!("user{}@example.com", i), format!("password-{}", i)))
        .collect();

    for (email, password) in &users {
        assert_eq!(app.sign_up(email, password).await.status(), StatusCode::CREATED);
    }

    let mut tasks = Vec::new();
    for (email, password) in users.clone() {
        let app = Arc::clone(&app);
        tasks.push(tokio::spawn(async move {
            let token = token_for(&app, &email, &password).await;
            let identity = body_json(app.me(&token).await).await;
            (email, token, identity)
        }));
    }

    let mut tokens = Vec::new();
    for task in tasks {
        let (email, token, identity) = task.await.unwrap();
        assert_eq!(identity["email"], email.as_str());
        tokens.push(token);
    }

    tokens.sort();
    tokens.dedup();
    assert_eq!(tokens.len(), users.len());
    assert_eq!(app.store.outstanding_handles(), 0);
}
