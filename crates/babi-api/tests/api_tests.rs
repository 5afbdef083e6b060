//! API integration tests over the in-memory providers.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use babi_api::services::generation::{
    GenerationBackend, GenerationError, SimulatedGenerator, LANDSCAPE_SAMPLE_URL,
    PORTRAIT_SAMPLE_URL,
};
use babi_api::{create_router, ApiConfig, AppState};
use babi_models::{GenerationResult, Identity, PlanTier, UserId, ValidatedRequest};
use babi_providers::{FailurePoint, MemoryBackend, Providers};

const MEADOW_PROMPT: &str = "A serene sunset over a mountain meadow";

struct TestApp {
    router: Router,
    backend: Arc<MemoryBackend>,
}

impl TestApp {
    fn new() -> Self {
        let backend = Arc::new(MemoryBackend::new());
        let state = AppState::memory(ApiConfig::for_tests(), backend.clone());
        Self {
            router: create_router(state, None),
            backend,
        }
    }

    fn with_generator(generator: Arc<dyn GenerationBackend>) -> Self {
        let backend = Arc::new(MemoryBackend::new());
        let state = AppState::with_generator(
            ApiConfig::for_tests(),
            Providers::memory(backend.clone()),
            generator,
        );
        Self {
            router: create_router(state, None),
            backend,
        }
    }

    /// Register a user on `tier` and return a session token.
    async fn user(&self, id: &str, tier: Option<&str>, customer: Option<&str>) -> String {
        let identity = Identity::new(id, Some(format!("{}@example.com", id)));
        self.backend.add_user(identity.clone()).await;
        if let Some(tier) = tier {
            self.backend
                .set_subscription(&identity.id, tier, customer)
                .await;
        }
        self.backend.issue_session(&identity.id).await
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let raw = body.map(|b| b.to_string());
        self.send_raw(method, uri, token, raw).await
    }

    async fn send_raw(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let body = match body {
            Some(raw) => {
                builder = builder.header("content-type", "application/json");
                Body::from(raw)
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn generate(&self, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send("POST", "/api/generate", token, Some(body)).await
    }
}

/// Counts calls, then either delegates to the simulator or fails.
struct RecordingGenerator {
    calls: AtomicUsize,
    fail: bool,
}

impl RecordingGenerator {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationBackend for RecordingGenerator {
    async fn generate(
        &self,
        request: ValidatedRequest,
        tier: PlanTier,
    ) -> Result<GenerationResult, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(GenerationError::Backend(
                "upstream render farm exploded".to_string(),
            ));
        }
        SimulatedGenerator::new(std::time::Duration::ZERO)
            .generate(request, tier)
            .await
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_rejected_requests_never_reach_the_generator() {
    let generator = RecordingGenerator::new(false);
    let app = TestApp::with_generator(generator.clone());
    let free = app.user("u1", Some("free"), None).await;

    let (status, _) = app.generate(None, json!({ "prompt": MEADOW_PROMPT })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.generate(Some(&free), json!({ "prompt": "Hi" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .generate(Some(&free), json!({ "prompt": "a".repeat(5001) }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .generate(
            Some(&free),
            json!({ "prompt": MEADOW_PROMPT, "removeWatermark": true }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send_raw("POST", "/api/generate", Some(&free), Some("{not json".to_string()))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    assert_eq!(generator.calls(), 0);

    let (status, _) = app.generate(Some(&free), json!({ "prompt": MEADOW_PROMPT })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn test_generator_failure_is_an_opaque_internal_error() {
    let generator = RecordingGenerator::new(true);
    let app = TestApp::with_generator(generator.clone());
    let pro = app.user("u1", Some("pro"), None).await;

    let (status, body) = app
        .generate(
            Some(&pro),
            json!({ "prompt": MEADOW_PROMPT, "removeWatermark": true }),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "Failed to generate video. Please try again." })
    );
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn test_short_prompt_is_rejected() {
    let app = TestApp::new();
    let token = app.user("u1", Some("free"), None).await;

    let (status, body) = app.generate(Some(&token), json!({ "prompt": "Hi" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Prompt must be at least 10 characters long" }));
}

#[tokio::test]
async fn test_prompt_length_counts_trimmed_text() {
    let app = TestApp::new();
    let token = app.user("u1", None, None).await;

    let (status, _) = app
        .generate(Some(&token), json!({ "prompt": "   123456789   " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .generate(Some(&token), json!({ "prompt": "  1234567890  " }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_prompt_is_required() {
    let app = TestApp::new();
    let token = app.user("u1", None, None).await;

    for body in [json!({}), json!({ "prompt": "" }), json!({ "prompt": "     " })] {
        let (status, response) = app.generate(Some(&token), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "Prompt is required");
    }
}

#[tokio::test]
async fn test_overlong_prompt_and_too_many_people() {
    let app = TestApp::new();
    let token = app.user("u1", None, None).await;

    let (status, body) = app
        .generate(Some(&token), json!({ "prompt": "a".repeat(5001) }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Prompt must be at most 5000 characters long");

    let (status, body) = app
        .generate(
            Some(&token),
            json!({ "prompt": MEADOW_PROMPT, "selectedPeople": ["a", "b", "c", "d"] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You can select at most 3 people");
}

#[tokio::test]
async fn test_generate_requires_session() {
    let app = TestApp::new();

    let (status, body) = app
        .generate(None, json!({ "prompt": MEADOW_PROMPT }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({ "error": "Unauthorized. Please sign in to generate videos." })
    );

    let (status, _) = app
        .generate(Some("not-a-session"), json!({ "prompt": MEADOW_PROMPT }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unauthenticated_wins_over_bad_body() {
    let app = TestApp::new();

    let (status, _) = app
        .send_raw("POST", "/api/generate", None, Some("{not json".to_string()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_body_is_a_generation_failure() {
    let app = TestApp::new();
    let token = app.user("u1", None, None).await;

    let (status, body) = app
        .send_raw("POST", "/api/generate", Some(&token), Some("{not json".to_string()))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to generate video. Please try again." }));
}

#[tokio::test]
async fn test_free_user_cannot_remove_watermark() {
    let app = TestApp::new();
    let token = app.user("u1", Some("free"), None).await;

    let (status, body) = app
        .generate(
            Some(&token),
            json!({ "prompt": MEADOW_PROMPT, "aspectRatio": "16:9", "removeWatermark": true }),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body,
        json!({ "error": "Watermark removal is only available for Pro users" })
    );
}

#[tokio::test]
async fn test_pro_user_removes_watermark() {
    let app = TestApp::new();
    let token = app.user("u1", Some("pro"), None).await;

    let (status, body) = app
        .generate(
            Some(&token),
            json!({
                "prompt": MEADOW_PROMPT,
                "model": "sora",
                "aspectRatio": "9:16",
                "removeWatermark": true,
                "generateFromImages": true,
                "selectedPeople": ["anna"],
                "images": 2
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let video = &body["video"];
    assert_eq!(video["url"], PORTRAIT_SAMPLE_URL);
    assert_eq!(video["prompt"], MEADOW_PROMPT);
    assert_eq!(video["model"], "sora");
    assert_eq!(video["aspectRatio"], "9:16");
    assert_eq!(video["hasWatermark"], false);
    assert_eq!(video["metadata"], json!({ "selectedPeople": ["anna"], "fromImages": true }));

    let generated_at = video["generatedAt"].as_str().unwrap();
    assert!(generated_at.ends_with('Z'));
    assert!(chrono::DateTime::parse_from_rfc3339(generated_at).is_ok());
}

#[tokio::test]
async fn test_watermark_rule_holds_for_every_combination() {
    let app = TestApp::new();
    let free = app.user("free-user", None, None).await;
    let pro = app.user("pro-user", Some("pro"), None).await;

    for (token, is_pro) in [(&free, false), (&pro, true)] {
        for remove in [false, true] {
            let (status, body) = app
                .generate(
                    Some(token),
                    json!({ "prompt": MEADOW_PROMPT, "removeWatermark": remove }),
                )
                .await;

            if remove && !is_pro {
                assert_eq!(status, StatusCode::FORBIDDEN);
                continue;
            }
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["video"]["hasWatermark"], !is_pro || !remove);
        }
    }
}

#[tokio::test]
async fn test_landscape_sample_and_passthrough_values() {
    let app = TestApp::new();
    let token = app.user("u1", None, None).await;

    let (status, body) = app
        .generate(
            Some(&token),
            json!({ "prompt": MEADOW_PROMPT, "aspectRatio": "16:9" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["video"]["url"], LANDSCAPE_SAMPLE_URL);
    assert_eq!(body["video"]["hasWatermark"], true);

    let (status, body) = app
        .send(
            "POST",
            "/api/generate-video",
            Some(&token),
            Some(json!({ "prompt": MEADOW_PROMPT, "model": "kling", "aspectRatio": "4:3" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["video"]["model"], "kling");
    assert_eq!(body["video"]["aspectRatio"], "4:3");
    assert_eq!(body["video"]["url"], PORTRAIT_SAMPLE_URL);
}

#[tokio::test]
async fn test_stored_tier_must_be_exactly_pro() {
    let app = TestApp::new();
    let token = app.user("u1", Some("PRO"), None).await;

    let (status, _) = app
        .generate(
            Some(&token),
            json!({ "prompt": MEADOW_PROMPT, "removeWatermark": true }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_tier_lookup_failure_never_grants_pro() {
    let app = TestApp::new();
    let token = app.user("u1", Some("pro"), None).await;
    app.backend.inject_failure(FailurePoint::TierLookup).await;

    let (status, _) = app
        .generate(
            Some(&token),
            json!({ "prompt": MEADOW_PROMPT, "removeWatermark": true }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .generate(Some(&token), json!({ "prompt": MEADOW_PROMPT }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["video"]["hasWatermark"], true);
}

#[tokio::test]
async fn test_session_provider_failure_is_unauthenticated() {
    let app = TestApp::new();
    let token = app.user("u1", Some("pro"), None).await;
    app.backend.inject_failure(FailurePoint::Session).await;

    let (status, _) = app
        .generate(Some(&token), json!({ "prompt": MEADOW_PROMPT }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Sign-out
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_sign_out_is_idempotent() {
    let app = TestApp::new();
    let token = app.user("u1", None, None).await;

    for _ in 0..2 {
        let (status, body) = app.send("POST", "/api/auth/signout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));
    }

    let (status, _) = app.send("POST", "/api/auth/signout", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .generate(Some(&token), json!({ "prompt": MEADOW_PROMPT }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sign_out_failure() {
    let app = TestApp::new();
    let token = app.user("u1", None, None).await;
    app.backend.inject_failure(FailurePoint::SignOut).await;

    let (status, body) = app.send("POST", "/api/auth/signout", Some(&token), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("sign_out"));
}

// ---------------------------------------------------------------------------
// Account deletion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_delete_account_requires_session() {
    let app = TestApp::new();

    let (status, body) = app.send("POST", "/api/account/delete", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn test_delete_account_then_session_is_rejected() {
    let app = TestApp::new();
    let token = app.user("u1", Some("pro"), Some("cus_1")).await;

    let (status, body) = app.send("POST", "/api/account/delete", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "success": true, "message": "Account deleted successfully" })
    );
    assert_eq!(app.backend.deleted_customers().await, vec!["cus_1".to_string()]);
    assert!(!app.backend.user_exists(&UserId::from("u1")).await);

    let (status, _) = app
        .generate(Some(&token), json!({ "prompt": MEADOW_PROMPT }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send("POST", "/api/account/delete", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_billing_failure_does_not_block_deletion() {
    let app = TestApp::new();
    let token = app.user("u1", Some("pro"), Some("cus_1")).await;
    app.backend.inject_failure(FailurePoint::Billing).await;

    let (status, body) = app.send("POST", "/api/account/delete", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(!app.backend.user_exists(&UserId::from("u1")).await);
}

#[tokio::test]
async fn test_user_deletion_failure() {
    let app = TestApp::new();
    let token = app.user("u1", Some("pro"), Some("cus_1")).await;
    app.backend.inject_failure(FailurePoint::UserDeletion).await;

    let (status, body) = app.send("POST", "/api/account/delete", Some(&token), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to delete user account" }));
    assert!(app.backend.user_exists(&UserId::from("u1")).await);
}

// ---------------------------------------------------------------------------
// Subscription and profile
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_checkout_unlocks_watermark_removal() {
    let app = TestApp::new();
    let token = app.user("u1", None, None).await;
    let request = json!({ "prompt": MEADOW_PROMPT, "removeWatermark": true });

    let (status, _) = app.generate(Some(&token), request.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send("POST", "/api/subscription/checkout", Some(&token), Some(json!({ "plan": "pro" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "tier": "pro" }));

    let (status, body) = app.generate(Some(&token), request.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["video"]["hasWatermark"], false);

    let (status, body) = app
        .send("POST", "/api/subscription/cancel", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "tier": "free" }));

    let (status, _) = app.generate(Some(&token), request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_checkout_defaults_to_pro_and_rejects_unknown_plans() {
    let app = TestApp::new();
    let token = app.user("u1", None, None).await;

    let (status, _) = app
        .send("POST", "/api/subscription/checkout", Some(&token), Some(json!({ "plan": "platinum" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.backend.tier_of(&UserId::from("u1")).await, PlanTier::Free);

    let (status, body) = app
        .send("POST", "/api/subscription/checkout", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tier"], "pro");
}

#[tokio::test]
async fn test_checkout_store_failure() {
    let app = TestApp::new();
    let token = app.user("u1", None, None).await;
    app.backend.inject_failure(FailurePoint::TierUpdate).await;

    let (status, body) = app
        .send("POST", "/api/subscription/checkout", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "Failed to process subscription. Please try again." })
    );
}

#[tokio::test]
async fn test_profile_and_subscription() {
    let app = TestApp::new();
    let token = app.user("u1", Some("pro"), None).await;

    let (status, body) = app.send("GET", "/api/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "id": "u1", "email": "u1@example.com", "tier": "pro", "isPro": true })
    );

    let (status, body) = app.send("GET", "/api/subscription", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "tier": "pro", "isPro": true }));
}

#[tokio::test]
async fn test_protected_routes_reject_anonymous_callers() {
    let app = TestApp::new();

    for (method, uri) in [
        ("GET", "/api/profile"),
        ("GET", "/api/subscription"),
        ("POST", "/api/subscription/checkout"),
        ("POST", "/api/subscription/cancel"),
        ("POST", "/api/account/delete"),
    ] {
        let (status, _) = app.send(method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
    }
}

// ---------------------------------------------------------------------------
// Public routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_catalogs_are_public() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/api/plans", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subscriptions"].as_array().unwrap().len(), 3);
    assert_eq!(body["topUps"].as_array().unwrap().len(), 3);
    assert_eq!(body["subscriptions"][1]["badge"], "Most Popular");

    let (status, body) = app.send("GET", "/api/tools", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let tools = body["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 5);
    assert_eq!(tools[0]["id"], "video-generation");
    assert_eq!(tools[0]["available"], true);
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.send("GET", "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");

    app.backend.inject_failure(FailurePoint::TierLookup).await;
    let (status, body) = app.send("GET", "/ready", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["subscriptions"]["status"], "error");
}

#[tokio::test]
async fn test_security_and_request_id_headers() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}

#[tokio::test]
async fn test_rate_limit_applies_per_client_ip() {
    let backend = Arc::new(MemoryBackend::new());
    let config = ApiConfig {
        rate_limit_rps: 2,
        ..ApiConfig::for_tests()
    };
    let router = create_router(AppState::memory(config, backend), None);

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/plans")
                    .header("x-forwarded-for", "203.0.113.9")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        statuses.push(response.status());
    }

    assert_eq!(statuses[..2], [StatusCode::OK, StatusCode::OK]);
    assert_eq!(statuses[2], StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_untrusted_forwarding_headers_do_not_split_the_limit() {
    let backend = Arc::new(MemoryBackend::new());
    let config = ApiConfig {
        rate_limit_rps: 2,
        trust_proxy_headers: false,
        ..ApiConfig::for_tests()
    };
    let router = create_router(AppState::memory(config, backend), None);
    let peer: SocketAddr = "192.0.2.10:51234".parse().unwrap();

    let mut statuses = Vec::new();
    for i in 0..3 {
        let mut request = Request::builder()
            .uri("/api/plans")
            .header("x-forwarded-for", format!("203.0.113.{}", i + 1))
            .body(Body::empty())
            .unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        statuses.push(router.clone().oneshot(request).await.unwrap().status());
    }

    assert_eq!(statuses[..2], [StatusCode::OK, StatusCode::OK]);
    assert_eq!(statuses[2], StatusCode::TOO_MANY_REQUESTS);
}
