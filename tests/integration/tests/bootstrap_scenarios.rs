//! End-to-end bootstrap scenarios against a mock API.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fieldops_integration_tests::{login_success_json, test_context, user_json};
use fieldops_session::{AuthState, GuardDecision, RouteGuard};

/// No saved credentials, no valid session: the whole chain drains dry and
/// the route guard redirects to login with the requested path preserved.
#[tokio::test]
async fn cold_start_with_nothing_ends_in_login_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    // No refresh token is held and nothing is cached, so neither the refresh
    // endpoint nor the login endpoint may be touched.
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let ctx = test_context(&server.uri(), &tmp);
    let guard = RouteGuard::new(&ctx, "/orders/42");

    assert_eq!(ctx.bootstrap_app_shell().await, AuthState::Unauthenticated);

    match guard.resolve().await {
        GuardDecision::RedirectToLogin { to } => {
            assert_eq!(to, "/login?next=%2Forders%2F42");
        }
        GuardDecision::Allow => panic!("expected a redirect"),
    }
}

/// Valid saved credentials but a dead session and a broken validation
/// endpoint: the chain falls through to auto-login and succeeds.
#[tokio::test]
async fn saved_credentials_recover_a_dead_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_success_json()))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let ctx = test_context(&server.uri(), &tmp);
    ctx.credentials().save("operator1", "hunter2").await;

    assert_eq!(ctx.bootstrap_app_shell().await, AuthState::Authenticated);

    let profile = ctx.profile().unwrap();
    assert_eq!(profile.display_name(), "Anna K.");
    assert_eq!(profile.role, fieldops_core::Role::Operator);
    assert_eq!(ctx.bearer().as_deref(), Some("access-1"));

    let guard = RouteGuard::new(&ctx, "/orders");
    assert_eq!(guard.resolve().await, GuardDecision::Allow);
}

/// A stale bearer token plus a live refresh token: the 401 path refreshes,
/// re-validates once, and comes back authenticated without any login call.
#[tokio::test]
async fn stale_access_token_recovers_via_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(wiremock::matchers::header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"success": true, "data": {"accessToken": "access-2"}}),
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(wiremock::matchers::header("authorization", "Bearer access-2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"success": true, "data": user_json()})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let ctx = test_context(&server.uri(), &tmp);
    ctx.tokens().set_access_token("stale", true).await;
    ctx.tokens().set_refresh_token("refresh-1", true).await;

    assert_eq!(ctx.bootstrap_app_shell().await, AuthState::Authenticated);
    assert_eq!(ctx.bearer().as_deref(), Some("access-2"));
}

/// Two rapid triggers produce exactly one validation sequence.
#[tokio::test]
async fn rapid_double_trigger_validates_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"success": true, "data": user_json()}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let ctx = test_context(&server.uri(), &tmp);

    let shell = Arc::clone(&ctx);
    let remount = Arc::clone(&ctx);
    let (a, b) = tokio::join!(
        tokio::spawn(async move { shell.bootstrap_app_shell().await }),
        tokio::spawn(async move { remount.bootstrap_app_shell().await }),
    );
    assert_eq!(a.unwrap(), AuthState::Authenticated);
    assert_eq!(b.unwrap(), AuthState::Authenticated);
}

/// Every network call hangs: the hard timer still forces a terminal verdict
/// and clears partial token state.
#[tokio::test]
async fn hanging_network_still_reaches_a_verdict() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"success": true, "data": user_json()}))
                .set_delay(Duration::from_secs(60)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(login_success_json())
                .set_delay(Duration::from_secs(60)),
        )
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let ctx = test_context(&server.uri(), &tmp);
    ctx.tokens().set_access_token("whatever", true).await;
    ctx.credentials().save("operator1", "hunter2").await;

    let started = std::time::Instant::now();
    let verdict = ctx.bootstrap_app_shell().await;

    assert_eq!(verdict, AuthState::Unauthenticated);
    // Bounded by the 3s overall timer, with generous slack for slow CI.
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(ctx.bearer().is_none());
}
