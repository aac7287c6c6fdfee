//! Interactive login rate limiting, end to end.

use std::time::Duration;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fieldops_integration_tests::{login_success_json, test_context};
use fieldops_session::SessionError;

/// Ten straight rejections block the eleventh attempt client-side, and the
/// block holds even once the server would accept the password.
#[tokio::test]
async fn ten_rejections_block_the_eleventh_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .expect(10)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let ctx = test_context(&server.uri(), &tmp);

    for attempt in 1..=10 {
        let err = ctx.login("operator1", "wrong", false).await.unwrap_err();
        assert!(
            matches!(err, SessionError::InvalidCredentials),
            "attempt {attempt} should reach the server and be rejected"
        );
    }

    // The 11th attempt never reaches the network.
    let err = ctx.login("operator1", "wrong", false).await.unwrap_err();
    match err {
        SessionError::TooManyAttempts { retry_in } => {
            assert!(retry_in > Duration::from_secs(0));
            assert!(retry_in <= Duration::from_secs(300));
        }
        other => panic!("expected a cooldown block, got {other:?}"),
    }

    // Even a now-correct password is blocked until the cooldown lapses.
    server.reset().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_success_json()))
        .expect(0)
        .mount(&server)
        .await;

    let err = ctx.login("operator1", "hunter2", false).await.unwrap_err();
    assert!(matches!(err, SessionError::TooManyAttempts { .. }));
}

/// A success before the threshold clears the rejection streak.
#[tokio::test]
async fn success_resets_the_rejection_streak() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(9)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_success_json()))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let ctx = test_context(&server.uri(), &tmp);

    for _ in 0..9 {
        let err = ctx.login("operator1", "wrong", false).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));
    }

    // The tenth attempt succeeds and wipes the streak.
    ctx.login("operator1", "hunter2", false).await.unwrap();
}
