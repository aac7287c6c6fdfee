//! Shared helpers for the integration test binaries.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use fieldops_api::ApiClient;
use fieldops_credentials::CredentialStore;
use fieldops_session::{
    AuthTimeouts, DurableTokenStorage, EphemeralTokenStorage, LoginRateLimiter, SessionContext,
    StateCache, TokenManager,
};

/// Build a session context against `server_uri` with all stores rooted in a
/// temp directory, using tight timeouts so failure paths finish fast.
pub fn test_context(server_uri: &str, tmp: &TempDir) -> Arc<SessionContext> {
    test_context_with_limiter(
        server_uri,
        tmp,
        LoginRateLimiter::new(10, Duration::from_secs(300)),
    )
}

/// Same as [`test_context`] with a caller-supplied rate limiter.
pub fn test_context_with_limiter(
    server_uri: &str,
    tmp: &TempDir,
    limiter: LoginRateLimiter,
) -> Arc<SessionContext> {
    let api = Arc::new(ApiClient::new(server_uri).expect("api client"));
    let tokens = TokenManager::new(
        Arc::new(DurableTokenStorage::new(tmp.path().join("tokens.json"))),
        Arc::new(EphemeralTokenStorage::new()),
        Duration::from_secs(3),
    );
    let credentials = CredentialStore::new(
        tmp.path().join("remembered.json"),
        90,
        Duration::from_secs(3),
    );
    let state_cache = StateCache::new(tmp.path().join("session.json"), Duration::from_secs(3));
    let timeouts = AuthTimeouts {
        validate: Duration::from_millis(500),
        guard_validate: Duration::from_millis(500),
        refresh: Duration::from_millis(500),
        login: Duration::from_millis(500),
        bootstrap: Duration::from_secs(3),
    };

    SessionContext::assemble(api, tokens, credentials, state_cache, limiter, timeouts)
}

/// The standard test user as the server would report it.
pub fn user_json() -> serde_json::Value {
    serde_json::json!({"id": 7, "login": "operator1", "name": "Anna K.", "role": "operator"})
}

/// A successful `/auth/login` envelope.
pub fn login_success_json() -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "data": {
            "accessToken": "access-1",
            "refreshToken": "refresh-1",
            "user": user_json(),
        }
    })
}
