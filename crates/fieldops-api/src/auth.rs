//! Typed operations for the auth endpoints.
//!
//! Wire bodies follow the server's camelCase field naming. Each operation
//! takes an explicit per-call timeout; the session layer picks the bound per
//! bootstrap step.

use std::time::Duration;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use fieldops_core::UserProfile;

use crate::client::{with_timeout, ApiClient};
use crate::error::{ApiError, Result};

#[derive(Serialize)]
struct LoginBody<'a> {
    login: &'a str,
    password: &'a str,
}

/// Successful login payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserProfile,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshBody<'a> {
    refresh_token: &'a str,
}

/// Successful token refresh payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

impl ApiClient {
    /// `POST /auth/login` with a login/password pair.
    ///
    /// A 401 here means the pair itself was rejected, so it surfaces as
    /// [`ApiError::InvalidCredentials`] rather than a stale-session 401.
    pub async fn login(
        &self,
        login: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<LoginResponse> {
        let body = LoginBody { login, password };
        let result = with_timeout(
            timeout,
            self.request_json(Method::POST, "/auth/login", None, Some(&body)),
        )
        .await;

        match result {
            Err(ApiError::Unauthorized) => Err(ApiError::InvalidCredentials),
            other => other,
        }
    }

    /// `GET /auth/me` -- validate the current session and fetch the profile.
    pub async fn me(&self, bearer: Option<&str>, timeout: Duration) -> Result<UserProfile> {
        with_timeout(
            timeout,
            self.request_json(Method::GET, "/auth/me", bearer, None::<&()>),
        )
        .await
    }

    /// `POST /auth/refresh` -- exchange the refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str, timeout: Duration) -> Result<RefreshResponse> {
        let body = RefreshBody { refresh_token };
        with_timeout(
            timeout,
            self.request_json(Method::POST, "/auth/refresh", None, Some(&body)),
        )
        .await
    }

    /// `POST /auth/logout` -- invalidate the server-side session.
    ///
    /// Best-effort: callers clear local state whether or not this succeeds.
    pub async fn logout(&self, bearer: Option<&str>, timeout: Duration) -> Result<()> {
        with_timeout(
            timeout,
            self.request_ack(Method::POST, "/auth/logout", bearer),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(2);

    fn user_json() -> serde_json::Value {
        json!({"id": 7, "login": "operator1", "name": "Anna K.", "role": "operator"})
    }

    #[tokio::test]
    async fn test_login_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"login": "operator1", "password": "hunter2"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "accessToken": "access-1",
                    "refreshToken": "refresh-1",
                    "user": user_json(),
                }
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let resp = client.login("operator1", "hunter2", TIMEOUT).await.unwrap();
        assert_eq!(resp.access_token, "access-1");
        assert_eq!(resp.refresh_token, "refresh-1");
        assert_eq!(resp.user.login, "operator1");
    }

    #[tokio::test]
    async fn test_login_rejection_maps_to_invalid_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let result = client.login("operator1", "wrong", TIMEOUT).await;
        assert!(matches!(result, Err(ApiError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_me_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "data": user_json()})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let profile = client.me(Some("access-1"), TIMEOUT).await.unwrap();
        assert_eq!(profile.id, 7);
        assert_eq!(profile.display_name(), "Anna K.");
    }

    #[tokio::test]
    async fn test_me_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let result = client.me(None, TIMEOUT).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_refresh_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(body_json(json!({"refreshToken": "refresh-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"success": true, "data": {"accessToken": "access-2"}}),
            ))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let resp = client.refresh("refresh-1", TIMEOUT).await.unwrap();
        assert_eq!(resp.access_token, "access-2");
    }

    #[tokio::test]
    async fn test_logout_ok_and_server_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        client.logout(Some("access-1"), TIMEOUT).await.unwrap();

        server.reset().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        // The caller ignores this; it just has to be an error, not a panic.
        assert!(client.logout(Some("access-1"), TIMEOUT).await.is_err());
    }

    #[tokio::test]
    async fn test_me_timeout_is_transient_not_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "data": user_json()}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let result = client.me(None, Duration::from_millis(50)).await;
        match result {
            Err(err) => assert!(!err.is_unauthorized()),
            Ok(_) => panic!("expected timeout"),
        }
    }
}
