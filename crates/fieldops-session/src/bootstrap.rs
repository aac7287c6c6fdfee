//! The auth bootstrap sequencer.
//!
//! On app start the client has to decide, exactly once, whether a valid
//! session exists, without ever leaving the UI on an indefinite spinner.
//! The recovery chain is ordered from cheapest to most expensive:
//!
//! 1. in-memory profile (no network),
//! 2. direct who-am-i validation,
//! 3. on an explicit rejection: token refresh, then the persisted session
//!    snapshot, each followed by one re-validation,
//! 4. on any other failure (app-shell only): auto-login with remembered
//!    credentials,
//! 5. give up, clear partial token state, report unauthenticated.
//!
//! Each step is strictly sequential and individually time-bounded, and the
//! whole chain additionally races one hard overall timer. A second trigger
//! (say, a rapid remount) never re-runs the chain; it just awaits the first
//! run's verdict.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::context::SessionContext;
use crate::state::AuthState;

/// Tuning for one bootstrap run.
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    /// Bound for each who-am-i probe in the chain.
    pub validate_timeout: Duration,

    /// Whether the chain may fall back to remembered-credential login.
    pub auto_login: bool,
}

impl SessionContext {
    /// App-shell bootstrap: tight probe plus the auto-login fallback.
    pub async fn bootstrap_app_shell(self: &Arc<Self>) -> AuthState {
        let opts = BootstrapOptions {
            validate_timeout: self.timeouts().validate,
            auto_login: true,
        };
        self.bootstrap(opts).await
    }

    /// Route-guard bootstrap: looser probe, no credential fallback.
    pub async fn bootstrap_route_guard(self: &Arc<Self>) -> AuthState {
        let opts = BootstrapOptions {
            validate_timeout: self.timeouts().guard_validate,
            auto_login: false,
        };
        self.bootstrap(opts).await
    }

    /// Run the recovery chain, at most once per process.
    ///
    /// Returns the terminal verdict. Concurrent and repeated calls do not
    /// start a second chain; they wait for the one run's verdict.
    pub async fn bootstrap(self: &Arc<Self>, opts: BootstrapOptions) -> AuthState {
        if self.bootstrap_started.swap(true, Ordering::SeqCst) {
            debug!("bootstrap already triggered; awaiting its verdict");
            return self.wait_terminal().await;
        }

        self.set_state(AuthState::Checking);

        let overall = self.timeouts().bootstrap;
        let verdict = match tokio::time::timeout(overall, self.run_recovery_chain(&opts)).await {
            Ok(state) => state,
            Err(_) => {
                warn!(
                    "bootstrap exceeded its {}s bound; forcing unauthenticated",
                    overall.as_secs()
                );
                self.clear_session().await;
                AuthState::Unauthenticated
            }
        };

        self.set_state(verdict);
        verdict
    }

    async fn wait_terminal(&self) -> AuthState {
        let mut rx = self.watch_state();
        loop {
            let state = *rx.borrow_and_update();
            if state.is_terminal() {
                return state;
            }
            if rx.changed().await.is_err() {
                return self.state();
            }
        }
    }

    async fn run_recovery_chain(&self, opts: &BootstrapOptions) -> AuthState {
        // A profile cached by an earlier action in this process settles it
        // without touching the network.
        if let Some(profile) = self.profile() {
            debug!(login = %profile.login, "profile already cached; skipping validation");
            return AuthState::Authenticated;
        }

        self.tokens().hydrate().await;

        let bearer = self.bearer();
        match self.api().me(bearer.as_deref(), opts.validate_timeout).await {
            Ok(profile) => {
                info!(login = %profile.login, "session validated");
                self.adopt_profile(profile).await;
                return AuthState::Authenticated;
            }
            Err(e) if e.is_unauthorized() => {
                debug!("session explicitly rejected; trying refresh and restore");
                if self.recover_from_rejection(opts.validate_timeout).await {
                    return AuthState::Authenticated;
                }
            }
            Err(e) => {
                debug!("session validation failed: {e}");
                if opts.auto_login && self.auto_login_with_saved_credentials().await {
                    return AuthState::Authenticated;
                }
            }
        }

        self.clear_session().await;
        AuthState::Unauthenticated
    }

    /// Refresh the access token, then fall back to the persisted session
    /// snapshot, re-validating once after each.
    async fn recover_from_rejection(&self, validate_timeout: Duration) -> bool {
        if let Some(refresh) = self.tokens().refresh_token() {
            match self
                .api()
                .refresh(refresh.expose(), self.timeouts().refresh)
                .await
            {
                Ok(resp) => {
                    // Stay in whichever tier held the refresh token, so the
                    // remember choice survives the refresh.
                    let remember = self.tokens().remember();
                    self.tokens()
                        .set_access_token(&resp.access_token, remember)
                        .await;

                    match self
                        .api()
                        .me(Some(&resp.access_token), validate_timeout)
                        .await
                    {
                        Ok(profile) => {
                            info!(login = %profile.login, "session recovered via token refresh");
                            self.adopt_profile(profile).await;
                            return true;
                        }
                        Err(e) => debug!("validation after refresh failed: {e}"),
                    }
                }
                Err(e) => debug!("token refresh failed: {e}"),
            }
        } else {
            debug!("no refresh token held");
        }

        if let Some(snapshot) = self.state_cache().load().await {
            if snapshot.authenticated {
                if let Some(access) = snapshot.access_token.clone() {
                    // Snapshot tokens came from durable state.
                    self.tokens().set_access_token(&access, true).await;
                    if let Some(refresh) = snapshot.refresh_token.as_deref() {
                        self.tokens().set_refresh_token(refresh, true).await;
                    }

                    match self.api().me(Some(&access), validate_timeout).await {
                        Ok(profile) => {
                            info!(login = %profile.login, "session restored from persisted snapshot");
                            self.adopt_profile(profile).await;
                            return true;
                        }
                        Err(e) => debug!("validation after restore failed: {e}"),
                    }
                }
            }
        }

        false
    }

    /// Log in with the remembered pair; any failure discards the pair.
    async fn auto_login_with_saved_credentials(&self) -> bool {
        let Some(creds) = self.credentials().load().await else {
            debug!("no remembered credentials");
            return false;
        };

        info!(login = %creds.login, "attempting auto-login with remembered credentials");
        match self
            .api()
            .login(&creds.login, creds.password.expose(), self.timeouts().login)
            .await
        {
            Ok(resp) => {
                // A remembered pair implies the user opted into durable state.
                self.install_session(&resp, true).await;
                true
            }
            Err(e) => {
                warn!("auto-login failed; discarding remembered credentials: {e}");
                self.credentials().clear().await;
                false
            }
        }
    }
}
