//! The session context: explicit owner of all client-side auth state.
//!
//! One `SessionContext` is constructed at startup and handed to whichever
//! components need it. Its state has exactly three writer paths: the
//! bootstrap sequencer, the interactive login/logout handlers here, and the
//! auth-event listener reacting to downstream 401s. Everything else only
//! reads.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use fieldops_api::auth::LoginResponse;
use fieldops_api::{ApiClient, ApiError, AuthEvent};
use fieldops_core::config::{AuthConfig, Config};
use fieldops_core::{paths, UserProfile};
use fieldops_credentials::CredentialStore;

use crate::error::{Result, SessionError};
use crate::rate_limit::{LoginGate, LoginRateLimiter};
use crate::state::AuthState;
use crate::state_cache::{SessionSnapshot, StateCache};
use crate::tokens::TokenManager;

/// Per-step time bounds for the session layer.
#[derive(Debug, Clone)]
pub struct AuthTimeouts {
    /// Who-am-i probe during the app-shell bootstrap.
    pub validate: Duration,

    /// Who-am-i probe when a route guard triggers the check.
    pub guard_validate: Duration,

    /// Token refresh call.
    pub refresh: Duration,

    /// Interactive and auto login calls.
    pub login: Duration,

    /// Hard bound for the whole bootstrap chain.
    pub bootstrap: Duration,
}

impl AuthTimeouts {
    /// Bounds tuned from config.
    pub fn from_config(auth: &AuthConfig) -> Self {
        Self {
            validate: Duration::from_secs(auth.validate_timeout_secs),
            guard_validate: Duration::from_secs(auth.guard_validate_timeout_secs),
            refresh: Duration::from_secs(auth.refresh_timeout_secs),
            login: Duration::from_secs(auth.login_timeout_secs),
            bootstrap: Duration::from_secs(auth.bootstrap_timeout_secs),
        }
    }
}

/// Owner of tokens, profile, bootstrap state, and the supporting stores.
pub struct SessionContext {
    api: Arc<ApiClient>,
    tokens: TokenManager,
    credentials: CredentialStore,
    state_cache: StateCache,
    limiter: LoginRateLimiter,
    timeouts: AuthTimeouts,
    profile: RwLock<Option<UserProfile>>,
    state_tx: watch::Sender<AuthState>,
    pub(crate) bootstrap_started: AtomicBool,
}

impl SessionContext {
    /// Build a context with the default store locations from config.
    pub fn new(config: &Config) -> Result<Arc<Self>> {
        paths::ensure_dirs().map_err(|e| SessionError::Storage(e.to_string()))?;

        let api = Arc::new(ApiClient::from_config(&config.api)?);
        let tokens = TokenManager::from_config(&config.auth)?;
        let credentials = CredentialStore::from_config(&config.auth)
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        let state_cache = StateCache::from_config(&config.auth)?;
        let limiter = LoginRateLimiter::from_config(&config.auth);

        Ok(Self::assemble(
            api,
            tokens,
            credentials,
            state_cache,
            limiter,
            AuthTimeouts::from_config(&config.auth),
        ))
    }

    /// Assemble a context from explicit parts.
    ///
    /// Lets tests and embedders point the stores at custom locations.
    pub fn assemble(
        api: Arc<ApiClient>,
        tokens: TokenManager,
        credentials: CredentialStore,
        state_cache: StateCache,
        limiter: LoginRateLimiter,
        timeouts: AuthTimeouts,
    ) -> Arc<Self> {
        let (state_tx, _) = watch::channel(AuthState::Idle);
        Arc::new(Self {
            api,
            tokens,
            credentials,
            state_cache,
            limiter,
            timeouts,
            profile: RwLock::new(None),
            state_tx,
            bootstrap_started: AtomicBool::new(false),
        })
    }

    /// The API client this context authenticates against.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The remembered-credential store.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// The token manager.
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub(crate) fn state_cache(&self) -> &StateCache {
        &self.state_cache
    }

    pub(crate) fn timeouts(&self) -> &AuthTimeouts {
        &self.timeouts
    }

    /// Current bootstrap state.
    pub fn state(&self) -> AuthState {
        *self.state_tx.borrow()
    }

    /// A receiver that observes every state transition.
    pub fn watch_state(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    pub(crate) fn set_state(&self, state: AuthState) {
        self.state_tx.send_replace(state);
    }

    /// The cached profile of the authenticated user, if any.
    pub fn profile(&self) -> Option<UserProfile> {
        self.profile.read().expect("profile lock").clone()
    }

    /// Bearer token for an outgoing request, if one is held.
    pub fn bearer(&self) -> Option<String> {
        self.tokens
            .access_token()
            .map(|t| t.expose().to_string())
    }

    /// Interactive login with a typed-in pair.
    ///
    /// Enforces the client-side rate limit, persists tokens into the tier
    /// picked by `remember`, and saves the pair for auto-login when the user
    /// consented to be remembered.
    pub async fn login(&self, login: &str, password: &str, remember: bool) -> Result<UserProfile> {
        if let LoginGate::Blocked { retry_in } = self.limiter.check() {
            return Err(SessionError::TooManyAttempts { retry_in });
        }

        match self.api.login(login, password, self.timeouts.login).await {
            Ok(resp) => {
                let profile = resp.user.clone();
                self.install_session(&resp, remember).await;
                if remember {
                    self.credentials.save(login, password).await;
                }
                self.limiter.reset();
                info!(login, "interactive login succeeded");
                Ok(profile)
            }
            Err(ApiError::InvalidCredentials) => {
                self.limiter.record_rejection();
                Err(SessionError::InvalidCredentials)
            }
            Err(e) => Err(SessionError::Api(e)),
        }
    }

    /// Log out: best-effort server call, then clear everything local.
    pub async fn logout(&self) {
        let bearer = self.bearer();
        if let Err(e) = self
            .api
            .logout(bearer.as_deref(), self.timeouts.login)
            .await
        {
            debug!("server-side logout failed, clearing local state anyway: {e}");
        }

        self.credentials.clear().await;
        self.clear_session().await;
    }

    /// Spawn the listener that reacts to downstream 401s.
    ///
    /// Subscribes once to the auth event bus; every rejection clears the
    /// local session so guards flip to their redirect branch.
    pub fn listen_for_auth_errors(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let ctx = Arc::clone(self);
        let mut events = self.api.events().subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(AuthEvent::SessionRejected) => {
                        warn!("server rejected the session; clearing local auth state");
                        ctx.clear_session().await;
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Adopt a fresh login result: tokens, profile, snapshot, state.
    pub(crate) async fn install_session(&self, resp: &LoginResponse, remember: bool) {
        self.tokens.set_access_token(&resp.access_token, remember).await;
        self.tokens
            .set_refresh_token(&resp.refresh_token, remember)
            .await;
        self.adopt_profile(resp.user.clone()).await;
        self.set_state(AuthState::Authenticated);
    }

    /// Replace the cached profile wholesale and mirror the session snapshot.
    pub(crate) async fn adopt_profile(&self, profile: UserProfile) {
        {
            let mut cell = self.profile.write().expect("profile lock");
            *cell = Some(profile.clone());
        }

        let snapshot = SessionSnapshot {
            user: profile,
            authenticated: true,
            access_token: self.tokens.access_token().map(|t| t.expose().to_string()),
            refresh_token: self.tokens.refresh_token().map(|t| t.expose().to_string()),
            saved_at: chrono::Utc::now(),
        };
        self.state_cache.save(&snapshot).await;
    }

    /// Drop tokens, snapshot, and profile; report unauthenticated.
    ///
    /// Remembered credentials survive: a later bootstrap may still use them
    /// for auto-login. They are only deleted by logout or a failed
    /// auto-login.
    pub(crate) async fn clear_session(&self) {
        self.tokens.clear().await;
        self.state_cache.clear().await;
        {
            let mut cell = self.profile.write().expect("profile lock");
            *cell = None;
        }
        self.set_state(AuthState::Unauthenticated);
    }
}
