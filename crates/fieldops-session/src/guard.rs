//! Render-blocking guard for protected screens.
//!
//! A guard consumes the bootstrap state channel and turns it into exactly
//! one of three UI postures: keep showing a loading indicator, render the
//! protected content, or redirect to the login screen with the originally
//! requested path preserved as the return target. It also subscribes once to
//! the auth event bus, so a session rejected mid-wait flips straight to the
//! redirect branch.

use tokio::sync::{broadcast, watch};
use tracing::debug;

use fieldops_api::AuthEvent;

use crate::context::SessionContext;
use crate::state::AuthState;

/// Path of the login screen redirects point at.
pub const LOGIN_PATH: &str = "/login";

/// What a guarded screen should show right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardStatus {
    /// Bootstrap still running: show the loading indicator.
    Loading,

    /// Authenticated: render the protected content.
    Content,

    /// Unauthenticated: render nothing while the redirect happens.
    Redirecting,
}

/// Terminal decision for a guarded navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the protected content.
    Allow,

    /// Navigate to the login screen at `to`.
    RedirectToLogin { to: String },
}

/// Guard for one requested path.
pub struct RouteGuard {
    state_rx: watch::Receiver<AuthState>,
    events: broadcast::Receiver<AuthEvent>,
    requested_path: String,
}

impl RouteGuard {
    /// Guard the navigation to `requested_path`.
    pub fn new(ctx: &SessionContext, requested_path: impl Into<String>) -> Self {
        Self {
            state_rx: ctx.watch_state(),
            events: ctx.api().events().subscribe(),
            requested_path: requested_path.into(),
        }
    }

    /// Snapshot of what should be on screen right now.
    pub fn status(&self) -> GuardStatus {
        match *self.state_rx.borrow() {
            AuthState::Idle | AuthState::Checking => GuardStatus::Loading,
            AuthState::Authenticated => GuardStatus::Content,
            AuthState::Unauthenticated => GuardStatus::Redirecting,
        }
    }

    /// Wait for a terminal verdict and decide render vs redirect.
    pub async fn resolve(mut self) -> GuardDecision {
        loop {
            let state = *self.state_rx.borrow_and_update();
            match state {
                AuthState::Authenticated => return GuardDecision::Allow,
                AuthState::Unauthenticated => return self.redirect(),
                AuthState::Idle | AuthState::Checking => {}
            }

            tokio::select! {
                changed = self.state_rx.changed() => {
                    if changed.is_err() {
                        // Context dropped mid-wait; fail closed.
                        return self.redirect();
                    }
                }
                event = self.events.recv() => {
                    if matches!(event, Ok(AuthEvent::SessionRejected)) {
                        debug!("session rejected while guarding; redirecting");
                        return self.redirect();
                    }
                    // Lagged or closed: keep waiting on the state channel.
                }
            }
        }
    }

    fn redirect(&self) -> GuardDecision {
        GuardDecision::RedirectToLogin {
            to: login_redirect(&self.requested_path),
        }
    }
}

/// Build the login redirect, preserving `requested` as the return target.
pub fn login_redirect(requested: &str) -> String {
    let next = sanitize_return_target(requested);
    if next == "/" {
        LOGIN_PATH.to_string()
    } else {
        format!("{LOGIN_PATH}?next={}", urlencoding::encode(next))
    }
}

/// Validate a return target down to a safe same-origin relative path.
///
/// Anything that could escape the origin (absolute URLs, scheme-relative
/// `//host` forms, backslash tricks, control characters) collapses to `/`.
pub fn sanitize_return_target(raw: &str) -> &str {
    let target = raw.trim();

    if target.is_empty() || !target.starts_with('/') {
        return "/";
    }
    if target.starts_with("//") {
        return "/";
    }
    if target.contains("://") || target.contains('\\') {
        return "/";
    }
    if target.chars().any(|c| c.is_control()) {
        return "/";
    }

    target
}
