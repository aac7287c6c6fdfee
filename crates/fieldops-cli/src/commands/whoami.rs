//! Whoami command: the route-guard consumer.

use std::sync::Arc;

use clap::Args;

use fieldops_core::Config;
use fieldops_session::{GuardDecision, RouteGuard, SessionContext};

/// Whoami command arguments.
#[derive(Args)]
pub struct WhoamiArgs {
    /// Dashboard path to return to after a required login
    #[arg(long, default_value = "/")]
    pub path: String,
}

/// Run the whoami command.
///
/// Plays the guarded-route role: the guard blocks until the bootstrap
/// reaches a verdict, then either prints the profile or the login redirect.
pub async fn run(args: WhoamiArgs, config: &Config) -> anyhow::Result<()> {
    let ctx = SessionContext::new(config)?;
    let _listener = ctx.listen_for_auth_errors();

    let guard = RouteGuard::new(&ctx, &args.path);
    let bootstrapper = Arc::clone(&ctx);
    tokio::spawn(async move {
        bootstrapper.bootstrap_route_guard().await;
    });

    match guard.resolve().await {
        GuardDecision::Allow => {
            let profile = ctx
                .profile()
                .ok_or_else(|| anyhow::anyhow!("Authenticated but no profile cached"))?;
            println!(
                "{} (login: {}, role: {}, id: {})",
                profile.display_name(),
                profile.login,
                profile.role,
                profile.id
            );
            Ok(())
        }
        GuardDecision::RedirectToLogin { to } => {
            anyhow::bail!("Not signed in. Run `fieldops login` (return target: {to}).")
        }
    }
}
