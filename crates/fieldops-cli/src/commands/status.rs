//! Status command: the app-shell bootstrap.

use std::time::Instant;

use fieldops_core::Config;
use fieldops_session::{AuthState, SessionContext};

/// Run the status command.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    let ctx = SessionContext::new(config)?;
    let _listener = ctx.listen_for_auth_errors();

    let started = Instant::now();
    let verdict = ctx.bootstrap_app_shell().await;
    let elapsed = started.elapsed();

    match verdict {
        AuthState::Authenticated => {
            let profile = ctx.profile();
            let who = profile
                .as_ref()
                .map(|p| p.display_name().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            println!("Session: authenticated as {who} ({}ms)", elapsed.as_millis());
        }
        state => {
            println!("Session: {state} ({}ms)", elapsed.as_millis());
        }
    }

    if ctx.credentials().exists().await {
        println!("Remembered credentials: present");
    } else {
        println!("Remembered credentials: none");
    }

    println!("API: {}", ctx.api().base_url());
    Ok(())
}
