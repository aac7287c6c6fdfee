//! Logout command.

use fieldops_core::Config;
use fieldops_session::SessionContext;

/// Run the logout command.
///
/// The server call is best-effort; local state is cleared either way.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    let ctx = SessionContext::new(config)?;
    ctx.logout().await;
    println!("Signed out; local session state cleared.");
    Ok(())
}
