//! Remembered-credential management commands.
//!
//! Provides `fieldops credentials show|clear` over the encrypted store. The
//! show surface never prints the password; it only reports whether a usable
//! record exists and for which login.

use clap::Args;

use fieldops_core::Config;
use fieldops_credentials::CredentialStore;

/// Credentials command arguments.
#[derive(Args)]
pub struct CredentialsArgs {
    #[command(subcommand)]
    pub command: CredentialsCommand,
}

#[derive(clap::Subcommand)]
pub enum CredentialsCommand {
    /// Show whether remembered credentials exist on this device
    Show,

    /// Delete the remembered credentials
    Clear,
}

/// Run the credentials command.
pub async fn run(args: CredentialsArgs, config: &Config) -> anyhow::Result<()> {
    let store = CredentialStore::from_config(&config.auth)
        .map_err(|e| anyhow::anyhow!("Failed to open credential store: {}", e))?;

    match args.command {
        CredentialsCommand::Show => match store.load().await {
            Some(creds) => {
                println!("Remembered credentials for '{}' (usable on this device).", creds.login);
            }
            None => {
                println!("No remembered credentials (absent, expired, or unreadable on this device).");
            }
        },

        CredentialsCommand::Clear => {
            store.clear().await;
            println!("Remembered credentials cleared.");
        }
    }

    Ok(())
}
