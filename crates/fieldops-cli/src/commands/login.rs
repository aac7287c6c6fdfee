//! Interactive login command.

use std::io::Write;

use clap::Args;

use fieldops_core::Config;
use fieldops_session::{SessionContext, SessionError};

/// Login command arguments.
#[derive(Args)]
pub struct LoginArgs {
    /// Login name (prompts if omitted)
    #[arg(short = 'u', long)]
    pub login: Option<String>,

    /// Password (if omitted, prompts for hidden input)
    #[arg(long)]
    pub password: Option<String>,

    /// Remember credentials on this device for auto-login
    #[arg(long)]
    pub remember: bool,
}

/// Run the login command.
pub async fn run(args: LoginArgs, config: &Config) -> anyhow::Result<()> {
    let ctx = SessionContext::new(config)?;

    let login = match args.login {
        Some(login) => login,
        None => prompt_line("Login: ")?,
    };
    if login.is_empty() {
        anyhow::bail!("Login must not be empty");
    }

    let password = match args.password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ")
            .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))?,
    };

    match ctx.login(&login, &password, args.remember).await {
        Ok(profile) => {
            println!("Signed in as {} ({}).", profile.display_name(), profile.role);
            if args.remember {
                println!("Credentials remembered on this device for auto-login.");
            }
            Ok(())
        }
        Err(SessionError::InvalidCredentials) => {
            anyhow::bail!("Invalid login or password.")
        }
        Err(SessionError::TooManyAttempts { retry_in }) => {
            anyhow::bail!(
                "Too many failed attempts. Try again in {}s.",
                retry_in.as_secs()
            )
        }
        Err(e) => Err(e.into()),
    }
}

fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
