//! FieldOps CLI entry point.

use clap::Parser;
use fieldops_cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
