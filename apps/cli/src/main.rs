//! texset CLI — message-triggered texture-set descriptor generator.
//!
//! Feeds inbound requests (caller identity + attachments) into the handler
//! registry and materializes outbound sends into a local directory.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
