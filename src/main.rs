//! sc4pac-tools CLI entry point
//!
//! Parses arguments, runs the command and prints fatal errors with
//! suggestions. Exits with status 1 on failure.

use anyhow::Result;
use clap::Parser;
use sc4pac_tools::cli;
use sc4pac_tools::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
