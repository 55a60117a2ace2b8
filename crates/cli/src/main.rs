// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! reflex - local HTTPS referrer emulation

mod commands;
mod error;
mod logging;
mod privilege;

use clap::{Parser, Subcommand};
use commands::{cleanup, run, status};
use error::CliError;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "reflex",
    version,
    about = "reflex - Local HTTPS referrer emulation for analytics testing"
)]
struct Cli {
    /// Verbose logs
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTPS server, map the referrer host, open the browser
    Run(run::RunArgs),
    /// Remove the hosts mapping and generated certificates
    Cleanup(cleanup::CleanupArgs),
    /// Show current state for a referrer
    Status(status::StatusArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match logging::init(cli.verbose, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: {}", render_chain(&e));
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Run(args) => run::run(args, cli.verbose).await,
        Commands::Cleanup(args) => cleanup::cleanup(args),
        Commands::Status(args) => status::status(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<CliError>() {
                Some(cli_error) => {
                    eprint!("{}", cli_error);
                    if let Some(cause) = std::error::Error::source(cli_error) {
                        tracing::debug!(error = %cause, "caused by");
                    }
                }
                None => eprintln!("error: {}", render_chain(&e)),
            }
            ExitCode::FAILURE
        }
    }
}

/// Join an error with its causes, skipping causes already quoted by the
/// message above them
fn render_chain(err: &anyhow::Error) -> String {
    let mut rendered = err.to_string();
    for cause in err.chain().skip(1) {
        let message = cause.to_string();
        if !rendered.contains(&message) {
            rendered.push_str(": ");
            rendered.push_str(&message);
        }
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn render_chain_appends_context_causes() {
        let err = Err::<(), _>(std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"))
            .context("read hosts")
            .unwrap_err();
        assert_eq!(render_chain(&err), "read hosts: no such file");
    }

    #[test]
    fn render_chain_skips_quoted_causes() {
        let err = anyhow::Error::new(reflex_engine::SessionError::Listener(
            reflex_adapters::ResponderError::Tls("bad pem".to_string()),
        ));
        assert_eq!(render_chain(&err), "server error: TLS setup failed: bad pem");
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["reflex", "status", "--referrer", "a.test", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Status(_)));
    }
}
