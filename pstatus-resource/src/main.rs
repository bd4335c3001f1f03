//! Pipeline Status Resource CLI
//!
//! Entry point invoked by the orchestrator for `check`, `in` and `out`.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::io::Read;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pstatus_core::dto::source::Source;
use pstatus_resource::commands::{Commands, IdentityArgs, handle_command};

#[derive(Parser)]
#[command(name = "pstatus")]
#[command(about = "Pipeline status resource", long_about = None)]
struct Cli {
    #[command(flatten)]
    identity: IdentityArgs,

    #[command(subcommand)]
    command: Commands,
}

/// The part of every request needed before dispatching
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    source: Source,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(output) => {
            // Only a fully successful call produces output
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<String> {
    let cli = Cli::parse();

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("reading request")?;

    let envelope: Envelope = serde_json::from_str(&input).context("reading request")?;
    init_tracing(envelope.source.is_debug());

    handle_command(cli.command, cli.identity.into(), &input).await
}

/// Logs go to stderr; stdout carries the protocol response
fn init_tracing(debug: bool) {
    let filter = if debug {
        tracing_subscriber::EnvFilter::new("pstatus=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "pstatus=info".into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
