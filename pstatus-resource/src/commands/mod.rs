//! Commands module
//!
//! Defines the three resource protocol commands and their handlers. Each
//! handler takes the raw JSON request and returns the JSON response.

mod check;
mod get;
mod put;

pub use check::run_check;
pub use get::run_in;
pub use put::run_out;

use anyhow::Result;
use clap::{Args, Subcommand};
use pstatus_driver::BuildIdentity;
use std::path::PathBuf;

/// Top-level resource commands
#[derive(Subcommand)]
pub enum Commands {
    /// Report new pipeline versions
    Check,
    /// Fetch the status of a version into a directory
    In {
        /// Directory the status file is written to
        destination: PathBuf,
    },
    /// Start, finish or fail the pipeline
    Out {
        /// Directory holding the build's inputs
        #[arg(default_value = ".")]
        sources: PathBuf,
    },
}

/// Build metadata supplied by the orchestrator
#[derive(Args, Debug, Clone, Default)]
pub struct IdentityArgs {
    /// Name of the pipeline being tracked
    #[arg(long, env = "BUILD_PIPELINE_NAME", default_value = "", global = true)]
    pub pipeline: String,

    /// Team owning the pipeline
    #[arg(long, env = "BUILD_TEAM_NAME", default_value = "", global = true)]
    pub team: String,

    /// Job running this step
    #[arg(long, env = "BUILD_JOB_NAME", default_value = "", global = true)]
    pub job: String,

    /// Build running this step
    #[arg(long, env = "BUILD_NAME", default_value = "", global = true)]
    pub build_name: String,

    /// Base URL of the orchestrator's web UI
    #[arg(long, env = "ATC_EXTERNAL_URL", default_value = "", global = true)]
    pub external_url: String,
}

impl From<IdentityArgs> for BuildIdentity {
    fn from(args: IdentityArgs) -> Self {
        BuildIdentity::new(args.pipeline, args.team)
            .with_build(args.job, args.build_name)
            .with_external_url(args.external_url)
    }
}

/// Handle a resource command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `identity` - Build metadata from the environment
/// * `input` - Raw JSON request read from stdin
///
/// # Returns
/// The JSON response to print on stdout
pub async fn handle_command(
    command: Commands,
    identity: BuildIdentity,
    input: &str,
) -> Result<String> {
    match command {
        Commands::Check => check::handle(input, identity).await,
        Commands::In { destination } => get::handle(input, identity, &destination).await,
        Commands::Out { sources } => put::handle(input, identity, &sources).await,
    }
}
