//! Out command handler
//!
//! Applies `start`, `finish` or `fail` to the pipeline's status.

use anyhow::{Context, Result};
use pstatus_core::dto::VersionResponse;
use pstatus_core::dto::put::{OutRequest, StatusAction};
use pstatus_driver::BuildIdentity;
use pstatus_store::Store;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ResourceConfig;
use crate::debug::dump_request;
use crate::wait::wait_until_ready;

/// Handle an out request
pub(super) async fn handle(input: &str, identity: BuildIdentity, sources: &Path) -> Result<String> {
    let request: OutRequest = serde_json::from_str(input).context("reading request")?;
    if request.source.is_debug() {
        dump_request("outdbg", &request);
    }
    debug!("Build inputs at {}", sources.display());

    let config = ResourceConfig::from_source(&request.source).context("constructing driver")?;
    let store = config.open_store().context("constructing driver")?;

    let response = run_out(&config, store, identity, &request).await?;
    Ok(serde_json::to_string(&response)?)
}

/// Runs the requested action and reports the resulting build
pub async fn run_out(
    config: &ResourceConfig,
    store: Arc<dyn Store>,
    identity: BuildIdentity,
    request: &OutRequest,
) -> Result<VersionResponse> {
    let driver = config.driver(store, identity);
    let action = request.params.action;

    info!("{} pipeline {}", action.verb(), driver.identity().pipeline);

    let status = match action {
        StatusAction::Start => {
            if config.require_ready {
                wait_until_ready(&driver, config.retry_after)
                    .await
                    .context("waiting for pipeline to be ready")?;
            }
            driver.start().await
        }
        StatusAction::Finish => driver.finish().await,
        StatusAction::Fail => driver.fail().await,
    }
    .with_context(|| format!("{} pipeline", action.verb()))?;

    Ok(VersionResponse::for_build(status.build_number))
}
