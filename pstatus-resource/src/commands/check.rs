//! Check command handler
//!
//! Reports the pipeline's current build as a new version once it is READY.

use anyhow::{Context, Result};
use pstatus_core::dto::Version;
use pstatus_core::dto::check::{CheckRequest, CheckResponse};
use pstatus_driver::BuildIdentity;
use pstatus_store::Store;
use std::sync::Arc;
use tracing::debug;

use crate::config::ResourceConfig;
use crate::debug::dump_request;

/// Handle a check request
pub(super) async fn handle(input: &str, identity: BuildIdentity) -> Result<String> {
    let request: CheckRequest = serde_json::from_str(input).context("reading request")?;
    if request.source.is_debug() {
        dump_request("checkdbg", &request);
    }

    let config = ResourceConfig::from_source(&request.source).context("constructing driver")?;
    let store = config.open_store().context("constructing driver")?;

    let response = run_check(&config, store, identity, &request).await?;
    Ok(serde_json::to_string(&response)?)
}

/// Lists versions at or after the request's cursor
pub async fn run_check(
    config: &ResourceConfig,
    store: Arc<dyn Store>,
    identity: BuildIdentity,
    request: &CheckRequest,
) -> Result<CheckResponse> {
    let driver = config.driver(store, identity);

    debug!("Checking {} from {:?}", driver.key(), request.cursor());
    let versions = driver
        .check(request.cursor())
        .await
        .context("checking for new versions")?;

    Ok(versions.into_iter().map(Version::new).collect())
}
