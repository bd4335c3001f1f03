//! In command handler
//!
//! Writes the current status document to `<destination>/status`.

use anyhow::{Context, Result};
use pstatus_core::codec;
use pstatus_core::dto::VersionResponse;
use pstatus_core::dto::get::InRequest;
use pstatus_driver::BuildIdentity;
use pstatus_store::Store;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::ResourceConfig;
use crate::debug::dump_request;

/// Name of the file written into the destination directory
pub const STATUS_FILE: &str = "status";

/// Handle an in request
pub(super) async fn handle(
    input: &str,
    identity: BuildIdentity,
    destination: &Path,
) -> Result<String> {
    let request: InRequest = serde_json::from_str(input).context("reading request")?;
    if request.source.is_debug() {
        dump_request("indbg", &request);
    }

    let config = ResourceConfig::from_source(&request.source).context("constructing driver")?;
    let store = config.open_store().context("constructing driver")?;

    let response = run_in(&config, store, identity, &request, destination).await?;
    Ok(serde_json::to_string(&response)?)
}

/// Fetches the current status into `destination`
///
/// Without a stored document an empty status is written and the requested
/// version is echoed back.
pub async fn run_in(
    config: &ResourceConfig,
    store: Arc<dyn Store>,
    identity: BuildIdentity,
    request: &InRequest,
    destination: &Path,
) -> Result<VersionResponse> {
    let driver = config.driver(store, identity);

    std::fs::create_dir_all(destination)
        .with_context(|| format!("creating destination {}", destination.display()))?;

    let status = driver.load().await.context("fetching status")?;
    let number = match &status {
        Some(status) => status.build_number.clone(),
        None => {
            warn!("No status stored under {}", driver.key());
            request.requested_version().to_string()
        }
    };

    let body = codec::encode(&status.unwrap_or_default())
        .context("fetching status")?;
    let path = destination.join(STATUS_FILE);
    std::fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;

    info!("Wrote build {} status to {}", number, path.display());
    Ok(VersionResponse::for_build(number))
}
