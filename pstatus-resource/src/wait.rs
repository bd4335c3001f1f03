//! Require-ready wait
//!
//! Before starting a build, `out` can hold off until the previous build of
//! the pipeline has finished. The loop polls the status document until it is
//! missing, unset or READY.

use pstatus_core::domain::status::{PipelineState, PipelineStatus};
use pstatus_driver::{DriverError, StatusDriver};
use std::time::Duration;
use tracing::info;

/// Polls until the pipeline is not RUNNING
///
/// Returns the last status seen, or `None` if no document exists. Errors
/// from the store end the wait immediately.
pub async fn wait_until_ready(
    driver: &StatusDriver,
    retry_after: Duration,
) -> Result<Option<PipelineStatus>, DriverError> {
    loop {
        let status = match driver.load().await? {
            Some(status) => status,
            None => return Ok(None),
        };

        match status.state {
            PipelineState::Unset | PipelineState::Ready => return Ok(Some(status)),
            PipelineState::Running => {
                info!(
                    "Build {} of {} is still running, retrying in {}",
                    status.build_number,
                    status.pipeline,
                    humantime::format_duration(retry_after)
                );
                tokio::time::sleep(retry_after).await;
            }
        }
    }
}
