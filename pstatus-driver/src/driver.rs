//! Status driver
//!
//! Loads the status document, runs it through the state machine and writes
//! the result back. Each operation is one read followed by at most one
//! unconditional write; no operation waits or retries.

use pstatus_core::codec;
use pstatus_core::domain::status::{BuildFailure, PipelineStatus};
use pstatus_core::domain::version;
use pstatus_core::state::{self, TargetState};
use pstatus_store::{Store, WriteOptions};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{DriverError, IdentityField, Result};
use crate::identity::BuildIdentity;

/// Version reported by `check` before any build exists, unless configured
pub const DEFAULT_INITIAL_VERSION: &str = "1";

/// Drives the status document stored under one key
pub struct StatusDriver {
    store: Arc<dyn Store>,
    key: String,
    identity: BuildIdentity,
    initial_version: Option<String>,
    write_options: WriteOptions,
}

impl StatusDriver {
    /// Creates a driver for the document stored under `key`
    pub fn new(store: Arc<dyn Store>, key: impl Into<String>, identity: BuildIdentity) -> Self {
        Self {
            store,
            key: key.into(),
            identity,
            initial_version: None,
            write_options: WriteOptions::default(),
        }
    }

    /// Sets the version of the first build; empty means the default
    pub fn with_initial_version(mut self, initial_version: Option<String>) -> Self {
        self.initial_version = initial_version.filter(|v| !v.is_empty());
        self
    }

    /// Sets the server-side encryption applied to every write
    pub fn with_encryption(mut self, encryption: Option<String>) -> Self {
        self.write_options.encryption = encryption.filter(|e| !e.is_empty());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn identity(&self) -> &BuildIdentity {
        &self.identity
    }

    /// Version reported for a pipeline that has never been started
    pub fn initial_version(&self) -> &str {
        self.initial_version
            .as_deref()
            .unwrap_or(DEFAULT_INITIAL_VERSION)
    }

    /// Loads the current status; `None` when no document exists yet
    pub async fn load(&self) -> Result<Option<PipelineStatus>> {
        match self.store.fetch(&self.key).await? {
            Some(bytes) => Ok(Some(codec::decode(&bytes)?)),
            None => {
                debug!("No status document under {}", self.key);
                Ok(None)
            }
        }
    }

    /// Lists versions at or after `cursor`
    ///
    /// Returns at most one version: the current build when it is READY, or
    /// the initial version when nothing was ever started and the caller has
    /// no cursor yet.
    pub async fn check(&self, cursor: &str) -> Result<Vec<String>> {
        let Some(status) = self.load().await? else {
            if cursor.is_empty() {
                return Ok(vec![self.initial_version().to_string()]);
            }
            return Ok(Vec::new());
        };

        if status.is_ready() && version::is_not_older(&status.build_number, cursor) {
            return Ok(vec![status.build_number]);
        }

        debug!(
            "Build {} is {:?}, nothing to report for cursor {:?}",
            status.build_number,
            status.state.as_str(),
            cursor
        );
        Ok(Vec::new())
    }

    /// Moves the pipeline into RUNNING, creating the document on first use
    pub async fn start(&self) -> Result<PipelineStatus> {
        let current = match self.load().await? {
            Some(status) => {
                self.verify_identity(&status)?;
                status
            }
            None => {
                info!(
                    "Creating status for pipeline {} (team {})",
                    self.identity.pipeline, self.identity.team
                );
                PipelineStatus::initial(
                    self.identity.pipeline.clone(),
                    self.identity.team.clone(),
                    self.pre_start_build_number(),
                )
            }
        };

        self.apply(current, TargetState::Running, None).await
    }

    /// Moves the pipeline into READY
    ///
    /// Finishing an already READY pipeline is a no-op.
    pub async fn finish(&self) -> Result<PipelineStatus> {
        self.make_ready(None).await
    }

    /// Moves the pipeline into READY with a failure pointing at this build
    pub async fn fail(&self) -> Result<PipelineStatus> {
        self.make_ready(Some(self.identity.failure())).await
    }

    async fn make_ready(&self, failure: Option<BuildFailure>) -> Result<PipelineStatus> {
        let current = self.load().await?.ok_or_else(|| {
            DriverError::InvalidTransition(
                "cannot move a pipeline into READY before any build has started".to_string(),
            )
        })?;

        if failure.is_some() && current.is_ready() {
            return Err(DriverError::InvalidTransition(format!(
                "cannot add a failure to build {} which is not running",
                current.build_number
            )));
        }

        self.apply(current, TargetState::Ready, failure).await
    }

    /// Transitions `current` and persists the result if anything changed
    async fn apply(
        &self,
        current: PipelineStatus,
        target: TargetState,
        failure: Option<BuildFailure>,
    ) -> Result<PipelineStatus> {
        let next = state::transition(&current, target, failure);

        if next == current {
            debug!(
                "Build {} is already {}, leaving document untouched",
                current.build_number, current.state
            );
            return Ok(current);
        }

        let body = codec::encode(&next)?;
        self.store.write(&self.key, body, &self.write_options).await?;

        info!(
            "Build {} moved from {:?} to {}",
            next.build_number,
            current.state.as_str(),
            next.state
        );
        Ok(next)
    }

    fn verify_identity(&self, status: &PipelineStatus) -> Result<()> {
        let checks = [
            (IdentityField::Pipeline, &status.pipeline, &self.identity.pipeline),
            (IdentityField::Team, &status.team, &self.identity.team),
        ];

        for (field, stored, configured) in checks {
            if stored != configured {
                return Err(DriverError::IdentityMismatch {
                    field,
                    stored: stored.clone(),
                    configured: configured.clone(),
                });
            }
        }

        Ok(())
    }

    /// Build number of a freshly created document
    ///
    /// One below the initial version, so the first start lands exactly on it.
    fn pre_start_build_number(&self) -> String {
        self.initial_version
            .as_deref()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| *v > 0)
            .map_or(0, |v| v - 1)
            .to_string()
    }
}
