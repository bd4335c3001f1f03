//! Resource configuration
//!
//! Turns the request's `source` block into store and driver settings.

use anyhow::{Context, Result};
use pstatus_core::dto::source::Source;
use pstatus_driver::{BuildIdentity, StatusDriver};
use pstatus_store::config::DEFAULT_REGION;
use pstatus_store::{CredentialSource, Credentials, S3Config, S3Store, SignatureVersion, Store};
use std::sync::Arc;
use std::time::Duration;

/// Poll interval of the require-ready wait when `retry_after` is unset or invalid
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Resource configuration
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    /// Where and how the status document is stored
    pub s3: S3Config,

    /// Object key of the status document
    pub key: String,

    /// Version of the first build
    pub initial_version: Option<String>,

    /// Server-side encryption applied to writes
    pub encryption: Option<String>,

    /// Wait for the running build to finish before starting a new one
    pub require_ready: bool,

    /// Poll interval of the require-ready wait
    pub retry_after: Duration,
}

impl ResourceConfig {
    /// Creates configuration from a request's source block
    pub fn from_source(source: &Source) -> Result<Self> {
        match source.driver.as_str() {
            "" | "s3" => {}
            other => anyhow::bail!("unknown driver: {}", other),
        }

        let credentials = if source.use_iam_instance_profile {
            CredentialSource::instance_profile()
        } else if source.access_key_id.is_empty() && source.secret_access_key.is_empty() {
            CredentialSource::Anonymous
        } else {
            CredentialSource::Static(Credentials::new(
                &source.access_key_id,
                &source.secret_access_key,
                Some(source.session_token.clone()),
            ))
        };

        let mut s3 = S3Config::new(&source.bucket).with_credentials(credentials);
        if !source.region_name.is_empty() {
            s3.region = source.region_name.clone();
        }
        if !source.endpoint.is_empty() {
            s3.endpoint = Some(source.endpoint.clone());
        }
        s3.disable_ssl = source.disable_ssl;
        if source.use_v2_signing {
            s3.signature = SignatureVersion::V2;
        }

        let config = Self {
            s3,
            key: source.key.clone(),
            initial_version: source.initial_version().map(str::to_string),
            encryption: Some(source.server_side_encryption.clone()).filter(|e| !e.is_empty()),
            require_ready: source.require_ready,
            retry_after: parse_retry_after(&source.retry_after),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            anyhow::bail!("key cannot be empty");
        }

        self.s3.validate().context("invalid store configuration")?;
        Ok(())
    }

    /// Opens the configured store
    pub fn open_store(&self) -> Result<Arc<dyn Store>> {
        let store = S3Store::new(self.s3.clone()).context("constructing store")?;
        Ok(Arc::new(store))
    }

    /// Creates a driver bound to the configured key
    pub fn driver(&self, store: Arc<dyn Store>, identity: BuildIdentity) -> StatusDriver {
        StatusDriver::new(store, self.key.clone(), identity)
            .with_initial_version(self.initial_version.clone())
            .with_encryption(self.encryption.clone())
    }

    /// Region requests are signed for
    pub fn region(&self) -> &str {
        if self.s3.region.is_empty() {
            DEFAULT_REGION
        } else {
            &self.s3.region
        }
    }
}

/// Parses a duration such as "30s" or "1m", falling back to one minute
pub fn parse_retry_after(raw: &str) -> Duration {
    humantime::parse_duration(raw.trim())
        .ok()
        .filter(|d| !d.is_zero())
        .unwrap_or(DEFAULT_RETRY_AFTER)
}
