//! S3 store configuration
//!
//! Defines where the bucket lives, how requests are authenticated and how
//! transport failures are retried.

use std::time::Duration;
use url::Url;

use crate::credentials::CredentialSource;
use crate::error::{Result, StoreError};

/// Region used when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Signature scheme used to authenticate requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureVersion {
    /// AWS Signature Version 4
    #[default]
    V4,
    /// Legacy AWS Signature Version 2, for older S3-compatible servers
    V2,
}

/// S3 store configuration
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Bucket holding the status documents
    pub bucket: String,

    /// Region used for signing and for the default endpoint
    pub region: String,

    /// Custom endpoint (e.g. "minio.local:9000" or "https://storage.example.com")
    pub endpoint: Option<String>,

    /// Use plain HTTP for the default endpoint and scheme-less custom endpoints
    pub disable_ssl: bool,

    /// How credentials are obtained
    pub credentials: CredentialSource,

    /// Signature scheme
    pub signature: SignatureVersion,

    /// How many times a failed request is retried
    pub max_retries: u32,

    /// Delay before the first retry; doubled on every further attempt
    pub retry_delay: Duration,
}

impl S3Config {
    /// Creates a configuration for `bucket` with defaults
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            disable_ssl: false,
            credentials: CredentialSource::Anonymous,
            signature: SignatureVersion::V4,
            max_retries: 12,
            retry_delay: Duration::from_millis(200),
        }
    }

    /// Base URL requests are sent to; objects live under `{base}/{bucket}/{key}`
    pub fn endpoint_url(&self) -> Result<Url> {
        let scheme = if self.disable_ssl { "http" } else { "https" };

        let raw = match self.endpoint.as_deref().filter(|e| !e.is_empty()) {
            Some(endpoint) if endpoint.contains("://") => endpoint.to_string(),
            Some(endpoint) => format!("{}://{}", scheme, endpoint),
            None if self.region == DEFAULT_REGION => format!("{}://s3.amazonaws.com", scheme),
            None => format!("{}://s3.{}.amazonaws.com", scheme, self.region),
        };

        Ok(Url::parse(&raw)?)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.bucket.is_empty() {
            return Err(StoreError::InvalidConfig(
                "bucket cannot be empty".to_string(),
            ));
        }

        if self.region.is_empty() {
            return Err(StoreError::InvalidConfig(
                "region cannot be empty".to_string(),
            ));
        }

        if let CredentialSource::Static(credentials) = &self.credentials {
            if credentials.access_key_id.is_empty() || credentials.secret_access_key.is_empty() {
                return Err(StoreError::InvalidConfig(
                    "both access_key_id and secret_access_key are required".to_string(),
                ));
            }
        }

        self.endpoint_url()?;
        Ok(())
    }

    /// Sets a custom endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the credential source
    pub fn with_credentials(mut self, credentials: CredentialSource) -> Self {
        self.credentials = credentials;
        self
    }
}
