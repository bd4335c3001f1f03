//! Credential resolution
//!
//! Requests are signed with static keys, with temporary keys taken from the
//! EC2 instance metadata service, or not signed at all.

use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use tracing::debug;

use crate::error::{Result, StoreError};

/// Default address of the EC2 instance metadata service
pub const INSTANCE_METADATA_ENDPOINT: &str = "http://169.254.169.254";

const TOKEN_TTL_HEADER: &str = "x-aws-ec2-metadata-token-ttl-seconds";
const TOKEN_HEADER: &str = "x-aws-ec2-metadata-token";
const TOKEN_TTL_SECONDS: &str = "21600";

/// Access keys used to sign requests
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: session_token.filter(|t| !t.is_empty()),
        }
    }
}

// Keep secrets out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Where credentials come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Unsigned requests
    Anonymous,
    /// Fixed keys from configuration
    Static(Credentials),
    /// Role credentials from the instance metadata service at `endpoint`
    InstanceProfile { endpoint: String },
}

impl CredentialSource {
    /// Instance profile credentials from the default metadata endpoint
    pub fn instance_profile() -> Self {
        Self::InstanceProfile {
            endpoint: INSTANCE_METADATA_ENDPOINT.to_string(),
        }
    }

    /// Resolves the source into concrete credentials; `None` means anonymous
    pub async fn resolve(&self, client: &Client) -> Result<Option<Credentials>> {
        match self {
            Self::Anonymous => Ok(None),
            Self::Static(credentials) => Ok(Some(credentials.clone())),
            Self::InstanceProfile { endpoint } => {
                let metadata = InstanceMetadata::new(client.clone(), endpoint);
                metadata.fetch_credentials().await.map(Some)
            }
        }
    }
}

/// Role credentials document served by the metadata service
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RoleCredentials {
    access_key_id: String,
    secret_access_key: String,
    #[serde(default)]
    token: Option<String>,
}

/// Client for the EC2 instance metadata service
#[derive(Debug, Clone)]
pub struct InstanceMetadata {
    client: Client,
    endpoint: String,
}

impl InstanceMetadata {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Fetches the credentials of the first role attached to the instance
    pub async fn fetch_credentials(&self) -> Result<Credentials> {
        let token = self.session_token().await;

        let roles_url = format!(
            "{}/latest/meta-data/iam/security-credentials/",
            self.endpoint
        );
        let roles = self.get_text(&roles_url, token.as_deref()).await?;
        let role = roles
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| {
                StoreError::Credentials("no IAM role attached to instance".to_string())
            })?;

        debug!("Fetching instance profile credentials for role {}", role);

        let body = self
            .get_text(&format!("{}{}", roles_url, role), token.as_deref())
            .await?;
        let credentials: RoleCredentials = serde_json::from_str(&body).map_err(|e| {
            StoreError::Credentials(format!("invalid credentials document: {}", e))
        })?;

        Ok(Credentials::new(
            credentials.access_key_id,
            credentials.secret_access_key,
            credentials.token,
        ))
    }

    /// Requests an IMDSv2 session token; `None` falls back to IMDSv1
    async fn session_token(&self) -> Option<String> {
        let url = format!("{}/latest/api/token", self.endpoint);
        let response = self
            .client
            .put(&url)
            .header(TOKEN_TTL_HEADER, TOKEN_TTL_SECONDS)
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            debug!(
                "Metadata token request returned {}, using IMDSv1",
                response.status()
            );
            return None;
        }

        response.text().await.ok()
    }

    async fn get_text(&self, url: &str, token: Option<&str>) -> Result<String> {
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.header(TOKEN_HEADER, token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Credentials(format!(
                "metadata request to {} failed with status {}: {}",
                url, status, body
            )));
        }

        Ok(response.text().await?)
    }
}
