//! S3 store
//!
//! Stores each document as one object under `{endpoint}/{bucket}/{key}`
//! (path-style addressing, which also works for S3-compatible servers).

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Method, Response, StatusCode};
use tokio::sync::OnceCell;
use tracing::{debug, warn};
use url::Url;

use crate::config::{S3Config, SignatureVersion};
use crate::credentials::Credentials;
use crate::error::{Result, StoreError};
use crate::signing::{self, AMZ_DATE_FORMAT, CanonicalRequest, HTTP_DATE_FORMAT, LegacyRequest};
use crate::{Store, WriteOptions};

const CONTENT_TYPE: &str = "text/plain";
const MAX_RETRY_DELAY_MS: u64 = 20_000;

/// Store backed by an S3 bucket
#[derive(Debug)]
pub struct S3Store {
    config: S3Config,
    endpoint: Url,
    client: Client,
    credentials: OnceCell<Option<Credentials>>,
}

impl S3Store {
    /// Create a new S3 store
    pub fn new(config: S3Config) -> Result<Self> {
        Self::with_client(config, Client::new())
    }

    /// Create a new S3 store with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(config: S3Config, client: Client) -> Result<Self> {
        config.validate()?;
        let endpoint = config.endpoint_url()?;

        Ok(Self {
            config,
            endpoint,
            client,
            credentials: OnceCell::new(),
        })
    }

    /// Bucket this store reads from and writes to
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// URL of the object stored under `key`
    pub fn object_url(&self, key: &str) -> Result<Url> {
        let path = format!(
            "{}/{}/{}",
            self.endpoint.path().trim_end_matches('/'),
            urlencoding::encode(&self.config.bucket),
            encode_key(key)
        );

        let mut url = self.endpoint.clone();
        url.set_path(&path);
        Ok(url)
    }

    async fn credentials(&self) -> Result<Option<&Credentials>> {
        let credentials = self
            .credentials
            .get_or_try_init(|| self.config.credentials.resolve(&self.client))
            .await?;
        Ok(credentials.as_ref())
    }

    // =============================================================================
    // Request Execution
    // =============================================================================

    /// Sends a request, retrying transport failures, throttling and 5xx responses
    ///
    /// A 404 is returned to the caller as a response, never retried.
    async fn send(
        &self,
        method: Method,
        key: &str,
        body: Option<&[u8]>,
        amz_headers: &[(String, String)],
    ) -> Result<Response> {
        let mut attempt = 0;
        let mut delay_ms = self.config.retry_delay.as_millis() as u64;

        loop {
            let result = match self.send_once(method.clone(), key, body, amz_headers).await {
                Ok(response) if should_retry(response.status()) => {
                    let status = response.status().as_u16();
                    let message = response.text().await.unwrap_or_default();
                    Err(StoreError::api_error(status, message))
                }
                other => other,
            };

            match result {
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(
                        "{} {} failed (attempt {}/{}): {}",
                        method, key, attempt, self.config.max_retries, e
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                    delay_ms = (delay_ms * 2).min(MAX_RETRY_DELAY_MS);
                }
                other => return other,
            }
        }
    }

    async fn send_once(
        &self,
        method: Method,
        key: &str,
        body: Option<&[u8]>,
        amz_headers: &[(String, String)],
    ) -> Result<Response> {
        let url = self.object_url(key)?;
        let payload = body.unwrap_or_default();
        let content_type = if body.is_some() { CONTENT_TYPE } else { "" };

        let mut headers: Vec<(String, String)> = amz_headers.to_vec();
        let credentials = self.credentials().await?;

        if let Some(token) = credentials.and_then(|c| c.session_token.as_ref()) {
            headers.push(("x-amz-security-token".to_string(), token.clone()));
        }

        let now = Utc::now();
        let authorization = match (credentials, self.config.signature) {
            (None, _) => None,
            (Some(credentials), SignatureVersion::V4) => {
                let hash = signing::payload_hash(payload);
                headers.push(("x-amz-content-sha256".to_string(), hash.clone()));
                headers.push(("x-amz-date".to_string(), now.format(AMZ_DATE_FORMAT).to_string()));

                let mut signed = headers.clone();
                signed.push(("host".to_string(), host_header(&url)?));

                let request = CanonicalRequest {
                    method: method.as_str(),
                    uri: url.path(),
                    headers: &signed,
                    payload_hash: &hash,
                };
                Some(signing::sign_v4(
                    credentials,
                    &self.config.region,
                    "s3",
                    now,
                    &request,
                )?)
            }
            (Some(credentials), SignatureVersion::V2) => {
                let date = now.format(HTTP_DATE_FORMAT).to_string();
                let resource = url.path().to_string();
                let request = LegacyRequest {
                    method: method.as_str(),
                    content_md5: "",
                    content_type,
                    date: &date,
                    amz_headers: &headers,
                    resource: &resource,
                };
                let authorization = signing::sign_v2(credentials, &request)?;
                headers.push(("date".to_string(), date));
                Some(authorization)
            }
        };

        debug!("{} {}", method, url);

        let mut request = self.client.request(method, url);
        for (name, value) in &headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(authorization) = authorization {
            request = request.header("authorization", authorization);
        }
        if let Some(body) = body {
            request = request
                .header("content-type", content_type)
                .body(body.to_vec());
        }

        Ok(request.send().await?)
    }
}

#[async_trait]
impl Store for S3Store {
    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let response = self.send(Method::GET, key, None, &[]).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!("Object {}/{} does not exist", self.config.bucket, key);
            return Ok(None);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::api_error(status.as_u16(), message));
        }

        Ok(Some(response.bytes().await?.to_vec()))
    }

    async fn write(&self, key: &str, body: Vec<u8>, options: &WriteOptions) -> Result<()> {
        let mut amz_headers = vec![("x-amz-acl".to_string(), "private".to_string())];
        if let Some(encryption) = options.encryption.as_deref().filter(|e| !e.is_empty()) {
            amz_headers.push((
                "x-amz-server-side-encryption".to_string(),
                encryption.to_string(),
            ));
        }

        let response = self
            .send(Method::PUT, key, Some(&body), &amz_headers)
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::api_error(status.as_u16(), message));
        }

        debug!(
            "Wrote {} bytes to {}/{}",
            body.len(),
            self.config.bucket,
            key
        );
        Ok(())
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Percent-encodes every segment of an object key, keeping the separators
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Value of the `Host` header the HTTP client will send for `url`
fn host_header(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| StoreError::InvalidConfig(format!("endpoint {} has no host", url)))?;

    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
