//! Request signing
//!
//! Implements the two AWS signature schemes understood by S3-compatible
//! servers. Both operate on already-canonical inputs: header names must be
//! lowercase and the URI path must already be percent-encoded.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::credentials::Credentials;
use crate::error::{Result, StoreError};

type HmacSha256 = Hmac<Sha256>;
type HmacSha1 = Hmac<Sha1>;

const V4_ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Timestamp layout of the `x-amz-date` header
pub const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Timestamp layout of the `Date` header used by Signature Version 2
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Hex-encoded SHA-256 of a payload, as sent in `x-amz-content-sha256`
pub fn payload_hash(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

/// Request components covered by a Signature Version 4 signature
#[derive(Debug, Clone)]
pub struct CanonicalRequest<'a> {
    pub method: &'a str,
    /// Percent-encoded absolute path, e.g. `/bucket/key`
    pub uri: &'a str,
    /// Lowercase header names with their values; must include `host`
    pub headers: &'a [(String, String)],
    pub payload_hash: &'a str,
}

impl CanonicalRequest<'_> {
    fn sorted_headers(&self) -> Vec<(&str, &str)> {
        let mut headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.trim()))
            .collect();
        headers.sort_by(|a, b| a.0.cmp(b.0));
        headers
    }

    /// Semicolon-separated list of signed header names
    pub fn signed_headers(&self) -> String {
        self.sorted_headers()
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Canonical request string; object requests never carry a query string
    pub fn to_canonical_string(&self) -> String {
        let canonical_headers: String = self
            .sorted_headers()
            .iter()
            .map(|(name, value)| format!("{}:{}\n", name, value))
            .collect();

        format!(
            "{}\n{}\n\n{}\n{}\n{}",
            self.method,
            self.uri,
            canonical_headers,
            self.signed_headers(),
            self.payload_hash
        )
    }
}

/// Signs a request with Signature Version 4 and returns the `Authorization` value
pub fn sign_v4(
    credentials: &Credentials,
    region: &str,
    service: &str,
    timestamp: DateTime<Utc>,
    request: &CanonicalRequest<'_>,
) -> Result<String> {
    let amz_date = timestamp.format(AMZ_DATE_FORMAT).to_string();
    let date = timestamp.format("%Y%m%d").to_string();
    let scope = format!("{}/{}/{}/aws4_request", date, region, service);

    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        V4_ALGORITHM,
        amz_date,
        scope,
        hex::encode(Sha256::digest(request.to_canonical_string().as_bytes()))
    );

    let key = signing_key(&credentials.secret_access_key, &date, region, service)?;
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

    Ok(format!(
        "{} Credential={}/{},SignedHeaders={},Signature={}",
        V4_ALGORITHM,
        credentials.access_key_id,
        scope,
        request.signed_headers(),
        signature
    ))
}

/// Derives the Signature Version 4 signing key for one day, region and service
pub fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Result<Vec<u8>> {
    let k_date = hmac_sha256(format!("AWS4{}", secret).as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

/// Request components covered by a Signature Version 2 signature
#[derive(Debug, Clone)]
pub struct LegacyRequest<'a> {
    pub method: &'a str,
    pub content_md5: &'a str,
    pub content_type: &'a str,
    /// Value of the `Date` header
    pub date: &'a str,
    /// Lowercase `x-amz-*` headers
    pub amz_headers: &'a [(String, String)],
    /// `/bucket/key`
    pub resource: &'a str,
}

impl LegacyRequest<'_> {
    pub fn string_to_sign(&self) -> String {
        let mut amz_headers: Vec<(&str, &str)> = self
            .amz_headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.trim()))
            .collect();
        amz_headers.sort_by(|a, b| a.0.cmp(b.0));

        let canonical_amz: String = amz_headers
            .iter()
            .map(|(name, value)| format!("{}:{}\n", name, value))
            .collect();

        format!(
            "{}\n{}\n{}\n{}\n{}{}",
            self.method,
            self.content_md5,
            self.content_type,
            self.date,
            canonical_amz,
            self.resource
        )
    }
}

/// Signs a request with Signature Version 2 and returns the `Authorization` value
pub fn sign_v2(credentials: &Credentials, request: &LegacyRequest<'_>) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(credentials.secret_access_key.as_bytes())
        .map_err(|e| StoreError::Signing(e.to_string()))?;
    mac.update(request.string_to_sign().as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    Ok(format!("AWS {}:{}", credentials.access_key_id, signature))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| StoreError::Signing(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}
