//! Resource source configuration
//!
//! Field names follow the resource's public configuration keys. Every field
//! is optional; unknown keys are ignored.

use serde::{Deserialize, Serialize};

/// Configuration block shared by every protocol call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Source {
    /// Boolean as a string ("true", "1", ...)
    pub debug: String,
    /// Storage backend; only "s3" (or empty) is supported
    pub driver: String,
    pub initial_version: String,
    pub require_ready: bool,
    /// Poll interval while waiting for READY, e.g. "30s" or "1m"
    pub retry_after: String,

    pub bucket: String,
    pub key: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub use_iam_instance_profile: bool,
    pub region_name: String,
    pub endpoint: String,
    pub disable_ssl: bool,
    pub server_side_encryption: String,
    pub use_v2_signing: bool,
}

impl Source {
    /// Whether debug output was requested; unparsable values mean false
    pub fn is_debug(&self) -> bool {
        matches!(
            self.debug.as_str(),
            "1" | "t" | "T" | "true" | "TRUE" | "True"
        )
    }

    /// Initial version, if one was configured
    pub fn initial_version(&self) -> Option<&str> {
        Some(self.initial_version.as_str()).filter(|v| !v.is_empty())
    }
}
