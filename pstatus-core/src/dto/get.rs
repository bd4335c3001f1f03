//! `in` call DTOs

use serde::{Deserialize, Serialize};

use super::Version;
use super::source::Source;

/// Request to fetch a version into a destination directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InRequest {
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub version: Option<Version>,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl InRequest {
    /// Version number the orchestrator asked for, empty when absent
    pub fn requested_version(&self) -> &str {
        self.version.as_ref().map_or("", |v| v.number.as_str())
    }
}
