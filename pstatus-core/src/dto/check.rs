//! `check` call DTOs

use serde::{Deserialize, Serialize};

use super::Version;
use super::source::Source;

/// Request to list versions newer than the cursor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub source: Source,
    /// Absent (or null) on the very first check of a resource
    #[serde(default)]
    pub version: Option<Version>,
}

impl CheckRequest {
    /// Cursor supplied by the orchestrator, empty when there is none
    pub fn cursor(&self) -> &str {
        self.version.as_ref().map_or("", |v| v.number.as_str())
    }
}

/// Versions reported by `check`, oldest first
pub type CheckResponse = Vec<Version>;
