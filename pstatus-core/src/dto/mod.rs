//! Data Transfer Objects for the resource protocol
//!
//! The orchestrator drives the resource through three JSON-over-stdio calls
//! (`check`, `in`, `out`). This module contains the request and response
//! shapes of those calls plus the shared source configuration.

pub mod check;
pub mod get;
pub mod put;
pub mod source;

use serde::{Deserialize, Serialize};

/// Version cursor exchanged with the orchestrator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    #[serde(default)]
    pub number: String,
}

impl Version {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
        }
    }
}

/// One name/value pair shown next to a version in the orchestrator UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataField {
    pub name: String,
    pub value: String,
}

pub type Metadata = Vec<MetadataField>;

/// Response of the `in` and `out` calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: Version,
    pub metadata: Metadata,
}

impl VersionResponse {
    /// Builds the response for a build number, echoing it as `number` metadata
    pub fn for_build(number: impl Into<String>) -> Self {
        let number = number.into();
        Self {
            metadata: vec![MetadataField {
                name: "number".to_string(),
                value: number.clone(),
            }],
            version: Version::new(number),
        }
    }
}
