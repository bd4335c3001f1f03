//! Status document codec
//!
//! The status is stored as a small YAML document:
//!
//! ```yaml
//! pipeline: my-pipeline
//! team: main
//! build: '42'
//! last_modified: 2006-01-02T15:04:05-0700
//! state: READY
//! ```

use thiserror::Error;

use crate::domain::status::PipelineStatus;

pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors raised while reading or writing a status document
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid status document: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Serializes a status into its stored document form
pub fn encode(status: &PipelineStatus) -> Result<Vec<u8>> {
    Ok(serde_yaml::to_string(status)?.into_bytes())
}

/// Parses a stored document. An empty document reads as the default status.
pub fn decode(bytes: &[u8]) -> Result<PipelineStatus> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(PipelineStatus::default());
    }
    Ok(serde_yaml::from_slice(bytes)?)
}
