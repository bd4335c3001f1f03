//! Pipeline status domain types

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current status of one pipeline
///
/// Exactly one of these documents exists per store key. There is no history:
/// every transition overwrites the previous snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStatus {
    #[serde(default)]
    pub pipeline: String,
    #[serde(default)]
    pub team: String,
    /// Decimal build counter, incremented on every transition into RUNNING
    #[serde(rename = "build", default, deserialize_with = "scalar_string")]
    pub build_number: String,
    /// ISO-8601 timestamp with numeric offset, e.g. `2006-01-02T15:04:05-0700`
    #[serde(default, deserialize_with = "scalar_string")]
    pub last_modified: String,
    #[serde(default)]
    pub state: PipelineState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<BuildFailure>,
}

impl PipelineStatus {
    /// Creates the status a pipeline has before its first build ever started
    pub fn initial(
        pipeline: impl Into<String>,
        team: impl Into<String>,
        build_number: impl Into<String>,
    ) -> Self {
        Self {
            pipeline: pipeline.into(),
            team: team.into(),
            build_number: build_number.into(),
            ..Self::default()
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == PipelineState::Ready
    }

    pub fn is_running(&self) -> bool {
        self.state == PipelineState::Running
    }
}

/// Build state recorded in the status document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineState {
    /// No build has ever been started
    #[default]
    #[serde(rename = "")]
    Unset,
    #[serde(rename = "RUNNING")]
    Running,
    #[serde(rename = "READY")]
    Ready,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Unset => "",
            PipelineState::Running => "RUNNING",
            PipelineState::Ready => "READY",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure attached to a status by a `fail` action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildFailure {
    #[serde(rename = "job", default)]
    pub job_name: String,
    #[serde(rename = "build", default, deserialize_with = "scalar_string")]
    pub build_name: String,
    #[serde(rename = "details", default)]
    pub details_url: String,
}

/// Accepts any YAML scalar as a string.
///
/// Hand-edited documents often carry `build: 3` instead of `build: "3"`.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct ScalarVisitor;

    impl<'de> Visitor<'de> for ScalarVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(ScalarVisitor)
}
