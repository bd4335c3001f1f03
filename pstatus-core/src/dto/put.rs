//! `out` call DTOs

use serde::{Deserialize, Serialize};
use std::fmt;

use super::source::Source;

/// Request to apply a state-changing action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutRequest {
    #[serde(default)]
    pub source: Source,
    pub params: OutParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutParams {
    pub action: StatusAction,
}

/// Action requested by an `out` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusAction {
    Start,
    Finish,
    Fail,
}

impl StatusAction {
    /// Progressive form used in error messages ("starting pipeline")
    pub fn verb(&self) -> &'static str {
        match self {
            StatusAction::Start => "starting",
            StatusAction::Finish => "finishing",
            StatusAction::Fail => "failing",
        }
    }
}

impl fmt::Display for StatusAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusAction::Start => "start",
            StatusAction::Finish => "finish",
            StatusAction::Fail => "fail",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actions() {
        for (raw, expected) in [
            ("start", StatusAction::Start),
            ("finish", StatusAction::Finish),
            ("fail", StatusAction::Fail),
        ] {
            let request: OutRequest =
                serde_json::from_value(serde_json::json!({"params": {"action": raw}})).unwrap();
            assert_eq!(request.params.action, expected);
            assert_eq!(expected.to_string(), raw);
        }
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result: Result<OutRequest, _> =
            serde_json::from_value(serde_json::json!({"params": {"action": "pause"}}));
        assert!(result.is_err());
    }
}
