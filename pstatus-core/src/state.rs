//! Status state machine
//!
//! Pure transition function that computes the next status snapshot from the
//! current one. Transitions never fail: a malformed build number is read as 0.

use chrono::{DateTime, FixedOffset, Local};

use crate::domain::status::{BuildFailure, PipelineState, PipelineStatus};

/// Timestamp layout of `last_modified`, e.g. `2006-01-02T15:04:05-0700`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// State a transition can move a pipeline into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Running,
    Ready,
}

impl From<TargetState> for PipelineState {
    fn from(target: TargetState) -> Self {
        match target {
            TargetState::Running => PipelineState::Running,
            TargetState::Ready => PipelineState::Ready,
        }
    }
}

/// Computes the status after moving `current` into `target`, stamped with the local time
pub fn transition(
    current: &PipelineStatus,
    target: TargetState,
    failure: Option<BuildFailure>,
) -> PipelineStatus {
    transition_at(current, target, failure, Local::now().fixed_offset())
}

/// Computes the status after moving `current` into `target` at `now`
///
/// - Into RUNNING: increments the build number and clears any failure.
/// - Into READY: attaches `failure` and keeps the build number.
/// - Into the state already held: returns an unmodified copy.
pub fn transition_at(
    current: &PipelineStatus,
    target: TargetState,
    failure: Option<BuildFailure>,
    now: DateTime<FixedOffset>,
) -> PipelineStatus {
    let mut next = current.clone();

    if current.state == PipelineState::from(target) {
        return next;
    }

    match target {
        TargetState::Running => {
            next.build_number = next_build_number(&current.build_number);
            next.failure = None;
        }
        TargetState::Ready => {
            next.failure = failure;
        }
    }

    next.state = target.into();
    next.last_modified = now.format(TIMESTAMP_FORMAT).to_string();
    next
}

fn next_build_number(current: &str) -> String {
    let number = current.parse::<i64>().unwrap_or(0);
    number.saturating_add(1).to_string()
}
