//! Pipeline Status Resource
//!
//! Adapter between the CI orchestrator's resource protocol and the status
//! driver. Each protocol call reads one JSON request from stdin and writes
//! one JSON response to stdout:
//!
//! - `check`: report the latest READY build
//! - `in <destination>`: write the status document to `<destination>/status`
//! - `out <source>`: apply `start`, `finish` or `fail`
//!
//! Configuration arrives in the request's `source` block; the identity of
//! the calling build comes from the environment.

pub mod commands;
pub mod config;
pub mod debug;
pub mod wait;
