//! Pipeline Status Core
//!
//! Core types and pure logic for tracking a pipeline's build status.
//!
//! This crate contains:
//! - Domain types: the status document and its parts (PipelineStatus, BuildFailure, etc.)
//! - State machine: the transition function that advances a status snapshot
//! - Codec: the YAML document format stored in the object store
//! - DTOs: request/response shapes of the check/in/out resource protocol

pub mod codec;
pub mod domain;
pub mod dto;
pub mod state;
