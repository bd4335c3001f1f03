//! Core domain types
//!
//! This module contains the entities persisted in the status document and the
//! ordering rule used to compare build versions. They are shared between the
//! driver (which mutates them) and the resource adapter (which reports them).

pub mod status;
pub mod version;
