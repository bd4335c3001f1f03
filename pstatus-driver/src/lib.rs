//! Pipeline Status Driver
//!
//! Implements the status operations on top of a [`Store`]:
//! - `check`: report the current READY build as a new version
//! - `start`: move the pipeline into RUNNING, incrementing the build number
//! - `finish` / `fail`: move the pipeline into READY, optionally with a failure
//!
//! A driver is bound to one store key. All coordination between concurrent
//! invocations happens through that key; writes are unconditional overwrites,
//! so two processes racing on the same key can lose an increment (the last
//! writer wins).
//!
//! [`Store`]: pstatus_store::Store

pub mod driver;
pub mod error;
pub mod identity;

// Re-export commonly used types
pub use driver::{DEFAULT_INITIAL_VERSION, StatusDriver};
pub use error::{DriverError, IdentityField, Result};
pub use identity::BuildIdentity;
