//! Pipeline Status Store
//!
//! Narrow storage capability used to persist the status document.
//!
//! A store only needs two operations: fetch the bytes stored under a key and
//! overwrite them. Fetching a key that does not exist is not an error; it
//! yields `None`, which is how callers tell "never started" apart from
//! "backend unreachable".
//!
//! # Example
//!
//! ```no_run
//! use pstatus_store::{S3Config, S3Store, Store, WriteOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = S3Store::new(S3Config::new("status-bucket"))?;
//!
//!     store
//!         .write("pipelines/main", b"state: READY\n".to_vec(), &WriteOptions::default())
//!         .await?;
//!
//!     if let Some(bytes) = store.fetch("pipelines/main").await? {
//!         println!("{}", String::from_utf8_lossy(&bytes));
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod memory;
pub mod s3;
pub mod signing;

// Re-export commonly used types
pub use config::{S3Config, SignatureVersion};
pub use credentials::{CredentialSource, Credentials};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use s3::S3Store;

use async_trait::async_trait;

/// Options applied to a single write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Server-side encryption algorithm (e.g. "AES256"), if any
    pub encryption: Option<String>,
}

/// Key-value blob backend holding status documents
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetches the bytes stored under `key`
    ///
    /// Returns `Ok(None)` when the key does not exist.
    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Unconditionally overwrites the bytes stored under `key`
    async fn write(&self, key: &str, body: Vec<u8>, options: &WriteOptions) -> Result<()>;
}
