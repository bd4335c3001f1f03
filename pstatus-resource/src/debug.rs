//! Request dumps
//!
//! With `source.debug` set, each command writes the request it received to a
//! temp file so a misbehaving pipeline can be inspected after the fact.
//! Secrets are blanked before anything touches the disk.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const REDACTED: &str = "<redacted>";
const SECRET_FIELDS: [&str; 2] = ["secret_access_key", "session_token"];

/// Dumps `request` to a new file in the system temp directory
///
/// Failures are logged and otherwise ignored; a dump never fails a command.
pub fn dump_request<T: Serialize>(prefix: &str, request: &T) -> Option<PathBuf> {
    dump_request_in(&std::env::temp_dir(), prefix, request)
}

/// Dumps `request` to a new file under `dir`
pub fn dump_request_in<T: Serialize>(dir: &Path, prefix: &str, request: &T) -> Option<PathBuf> {
    match write_dump(dir, prefix, request) {
        Ok(path) => {
            debug!("Request written to {}", path.display());
            Some(path)
        }
        Err(e) => {
            warn!("Failed to dump request: {:#}", e);
            None
        }
    }
}

fn write_dump<T: Serialize>(dir: &Path, prefix: &str, request: &T) -> Result<PathBuf> {
    let mut value = serde_json::to_value(request).context("serializing request")?;
    redact(&mut value);

    let mut file = tempfile::Builder::new()
        .prefix(prefix)
        .tempfile_in(dir)
        .context("creating dump file")?;
    serde_json::to_writer_pretty(&mut file, &value).context("writing dump file")?;
    file.flush().context("writing dump file")?;

    let (_, path) = file.keep().context("keeping dump file")?;
    Ok(path)
}

/// Blanks credentials in the request's source block
fn redact(request: &mut Value) {
    let Some(source) = request.get_mut("source").and_then(Value::as_object_mut) else {
        return;
    };

    for field in SECRET_FIELDS {
        if let Some(value) = source.get_mut(field) {
            if value.as_str().is_some_and(|s| !s.is_empty()) {
                *value = Value::String(REDACTED.to_string());
            }
        }
    }
}
