// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(clippy::must_use_candidate)]

//! Output file persistence.
//!
//! Output files are read concurrently by Headscale (records) and the HTTP
//! responder (hosts), so a reader must never observe a partially written
//! file. Content is fully rendered in memory, written to a temporary sibling
//! file, and renamed over the target.
//!
//! When the target is a bind-mounted single file the rename fails with
//! `EBUSY` or `EXDEV`; in that case the content is written to the target in a
//! single call instead.
//!
//! A SHA-256 checksum of every written payload is returned so cycles can log
//! whether the content Headscale will see actually changed.

use crate::constants::OUTPUT_FILE_MODE;
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Result of a successful output write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistOutcome {
    /// Destination path
    pub path: PathBuf,
    /// Bytes written
    pub bytes: usize,
    /// SHA-256 of the written content, lowercase hex
    pub checksum: String,
}

/// Calculate the SHA-256 checksum of `content` as lowercase hex.
///
/// # Example
///
/// ```rust
/// use headnscale::persist::content_checksum;
///
/// let checksum = content_checksum(b"[]");
/// assert_eq!(checksum.len(), 64);
/// ```
pub fn content_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Temporary sibling path used while replacing `path`.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Replace the contents of `path` with `content` without exposing a partial file.
///
/// # Errors
///
/// Returns an I/O error if neither the rename nor the direct write succeed.
/// The previous file is left untouched when the temporary file cannot be
/// written.
pub async fn write_atomic(path: &Path, content: &[u8]) -> io::Result<PersistOutcome> {
    let tmp = temp_path(path);

    discard_on_error(&tmp, stage(&tmp, content).await).await?;

    match tokio::fs::rename(&tmp, path).await {
        Ok(()) => {}
        Err(e) if matches!(e.kind(), io::ErrorKind::ResourceBusy | io::ErrorKind::CrossesDevices) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Rename over target not possible, writing in place"
            );
            let _ = tokio::fs::remove_file(&tmp).await;
            tokio::fs::write(path, content).await?;
        }
        Err(e) => return discard_on_error(&tmp, Err(e)).await,
    }

    let outcome = PersistOutcome {
        path: path.to_path_buf(),
        bytes: content.len(),
        checksum: content_checksum(content),
    };
    debug!(
        path = %outcome.path.display(),
        bytes = outcome.bytes,
        checksum = %outcome.checksum,
        "Wrote output file"
    );
    Ok(outcome)
}

/// Write `content` to the temporary file and apply the output mode.
async fn stage(tmp: &Path, content: &[u8]) -> io::Result<()> {
    tokio::fs::write(tmp, content).await?;
    set_mode(tmp).await
}

/// Remove the temporary file when `result` is an error, then pass it through.
async fn discard_on_error<T>(tmp: &Path, result: io::Result<T>) -> io::Result<T> {
    if result.is_err() {
        let _ = tokio::fs::remove_file(tmp).await;
    }
    result
}

#[cfg(unix)]
async fn set_mode(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(OUTPUT_FILE_MODE)).await
}

#[cfg(not(unix))]
async fn set_mode(_path: &Path) -> io::Result<()> {
    let _ = OUTPUT_FILE_MODE;
    Ok(())
}

#[cfg(test)]
#[path = "persist_tests.rs"]
mod persist_tests;
