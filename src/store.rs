//! Durable artifact writes and read-back.
//!
//! Writes are whole-file replacements via write-to-temp-then-rename in the
//! destination directory, so a concurrent reader never observes a truncated
//! artifact with a fresh mtime. A failed write leaves any previous artifact
//! untouched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Atomically replace `destination` with `bytes`, creating parent
/// directories as needed.
pub fn write_artifact(destination: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp = temp_sibling(destination);
    fs::write(&temp, bytes)?;
    if let Err(e) = fs::rename(&temp, destination) {
        let _ = fs::remove_file(&temp);
        return Err(e);
    }
    Ok(())
}

/// Read an artifact back for serving.
pub fn read_artifact(destination: &Path) -> io::Result<Vec<u8>> {
    fs::read(destination)
}

/// Unique sibling path in the destination directory (rename stays on one
/// filesystem).
fn temp_sibling(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    destination.with_file_name(format!(".{name}.{}.{seq}.tmp", std::process::id()))
}
