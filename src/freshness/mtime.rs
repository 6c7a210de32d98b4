//! Modification time probes.
//!
//! Mtime comparison is the only freshness signal available before a compile
//! runs; sub-clock-tick races are an accepted limitation of the approach.

use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;

/// Get the modification time of a file.
///
/// Returns `None` when the file does not exist or its mtime cannot be read.
/// A stat failure that is not a definitive "not there" is retried once before
/// giving up, so a transient hiccup does not force a spurious recompile.
pub fn mtime(path: &Path) -> Option<SystemTime> {
    match path.metadata() {
        Ok(meta) => meta.modified().ok(),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(_) => path.metadata().ok().and_then(|meta| meta.modified().ok()),
    }
}

/// Check whether `output` is at least as new as `reference`.
///
/// Returns `false` when either file is missing or unreadable.
pub fn dominates(output: &Path, reference: &Path) -> bool {
    let (Some(output_time), Some(reference_time)) = (mtime(output), mtime(reference)) else {
        return false;
    };
    output_time >= reference_time
}
