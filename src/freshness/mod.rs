//! Artifact freshness: mtime comparison against source and dependency set.

pub mod deps;
pub mod mtime;

pub use deps::DependencyRegistry;

use crate::resolve::ResolvedTarget;
use mtime::{dominates, mtime};

/// Verdict on an existing (or absent) artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// No artifact on disk.
    Missing,
    /// Artifact exists but is older than its source or a known dependency,
    /// or the source has gone missing (the compile surfaces that as a
    /// compiler error, keeping error semantics in one place).
    Stale,
    /// Artifact mtime dominates the source and every known dependency.
    Fresh,
}

/// Decide whether `target`'s artifact can be served as-is.
///
/// Dependency awareness comes from `registry`, falling back to the artifact's
/// source map when one exists on disk. An artifact with no known dependency
/// set is judged on the primary source alone.
pub fn check(target: &ResolvedTarget, registry: &DependencyRegistry) -> Freshness {
    let Some(artifact_time) = mtime(&target.destination_file) else {
        return Freshness::Missing;
    };

    // A vanished source also fails domination: recompile and let the
    // compiler report it
    if !dominates(&target.destination_file, &target.source_file) {
        return Freshness::Stale;
    }

    let deps = registry.lookup(
        &target.destination_file,
        target.source_map_file.as_deref(),
    );
    if let Some(deps) = deps {
        for dep in &deps {
            if mtime(dep).is_some_and(|dep_time| dep_time > artifact_time) {
                return Freshness::Stale;
            }
        }
    }

    Freshness::Fresh
}
