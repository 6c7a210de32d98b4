//! Dependency sets per compiled artifact.
//!
//! Each artifact remembers the files its compile read (entry source plus
//! transitive imports). The registry is in-memory, per mount, and populated
//! on every compile; with source maps enabled, a set can also be recovered
//! from an artifact's `.css.map` sibling written by an earlier process.
//!
//! The registry is lost on restart. When no map exists either, the first
//! post-restart freshness check runs without dependency awareness and may
//! accept an artifact whose imports changed; the next compile repopulates the
//! registry.

use dashmap::DashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::sass::SourceMap;

/// Destination path -> dependency set.
#[derive(Debug, Default)]
pub struct DependencyRegistry {
    deps: DashMap<PathBuf, Vec<PathBuf>>,
}

impl DependencyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the dependency set for an artifact, superseding any prior one.
    pub fn record(&self, destination: &Path, dependencies: Vec<PathBuf>) {
        self.deps.insert(destination.to_path_buf(), dependencies);
    }

    pub fn get(&self, destination: &Path) -> Option<Vec<PathBuf>> {
        self.deps.get(destination).map(|entry| entry.clone())
    }

    /// Dependency set for `destination`, consulting the in-memory registry
    /// first and falling back to `map_file` recovery. A recovered set is
    /// cached so the map is parsed once.
    pub fn lookup(&self, destination: &Path, map_file: Option<&Path>) -> Option<Vec<PathBuf>> {
        if let Some(deps) = self.get(destination) {
            return Some(deps);
        }
        let recovered = recover_from_map(map_file?)?;
        self.record(destination, recovered.clone());
        Some(recovered)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.deps.len()
    }
}

/// Parse the `sources` list out of an existing source map.
fn recover_from_map(map_file: &Path) -> Option<Vec<PathBuf>> {
    let bytes = fs::read(map_file).ok()?;
    let map = SourceMap::from_bytes(&bytes)?;
    Some(map.resolved_sources(map_file))
}
