//! Compiler collaborator interface.
//!
//! The middleware never parses Sass itself; it hands a [`CompileRequest`] to
//! a [`Compiler`] and consumes the output. The default implementation is
//! [`GrassCompiler`], backed by the pure-Rust `grass` compiler.

mod backend;

pub use backend::GrassCompiler;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Stylesheet output style, passed through to the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    #[default]
    Expanded,
    Compressed,
}

/// A single compilation request.
///
/// Either `file` or `data` must be set; the middleware always compiles from
/// `file` so the on-disk source is the unit of freshness tracking.
#[derive(Debug, Clone, Default)]
pub struct CompileRequest {
    /// Entry source file.
    pub file: Option<PathBuf>,
    /// Inline source text (alternative to `file`).
    pub data: Option<String>,
    /// Additional import resolution roots.
    pub include_paths: Vec<PathBuf>,
    /// Treat input as indented (`.sass`) syntax.
    pub indented_syntax: bool,
    /// Emit a source map alongside the stylesheet.
    pub source_map: bool,
    /// Destination path, used for source map `file` references.
    pub out_file: Option<PathBuf>,
    pub output_style: OutputStyle,
}

/// Result of a successful compilation.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub css: Vec<u8>,
    /// Source map bytes, present when requested.
    pub map: Option<Vec<u8>>,
    /// Every file the compiler read, entry file first. This is the
    /// dependency set the freshness check compares against on later requests.
    pub included_files: Vec<PathBuf>,
}

/// Compiler-reported failure (syntax error, unresolvable import, missing
/// entry file). Recoverable per-request; carries the compiler's message.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
}

impl CompileError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// External compiler boundary.
pub trait Compiler: Send + Sync {
    fn compile(&self, request: &CompileRequest) -> Result<CompileOutput, CompileError>;
}

// ============================================================================
// Source map
// ============================================================================

/// Minimal v3 source map: enough to round-trip the dependency set through a
/// `.css.map` sibling. No `mappings` are produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMap {
    pub version: u32,
    pub file: String,
    pub sources: Vec<String>,
}

impl SourceMap {
    /// Build a map for `out_file`, with sources written relative to its
    /// parent directory where possible.
    pub fn new(out_file: &Path, sources: &[PathBuf]) -> Self {
        let parent = out_file.parent();
        let sources = sources
            .iter()
            .map(|source| {
                let relative = parent.and_then(|dir| source.strip_prefix(dir).ok());
                relative.unwrap_or(source).display().to_string()
            })
            .collect();

        Self {
            version: 3,
            file: out_file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            sources,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        // Plain struct of strings; serialization cannot fail
        serde_json::to_vec(self).expect("source map serialization")
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok()
    }

    /// Resolve `sources` to absolute paths, relative entries joined onto the
    /// map file's directory.
    pub fn resolved_sources(&self, map_file: &Path) -> Vec<PathBuf> {
        let parent = map_file.parent();
        self.sources
            .iter()
            .map(|source| {
                let path = Path::new(source);
                if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    parent.map_or_else(|| path.to_path_buf(), |dir| dir.join(path))
                }
            })
            .collect()
    }
}
