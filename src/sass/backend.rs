//! Sass compilation via [`grass`].
//!
//! Dependency capture: grass resolves every import through its `Fs` trait, so
//! a recording wrapper around [`grass::StdFs`] observes the full set of files
//! read during a compile, including the entry file and transitive partials.

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

use super::{CompileError, CompileOutput, CompileRequest, Compiler, OutputStyle, SourceMap};

/// Default [`Compiler`] backed by the pure-Rust grass compiler.
#[derive(Debug, Default)]
pub struct GrassCompiler;

/// Filesystem shim that records every path grass reads.
#[derive(Debug, Default)]
struct RecordingFs {
    seen: Mutex<Vec<PathBuf>>,
}

impl grass::Fs for RecordingFs {
    fn is_dir(&self, path: &Path) -> bool {
        grass::StdFs.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        grass::StdFs.is_file(path)
    }

    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        self.seen.lock().push(path.to_path_buf());
        grass::StdFs.read(path)
    }
}

impl RecordingFs {
    /// Recorded reads, deduplicated in first-seen order.
    fn into_included_files(self) -> Vec<PathBuf> {
        let mut unique = FxHashSet::default();
        self.seen
            .into_inner()
            .into_iter()
            .filter(|path| unique.insert(path.clone()))
            .collect()
    }
}

impl Compiler for GrassCompiler {
    fn compile(&self, request: &CompileRequest) -> Result<CompileOutput, CompileError> {
        let fs = RecordingFs::default();

        let mut options = grass::Options::default().fs(&fs).style(match request.output_style {
            OutputStyle::Expanded => grass::OutputStyle::Expanded,
            OutputStyle::Compressed => grass::OutputStyle::Compressed,
        });
        if request.indented_syntax {
            options = options.input_syntax(grass::InputSyntax::Sass);
        }
        for path in &request.include_paths {
            options = options.load_path(path);
        }

        let css = match (&request.file, &request.data) {
            (Some(file), _) => grass::from_path(file, &options),
            (None, Some(data)) => grass::from_string(data.clone(), &options),
            (None, None) => return Err(CompileError::new("no input: file or data required")),
        }
        .map_err(|error| CompileError::new(error.to_string()))?;
        drop(options); // releases the borrow on `fs`

        let mut included_files = fs.into_included_files();
        // Entry file heads the list even when grass sourced it another way
        if let Some(file) = &request.file
            && !included_files.contains(file)
        {
            included_files.insert(0, file.clone());
        }

        let map = (request.source_map && request.out_file.is_some()).then(|| {
            let out_file = request.out_file.as_deref().unwrap_or(Path::new(""));
            SourceMap::new(out_file, &included_files).to_bytes()
        });

        Ok(CompileOutput {
            css: css.into_bytes(),
            map,
            included_files,
        })
    }
}
