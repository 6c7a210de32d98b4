//! Mount configuration.
//!
//! [`Options`] is the public option bag (every recognized field enumerated,
//! no dynamic extras); [`MountConfig`] is the resolved, immutable form built
//! once at construction. Resolution makes both directory roots absolute and
//! rejects a missing `src`.

mod error;

pub use error::ConfigError;

use crate::logger::{LogFn, LogSink};
use crate::sass::OutputStyle;
use std::path::{Path, PathBuf};

/// Recognized mount options.
#[derive(Clone, Default)]
pub struct Options {
    /// Source directory root (required).
    pub src: Option<PathBuf>,
    /// Destination directory root; defaults to `src`.
    pub dest: Option<PathBuf>,
    /// URL prefix stripped before resolution, e.g. `/css`.
    pub prefix: Option<String>,
    /// Verbose logging of skip/render decisions.
    pub debug: bool,
    /// Serve the compiled body; `false` persists to disk only and defers the
    /// response to the next handler (e.g. a static file server).
    pub response: Option<bool>,
    pub output_style: OutputStyle,
    /// Treat sources as indented (`.sass`) syntax.
    pub indented_syntax: bool,
    /// Emit a `<name>.css.map` sibling next to each artifact.
    pub source_map: bool,
    /// `Cache-Control: max-age=<seconds>` on served responses.
    pub max_age: Option<u64>,
    /// Log callback; replaces the default stderr line.
    pub log: Option<LogFn>,
}

/// Resolved mount configuration, immutable for the mount's lifetime.
#[derive(Debug, Clone)]
pub struct MountConfig {
    pub src: PathBuf,
    pub dest: PathBuf,
    pub prefix: Option<String>,
    pub response: bool,
    pub output_style: OutputStyle,
    pub indented_syntax: bool,
    pub source_map: bool,
    pub max_age: Option<u64>,
    pub(crate) log: LogSink,
}

impl MountConfig {
    /// Resolve an option bag. Fails when `src` is omitted.
    pub fn resolve(options: Options) -> Result<Self, ConfigError> {
        let src = options.src.ok_or(ConfigError::MissingSrc)?;
        let src = absolutize(&src);
        let dest = options.dest.map_or_else(|| src.clone(), |d| absolutize(&d));

        if let Some(prefix) = &options.prefix
            && !prefix.starts_with('/')
        {
            return Err(ConfigError::BadPrefix(prefix.clone()));
        }

        Ok(Self {
            src,
            dest,
            prefix: options.prefix,
            response: options.response.unwrap_or(true),
            output_style: options.output_style,
            indented_syntax: options.indented_syntax,
            source_map: options.source_map,
            max_age: options.max_age,
            log: LogSink::new(options.log, options.debug),
        })
    }

    /// Source file extension implied by the syntax flag.
    pub fn source_extension(&self) -> &'static str {
        if self.indented_syntax { "sass" } else { "scss" }
    }
}

/// Normalize a path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`); a path that
/// does not exist yet falls back to joining onto the current directory.
fn absolutize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitting_src_fails_construction() {
        let err = MountConfig::resolve(Options::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSrc));
    }

    #[test]
    fn dest_defaults_to_src() {
        let config = MountConfig::resolve(Options {
            src: Some("/styles".into()),
            ..Options::default()
        })
        .unwrap();
        assert_eq!(config.dest, config.src);
        assert!(config.response, "response defaults to true");
    }

    #[test]
    fn roots_become_absolute() {
        let config = MountConfig::resolve(Options {
            src: Some("relative/styles".into()),
            dest: Some("relative/out".into()),
            ..Options::default()
        })
        .unwrap();
        assert!(config.src.is_absolute());
        assert!(config.dest.is_absolute());
    }

    #[test]
    fn prefix_must_be_rooted() {
        let err = MountConfig::resolve(Options {
            src: Some("/styles".into()),
            prefix: Some("css".into()),
            ..Options::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::BadPrefix(_)));
    }

    #[test]
    fn syntax_flag_picks_source_extension() {
        let scss = MountConfig::resolve(Options {
            src: Some("/styles".into()),
            ..Options::default()
        })
        .unwrap();
        assert_eq!(scss.source_extension(), "scss");

        let sass = MountConfig::resolve(Options {
            src: Some("/styles".into()),
            indented_syntax: true,
            ..Options::default()
        })
        .unwrap();
        assert_eq!(sass.source_extension(), "sass");
    }
}
