//! Request path to source/destination resolution.
//!
//! Pure path arithmetic: no filesystem access happens here. Whether the
//! resolved source exists is the freshness check's and compiler's concern.

use crate::config::MountConfig;
use std::path::{Path, PathBuf};

/// Paths a request resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Sass source under the source root.
    pub source_file: PathBuf,
    /// Compiled stylesheet under the destination root.
    pub destination_file: PathBuf,
    /// `<destination>.map` sibling, when source maps are enabled.
    pub source_map_file: Option<PathBuf>,
}

/// Resolution verdict for a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Target(ResolvedTarget),
    /// A prefix is configured and the path does not start with it.
    PrefixMismatch,
    /// Not a stylesheet request (or a path this mount refuses to touch).
    NothingToDo,
}

/// Map a raw request path onto the mount's roots.
pub fn resolve(request_path: &str, config: &MountConfig) -> Resolution {
    let path = normalize_request_path(request_path);

    let path = match &config.prefix {
        Some(prefix) => match path.strip_prefix(prefix.as_str()) {
            Some(rest) => rest,
            None => return Resolution::PrefixMismatch,
        },
        None => path.as_str(),
    };

    let relative = path.trim_start_matches('/');
    if !relative.ends_with(".css") {
        return Resolution::NothingToDo;
    }
    // No traversal out of the mounted roots
    if relative.split('/').any(|segment| segment == "..") {
        return Resolution::NothingToDo;
    }

    let destination_file = config.dest.join(relative);
    let source_file = config
        .src
        .join(relative)
        .with_extension(config.source_extension());
    let source_map_file = config.source_map.then(|| map_sibling(&destination_file));

    Resolution::Target(ResolvedTarget {
        source_file,
        destination_file,
        source_map_file,
    })
}

/// `a/b.css` -> `a/b.css.map`
fn map_sibling(destination: &Path) -> PathBuf {
    let mut path = destination.as_os_str().to_os_string();
    path.push(".map");
    PathBuf::from(path)
}

/// Percent-decode and strip any query string.
fn normalize_request_path(url: &str) -> String {
    use percent_encoding::percent_decode_str;

    let path = url.split('?').next().unwrap_or(url);
    percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;

    fn config(options: Options) -> MountConfig {
        MountConfig::resolve(options).unwrap()
    }

    fn base() -> MountConfig {
        config(Options {
            src: Some("/site/sass".into()),
            dest: Some("/site/css".into()),
            ..Options::default()
        })
    }

    #[test]
    fn swaps_extension_and_mirrors_relative_path() {
        let Resolution::Target(target) = resolve("/nested/app.css", &base()) else {
            panic!("expected target");
        };
        assert_eq!(target.source_file, Path::new("/site/sass/nested/app.scss"));
        assert_eq!(target.destination_file, Path::new("/site/css/nested/app.css"));
        assert_eq!(target.source_map_file, None);
    }

    #[test]
    fn indented_syntax_resolves_to_sass() {
        let config = config(Options {
            src: Some("/site/sass".into()),
            indented_syntax: true,
            ..Options::default()
        });
        let Resolution::Target(target) = resolve("/app.css", &config) else {
            panic!("expected target");
        };
        assert_eq!(target.source_file, Path::new("/site/sass/app.sass"));
    }

    #[test]
    fn non_css_is_nothing_to_do() {
        assert_eq!(resolve("/logo.png", &base()), Resolution::NothingToDo);
        assert_eq!(resolve("/", &base()), Resolution::NothingToDo);
    }

    #[test]
    fn prefix_is_stripped_before_resolution() {
        let config = config(Options {
            src: Some("/site/sass".into()),
            prefix: Some("/styles".into()),
            ..Options::default()
        });

        let Resolution::Target(target) = resolve("/styles/app.css", &config) else {
            panic!("expected target");
        };
        assert_eq!(target.source_file, Path::new("/site/sass/app.scss"));

        assert_eq!(resolve("/other/app.css", &config), Resolution::PrefixMismatch);
    }

    #[test]
    fn query_string_and_percent_encoding_are_normalized() {
        let Resolution::Target(target) = resolve("/a%20b.css?v=3", &base()) else {
            panic!("expected target");
        };
        assert_eq!(target.destination_file, Path::new("/site/css/a b.css"));
    }

    #[test]
    fn traversal_is_rejected() {
        assert_eq!(resolve("/../etc/passwd.css", &base()), Resolution::NothingToDo);
        assert_eq!(resolve("/a/../../b.css", &base()), Resolution::NothingToDo);
    }

    #[test]
    fn source_map_sibling_when_enabled() {
        let config = config(Options {
            src: Some("/site/sass".into()),
            source_map: true,
            ..Options::default()
        });
        let Resolution::Target(target) = resolve("/app.css", &config) else {
            panic!("expected target");
        };
        assert_eq!(
            target.source_map_file.unwrap(),
            Path::new("/site/sass/app.css.map")
        );
    }
}
