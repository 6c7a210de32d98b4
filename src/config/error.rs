//! Configuration error types.

use thiserror::Error;

/// Mount construction failures. Fatal: a mount with a bad configuration is
/// never installed into the pipeline.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required option `src` (source directory root)")]
    MissingSrc,

    #[error("option `prefix` must start with '/': `{0}`")]
    BadPrefix(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_field() {
        assert!(format!("{}", ConfigError::MissingSrc).contains("src"));
        assert!(format!("{}", ConfigError::BadPrefix("css".into())).contains("prefix"));
    }
}
