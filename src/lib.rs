//! On-demand Sass compilation middleware.
//!
//! Intercepts requests for `.css` paths, compiles the matching `.scss`/`.sass`
//! source when the compiled artifact is missing or stale, persists the result
//! next to a mirrored path under the destination root, and either serves the
//! bytes or defers to the next handler in the pipeline.
//!
//! Freshness is decided from filesystem modification times: an artifact is
//! stale when it is older than its source or any file the compiler read while
//! producing it. Concurrent requests for the same uncompiled target collapse
//! into a single compile (single-flight).
//!
//! # Example
//!
//! ```no_run
//! use sasserve::{Options, SassMiddleware};
//!
//! let middleware = SassMiddleware::new(Options {
//!     src: Some("assets/styles".into()),
//!     dest: Some("public/css".into()),
//!     prefix: Some("/css".into()),
//!     max_age: Some(86400),
//!     ..Options::default()
//! })?;
//!
//! let server = tiny_http::Server::http("127.0.0.1:8000").unwrap();
//! sasserve::http::run(&server, std::sync::Arc::new(middleware));
//! # Ok::<(), sasserve::ConfigError>(())
//! ```

pub mod config;
pub mod coordinate;
pub mod freshness;
pub mod http;
pub mod logger;
pub mod middleware;
pub mod pipeline;
pub mod resolve;
pub mod sass;
pub mod store;

pub use config::{ConfigError, MountConfig, Options};
pub use logger::{LogFn, LogLevel};
pub use middleware::SassMiddleware;
pub use pipeline::{Outcome, PipelineError, ResponseSink};
pub use resolve::ResolvedTarget;
pub use sass::{CompileError, CompileOutput, CompileRequest, Compiler, OutputStyle};
