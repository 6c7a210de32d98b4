//! The middleware: per-request orchestration and result dispatch.


use std::path::Path;

use crate::config::{ConfigError, MountConfig, Options};
use crate::coordinate::{CompileAttempt, CompileCoordinator};
use crate::freshness::{self, Freshness};
use crate::pipeline::{Outcome, ResponseSink};
use crate::resolve::{self, Resolution, ResolvedTarget};
use crate::sass::{CompileOutput, CompileRequest, Compiler, GrassCompiler};
use crate::store;

const CSS_CONTENT_TYPE: &str = "text/css; charset=utf-8";

/// One mounted instance: a resolved configuration plus its own compile
/// coordinator. Mounts never share in-flight or dependency state.
#[derive(Debug)]
pub struct SassMiddleware {
    config: MountConfig,
    coordinator: CompileCoordinator,
}

impl SassMiddleware {
    /// Build a mount with the default grass-backed compiler.
    pub fn new(options: Options) -> Result<Self, ConfigError> {
        Self::with_compiler(options, Box::new(GrassCompiler))
    }

    /// Build a mount with a custom compiler implementation.
    pub fn with_compiler(
        options: Options,
        compiler: Box<dyn Compiler>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            config: MountConfig::resolve(options)?,
            coordinator: CompileCoordinator::new(compiler),
        })
    }

    pub fn config(&self) -> &MountConfig {
        &self.config
    }

    /// Handle one request path.
    ///
    /// Resolution -> freshness -> (compile if needed) -> dispatch. The
    /// returned [`Outcome`] tells the host whether the response was written,
    /// should fall through to the next handler, or belongs in the error
    /// stage.
    pub fn handle(&self, request_path: &str, sink: &mut dyn ResponseSink) -> Outcome {
        let target = match resolve::resolve(request_path, &self.config) {
            Resolution::PrefixMismatch => {
                self.config.log.debug("skip", "prefix mismatch");
                return Outcome::Next;
            }
            Resolution::NothingToDo => {
                self.config.log.debug("skip", "nothing to do");
                return Outcome::Next;
            }
            Resolution::Target(target) => target,
        };

        loop {
            match freshness::check(&target, self.coordinator.dependencies()) {
                Freshness::Fresh => {
                    self.config
                        .log
                        .debug("read", &display(&target.destination_file));
                    return self.dispatch(&target, sink);
                }
                Freshness::Missing | Freshness::Stale => {
                    self.config
                        .log
                        .debug("render", &display(&target.source_file));

                    let request = self.compile_request(&target);
                    let attempt = self.coordinator.compile(
                        &request,
                        &target.destination_file,
                        |output| persist(&target, output),
                    );

                    match attempt {
                        Ok(CompileAttempt::Compiled(_)) => {
                            self.config
                                .log
                                .debug("rendered", &display(&target.destination_file));
                            return self.dispatch(&target, sink);
                        }
                        // Another request produced (or failed to produce) the
                        // artifact while we waited: decide again from disk
                        Ok(CompileAttempt::Waited) => continue,
                        Err(error) => {
                            self.config.log.error("error", &error.to_string());
                            return Outcome::Error(error);
                        }
                    }
                }
            }
        }
    }

    fn compile_request(&self, target: &ResolvedTarget) -> CompileRequest {
        CompileRequest {
            file: Some(target.source_file.clone()),
            data: None,
            include_paths: vec![self.config.src.clone()],
            indented_syntax: self.config.indented_syntax,
            source_map: self.config.source_map,
            out_file: Some(target.destination_file.clone()),
            output_style: self.config.output_style,
        }
    }

    /// Serve the artifact, or defer in persist-only mode.
    fn dispatch(&self, target: &ResolvedTarget, sink: &mut dyn ResponseSink) -> Outcome {
        if !self.config.response {
            return Outcome::Next;
        }

        let bytes = match store::read_artifact(&target.destination_file) {
            Ok(bytes) => bytes,
            Err(error) => return Outcome::Error(error.into()),
        };

        sink.set_status(200);
        sink.set_header("Content-Type", CSS_CONTENT_TYPE);
        if let Some(max_age) = self.config.max_age {
            sink.set_header("Cache-Control", &format!("max-age={max_age}"));
        }

        // Past this point the status line is out: a broken connection is
        // logged, not routed to the error stage
        if let Err(error) = sink.write_body(&bytes).and_then(|()| sink.end()) {
            self.config.log.error("write", &error.to_string());
        } else {
            self.config
                .log
                .debug("serve", &display(&target.destination_file));
        }
        Outcome::Served
    }
}

/// Write artifact (and source map sibling) durably before any waiter wakes.
fn persist(target: &ResolvedTarget, output: &CompileOutput) -> std::io::Result<()> {
    store::write_artifact(&target.destination_file, &output.css)?;
    if let (Some(map_file), Some(map)) = (&target.source_map_file, &output.map) {
        store::write_artifact(map_file, map)?;
    }
    Ok(())
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
