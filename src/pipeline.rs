//! Host pipeline contract.
//!
//! The middleware is pipeline-agnostic: the host hands it a request path and
//! a [`ResponseSink`], and acts on the returned [`Outcome`]. `Next` stands in
//! for "pass to the next handler"; `Error` for "hand this to the pipeline's
//! error stage" (commonly a 500 with the message as body).

use crate::sass::CompileError;
use std::io;
use thiserror::Error;

/// Response writing surface supplied by the host pipeline.
pub trait ResponseSink {
    fn set_status(&mut self, status: u16);
    fn set_header(&mut self, name: &str, value: &str);
    fn write_body(&mut self, bytes: &[u8]) -> io::Result<()>;
    fn end(&mut self) -> io::Result<()>;
}

/// What the host should do after a request was handled.
#[derive(Debug)]
pub enum Outcome {
    /// The response was written to the sink; nothing left to do.
    Served,
    /// Not this mount's request (or persist-only mode): run the next handler.
    Next,
    /// Route to the pipeline's error stage. Never paired with a 200.
    Error(PipelineError),
}

/// Per-request recoverable failures routed to the error stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Compile(#[from] CompileError),

    #[error("{0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_displays_bare_message() {
        let error = PipelineError::from(CompileError::new("Undefined variable: \"$x\""));
        assert_eq!(error.to_string(), "Undefined variable: \"$x\"");
    }
}
