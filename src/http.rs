//! `tiny_http` adapter.
//!
//! Thin glue for mounting the middleware standalone: responses are buffered
//! through a [`BufferedSink`] and flushed as one `tiny_http::Response`;
//! requests are dispatched onto a small thread pool so an in-progress
//! compile never blocks requests for other paths.

use anyhow::Result;
use std::io;
use std::sync::Arc;
use tiny_http::{Header, Request, Response, Server, StatusCode};

use crate::middleware::SassMiddleware;
use crate::pipeline::{Outcome, ResponseSink};

/// In-memory response accumulator.
#[derive(Debug, Default)]
pub struct BufferedSink {
    status: Option<u16>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    ended: bool,
}

impl BufferedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Flush the buffered response onto a `tiny_http` request.
    pub fn respond(self, request: Request) -> Result<()> {
        let mut response = Response::from_data(self.body)
            .with_status_code(StatusCode(self.status.unwrap_or(200)));
        for (name, value) in &self.headers {
            if let Ok(header) = Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                response = response.with_header(header);
            }
        }
        request.respond(response)?;
        Ok(())
    }
}

impl ResponseSink for BufferedSink {
    fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    fn set_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn write_body(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.body.extend_from_slice(bytes);
        Ok(())
    }

    fn end(&mut self) -> io::Result<()> {
        self.ended = true;
        Ok(())
    }
}

/// Blocking request loop with a built-in fallback: unmatched paths get a
/// 404, errors a 500 with the compiler message as body.
pub fn run(server: &Server, middleware: Arc<SassMiddleware>) {
    run_with_fallback(
        server,
        middleware,
        Arc::new(|request: Request| {
            let response =
                Response::from_string("404 Not Found").with_status_code(StatusCode(404));
            let _ = request.respond(response);
        }),
    );
}

/// Blocking request loop; `fallback` receives every request the middleware
/// passes onward.
pub fn run_with_fallback(
    server: &Server,
    middleware: Arc<SassMiddleware>,
    fallback: Arc<dyn Fn(Request) + Send + Sync>,
) {
    // Thread pool keeps on-demand compilation from blocking other requests
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .expect("failed to create thread pool");

    for request in server.incoming_requests() {
        let middleware = Arc::clone(&middleware);
        let fallback = Arc::clone(&fallback);
        pool.spawn(move || {
            let _ = handle(request, &middleware, &*fallback);
        });
    }
}

fn handle(
    request: Request,
    middleware: &SassMiddleware,
    fallback: &(dyn Fn(Request) + Send + Sync),
) -> Result<()> {
    let mut sink = BufferedSink::new();
    match middleware.handle(request.url(), &mut sink) {
        Outcome::Served => sink.respond(request),
        Outcome::Next => {
            fallback(request);
            Ok(())
        }
        Outcome::Error(error) => {
            let response =
                Response::from_string(error.to_string()).with_status_code(StatusCode(500));
            request.respond(response)?;
            Ok(())
        }
    }
}
