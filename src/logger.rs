//! Logging hook invoked at each request decision point.
//!
//! Every mount carries a [`LogSink`]: either a user-supplied callback or the
//! default colored stderr line. Events are keyed short strings ("skip",
//! "render", "error", ...) with a contextual value (reason, path, message).

use owo_colors::OwoColorize;
use std::fmt;
use std::sync::Arc;

/// Severity of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Error,
}

/// User-supplied log callback: `(level, key, value)`.
pub type LogFn = Arc<dyn Fn(LogLevel, &str, &str) + Send + Sync>;

/// Per-mount log sink.
///
/// With a callback configured, every event is delivered to it and the callback
/// decides what to keep. Without one, errors always reach stderr and debug
/// events are gated on the mount's `debug` option.
#[derive(Clone)]
pub struct LogSink {
    callback: Option<LogFn>,
    verbose: bool,
}

impl LogSink {
    pub fn new(callback: Option<LogFn>, verbose: bool) -> Self {
        Self { callback, verbose }
    }

    pub fn debug(&self, key: &str, value: &str) {
        self.emit(LogLevel::Debug, key, value);
    }

    pub fn error(&self, key: &str, value: &str) {
        self.emit(LogLevel::Error, key, value);
    }

    fn emit(&self, level: LogLevel, key: &str, value: &str) {
        match &self.callback {
            Some(callback) => callback(level, key, value),
            None => {
                if level == LogLevel::Error || self.verbose {
                    default_line(level, key, value);
                }
            }
        }
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink")
            .field("callback", &self.callback.as_ref().map(|_| "..."))
            .field("verbose", &self.verbose)
            .finish()
    }
}

/// Minimally formatted fallback line: `[sass] key: value`.
fn default_line(level: LogLevel, key: &str, value: &str) {
    let prefix = match level {
        LogLevel::Error => "[sass]".bright_red().bold().to_string(),
        LogLevel::Debug => "[sass]".bright_yellow().bold().to_string(),
    };
    eprintln!("{prefix} {key}: {value}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn capturing_sink(verbose: bool) -> (LogSink, Arc<Mutex<Vec<(LogLevel, String, String)>>>) {
        let events: Arc<Mutex<Vec<(LogLevel, String, String)>>> = Arc::default();
        let captured = Arc::clone(&events);
        let callback: LogFn = Arc::new(move |level, key, value| {
            captured.lock().push((level, key.into(), value.into()));
        });
        (LogSink::new(Some(callback), verbose), events)
    }

    #[test]
    fn callback_receives_all_events() {
        let (sink, events) = capturing_sink(false);
        sink.debug("skip", "nothing to do");
        sink.error("error", "boom");

        let events = events.lock();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, LogLevel::Debug);
        assert_eq!(events[1].2, "boom");
    }

    #[test]
    fn sink_without_callback_does_not_panic() {
        let sink = LogSink::new(None, true);
        sink.debug("render", "/tmp/a.scss");
        sink.error("error", "message");
    }
}
