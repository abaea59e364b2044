//! Line-oriented progress reporting
//!
//! Components receive an `Arc<dyn Logger>` at construction and report user-facing
//! progress through it. The default [`TracingLogger`] forwards to `tracing`, so the
//! lines end up wherever [`crate::logging::init_logging`] routed them.

use std::sync::Mutex;

/// Sink for user-facing progress and failure lines
pub trait Logger: Send + Sync {
    /// Report normal progress
    fn info(&self, message: &str);

    /// Report a failure that is about to abort the run
    fn error(&self, message: &str);
}

/// Logger that forwards to the `tracing` macros
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Severity of a captured line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Progress line
    Info,
    /// Failure line
    Error,
}

/// Logger that keeps every line in memory
///
/// Useful when embedding the pipeline and when asserting on progress output.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<(Level, String)>>,
}

impl MemoryLogger {
    /// Create an empty logger
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured lines in emission order
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Captured messages at the given level
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, message.to_string()));
        }
    }
}

impl Logger for MemoryLogger {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}
