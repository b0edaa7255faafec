//! Diagnostic output sinks
//!
//! The sink is the only I/O the guard performs: the default reporter and the
//! reporting fallback write whole lines to it.

use std::io::Write;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::config::SinkKind;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write diagnostic line: {0}")]
    Io(#[from] std::io::Error),
    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// Line-oriented diagnostic output
pub trait DiagnosticSink: Send + Sync {
    fn write_line(&self, line: &str) -> Result<(), SinkError>;
}

/// Writes to the process standard error stream
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn write_line(&self, line: &str) -> Result<(), SinkError> {
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "{line}")?;
        Ok(())
    }
}

/// Forwards lines to `tracing` at error level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn write_line(&self, line: &str) -> Result<(), SinkError> {
        tracing::error!(target: "tryguard::report", "{line}");
        Ok(())
    }
}

/// Keeps every line in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }
}

impl DiagnosticSink for MemorySink {
    fn write_line(&self, line: &str) -> Result<(), SinkError> {
        let mut lines = self
            .lines
            .lock()
            .map_err(|e| SinkError::Unavailable(e.to_string()))?;
        lines.push(line.to_string());
        Ok(())
    }
}

/// Build the sink selected in configuration
pub fn from_kind(kind: SinkKind) -> Arc<dyn DiagnosticSink> {
    match kind {
        SinkKind::Stderr => Arc::new(StderrSink),
        SinkKind::Tracing => Arc::new(TracingSink),
    }
}
