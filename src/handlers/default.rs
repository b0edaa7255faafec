use std::fmt::Display;
use std::sync::Arc;

use super::traits::{ErrorReporter, ReportError};
use crate::options::EffectiveOptions;
use crate::sink::DiagnosticSink;

/// Default reporter
///
/// Writes `"<prefix>: <error>"` to the sink, or just the error when the
/// effective log prefix is absent or empty.
#[derive(Clone)]
pub struct DefaultReporter {
    sink: Arc<dyn DiagnosticSink>,
}

impl DefaultReporter {
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &Arc<dyn DiagnosticSink> {
        &self.sink
    }
}

pub(crate) fn format_line(prefix: Option<&str>, error: &dyn Display) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}: {error}"),
        _ => error.to_string(),
    }
}

impl<T, E: Display> ErrorReporter<T, E> for DefaultReporter {
    fn report(&self, error: &E, options: &EffectiveOptions<'_, T, E>) -> Result<(), ReportError> {
        let line = format_line(options.log_prefix(), error);
        self.sink.write_line(&line)?;
        Ok(())
    }
}
