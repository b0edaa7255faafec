use std::any::Any;
use std::fmt::Display;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use super::default::{DefaultReporter, format_line};
use super::traits::{ErrorReporter, ReportError};
use crate::options::EffectiveOptions;
use crate::sink::DiagnosticSink;

/// Line written when a reporter fails, followed by the original error
pub const REPORT_FAILURE_MESSAGE: &str = "error reporter failed";

/// Which reporter handles caught errors
pub enum ReportingState<T, E> {
    Default,
    Overridden(Arc<dyn ErrorReporter<T, E>>),
}

/// Fault-tolerant reporting path owned by a guard
pub struct ReportingPath<T, E> {
    default: DefaultReporter,
    state: ReportingState<T, E>,
}

impl<T, E> ReportingPath<T, E> {
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            default: DefaultReporter::new(sink),
            state: ReportingState::Default,
        }
    }

    pub fn sink(&self) -> &Arc<dyn DiagnosticSink> {
        self.default.sink()
    }

    pub fn state(&self) -> &ReportingState<T, E> {
        &self.state
    }

    pub fn is_overridden(&self) -> bool {
        matches!(self.state, ReportingState::Overridden(_))
    }

    /// Replace default reporting for every later call
    pub fn set_override(&mut self, reporter: Arc<dyn ErrorReporter<T, E>>) {
        self.state = ReportingState::Overridden(reporter);
    }

    /// Go back to writing to the sink
    pub fn clear_override(&mut self) {
        self.state = ReportingState::Default;
    }
}

impl<T, E: Display> ReportingPath<T, E> {
    /// Report a caught error; never fails and never panics
    ///
    /// Reporter errors and panics degrade to [`REPORT_FAILURE_MESSAGE`] plus
    /// the original error on the sink.
    ///
    /// A panicking reporter is contained here, but the process panic hook
    /// still runs first and prints its own message to the real standard
    /// error, whatever sink is installed. Swap the hook with
    /// [`std::panic::set_hook`] to silence it.
    pub fn report(&self, error: &E, options: &EffectiveOptions<'_, T, E>) {
        let reporter: &dyn ErrorReporter<T, E> = match &self.state {
            ReportingState::Default => &self.default,
            ReportingState::Overridden(reporter) => reporter.as_ref(),
        };

        let result = catch_unwind(AssertUnwindSafe(|| reporter.report(error, options)))
            .unwrap_or_else(|payload| Err(ReportError::Panicked(panic_message(payload.as_ref()))));

        if let Err(failure) = result {
            tracing::warn!(error = %failure, "error reporting failed, using fallback");
            self.write_fallback(error, options);
        }
    }

    fn write_fallback(&self, error: &E, options: &EffectiveOptions<'_, T, E>) {
        let sink = self.sink();
        let written = sink
            .write_line(REPORT_FAILURE_MESSAGE)
            .and_then(|_| sink.write_line(&format_line(options.log_prefix(), error)));

        if let Err(e) = written {
            tracing::warn!(error = %e, original = %error, "fallback diagnostic could not be written");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
