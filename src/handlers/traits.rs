use thiserror::Error;

use crate::options::EffectiveOptions;
use crate::sink::SinkError;

/// Failure raised while reporting a guarded error
///
/// Never reaches the caller of a guarded call; the reporting path swallows it
/// and writes a fallback diagnostic instead.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("diagnostic sink failed: {0}")]
    Sink(#[from] SinkError),
    #[error("error handler failed: {0}")]
    Handler(String),
    #[error("error reporter panicked: {0}")]
    Panicked(String),
}

/// Turns a caught error into diagnostic output
pub trait ErrorReporter<T, E>: Send + Sync {
    fn report(&self, error: &E, options: &EffectiveOptions<'_, T, E>) -> Result<(), ReportError>;
}

/// Adapter that lets a plain closure act as an [`ErrorReporter`]
pub struct FnReporter<F>(pub F);

impl<T, E, F> ErrorReporter<T, E> for FnReporter<F>
where
    F: Fn(&E, &EffectiveOptions<'_, T, E>) -> Result<(), ReportError> + Send + Sync,
{
    fn report(&self, error: &E, options: &EffectiveOptions<'_, T, E>) -> Result<(), ReportError> {
        (self.0)(error, options)
    }
}
