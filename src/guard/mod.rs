//! Guarded execution
//!
//! A [`Guard`] runs one fallible operation at a time inside a
//! try/report/finalize envelope:
//!
//! 1. resolve the effective options (per-call overrides over the base)
//! 2. run the operation
//! 3. on `Err`, report it, then pick exactly one outcome: the `on_error`
//!    value, a re-signal of the error (`rethrow`), or the default value
//! 4. run `finally` once, after the outcome is chosen and before returning
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tryguard::{Guard, Options};
//! use tryguard::sink::MemorySink;
//!
//! let sink = Arc::new(MemorySink::new());
//! let guard = Guard::with_sink(
//!     Options::new().log_prefix("TEST").default_return_value(-1),
//!     sink.clone(),
//! );
//!
//! let value = guard.try_execute(|| "x".parse::<i32>(), None);
//! assert_eq!(value.unwrap(), Some(-1));
//! assert_eq!(sink.lines().len(), 1);
//! ```

mod finalizer;

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::handlers::{ErrorReporter, FnReporter, ReportError, ReportingPath};
use crate::options::{EffectiveOptions, Options, resolve};
use crate::sink::{DiagnosticSink, StderrSink};
use finalizer::Finalizer;

/// Outcome chosen for a failed call
enum Resolution<T> {
    Value(Option<T>),
    Rethrow,
}

impl<T> Resolution<T> {
    fn into_result<E>(self, error: E) -> Result<Option<T>, E> {
        match self {
            Resolution::Value(value) => Ok(value),
            Resolution::Rethrow => Err(error),
        }
    }
}

/// Executor bound to a base option set
///
/// The base options are fixed at construction. The reporting override is
/// owned by the guard and applies to every call made after it is installed.
pub struct Guard<T, E> {
    base: Options<T, E>,
    reporting: ReportingPath<T, E>,
}

/// Create a guard that reports to standard error
pub fn create<T, E>(base: Options<T, E>) -> Guard<T, E> {
    Guard::new(base)
}

impl<T, E> Guard<T, E> {
    pub fn new(base: Options<T, E>) -> Self {
        Self::with_sink(base, Arc::new(StderrSink))
    }

    pub fn with_sink(base: Options<T, E>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            base,
            reporting: ReportingPath::new(sink),
        }
    }

    /// Build a guard from loaded configuration (base options and sink)
    pub fn from_config(config: &Config) -> Self {
        Self::with_sink(config.base_options(), config.sink())
    }

    pub fn base_options(&self) -> &Options<T, E> {
        &self.base
    }

    pub fn sink(&self) -> &Arc<dyn DiagnosticSink> {
        self.reporting.sink()
    }

    pub fn reporting(&self) -> &ReportingPath<T, E> {
        &self.reporting
    }

    /// Replace default reporting with `handler` for all later calls
    ///
    /// The handler receives the caught error and the effective options of the
    /// failing call. An `Err` or a panic from it is swallowed and replaced by
    /// the fallback diagnostic.
    pub fn set_handler_override<F>(&mut self, handler: F)
    where
        F: Fn(&E, &EffectiveOptions<'_, T, E>) -> Result<(), ReportError> + Send + Sync + 'static,
    {
        self.reporting.set_override(Arc::new(FnReporter(handler)));
    }

    pub fn set_reporter_override(&mut self, reporter: Arc<dyn ErrorReporter<T, E>>) {
        self.reporting.set_override(reporter);
    }

    pub fn clear_handler_override(&mut self) {
        self.reporting.clear_override();
    }

    pub fn has_handler_override(&self) -> bool {
        self.reporting.is_overridden()
    }
}

impl<T: Clone, E: Display> Guard<T, E> {
    /// Run `operation` under the guard
    ///
    /// Returns `Ok(Some(value))` on success, `Ok(on_error(&e))` or
    /// `Ok(default_return_value)` on a handled failure, and `Err(e)` only when
    /// `rethrow` is in effect and no `on_error` is configured.
    pub fn try_execute<F>(
        &self,
        operation: F,
        overrides: Option<&Options<T, E>>,
    ) -> Result<Option<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let options = resolve(&self.base, overrides);
        let finalizer = Finalizer::new(options.finally());

        let result = operation();
        self.settle(result, &options, finalizer)
    }

    /// Async variant of [`Guard::try_execute`]
    ///
    /// The failure path runs when the future resolves to `Err`; the envelope
    /// is otherwise identical.
    pub async fn try_execute_async<F, Fut>(
        &self,
        operation: F,
        overrides: Option<&Options<T, E>>,
    ) -> Result<Option<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let options = resolve(&self.base, overrides);
        let finalizer = Finalizer::new(options.finally());

        let result = operation().await;
        self.settle(result, &options, finalizer)
    }

    fn settle(
        &self,
        result: Result<T, E>,
        options: &EffectiveOptions<'_, T, E>,
        finalizer: Finalizer<'_, '_, E>,
    ) -> Result<Option<T>, E> {
        match result {
            Ok(value) => {
                debug!(outcome = "completed", "guarded call succeeded");
                finalizer.complete();
                Ok(Some(value))
            }
            Err(error) => {
                let finalizer = finalizer.arm(&error);
                let resolution = self.handle_failure(&error, options);
                finalizer.complete();
                resolution.into_result(error)
            }
        }
    }

    fn handle_failure(&self, error: &E, options: &EffectiveOptions<'_, T, E>) -> Resolution<T> {
        self.reporting.report(error, options);

        if let Some(on_error) = options.on_error() {
            debug!(outcome = "handled", "guarded call failed, on_error supplied the result");
            return Resolution::Value(Some(on_error(error)));
        }

        if options.rethrow() {
            debug!(outcome = "rethrown", "guarded call failed, re-signalling error");
            return Resolution::Rethrow;
        }

        debug!(outcome = "defaulted", "guarded call failed, returning default value");
        Resolution::Value(options.default_return_value().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::REPORT_FAILURE_MESSAGE;
    use crate::options::OptionName;
    use crate::sink::MemorySink;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::Mutex;

    type Events = Arc<Mutex<Vec<String>>>;

    fn setup(base: Options<String, String>) -> (Arc<MemorySink>, Guard<String, String>) {
        let sink = Arc::new(MemorySink::new());
        let guard = Guard::with_sink(base, sink.clone());
        (sink, guard)
    }

    fn failing() -> Result<String, String> {
        Err("division by zero".to_string())
    }

    fn recording_finally(events: Events) -> impl Fn(Option<&String>) + Send + Sync + 'static {
        move |e: Option<&String>| {
            events
                .lock()
                .unwrap()
                .push(format!("finally:{}", e.map(String::as_str).unwrap_or("none")));
        }
    }

    #[test]
    fn test_success_returns_value() {
        let events = Events::default();
        let (sink, guard) = setup(
            Options::new()
                .log_prefix("T")
                .finally(recording_finally(events.clone())),
        );

        let result = guard.try_execute(|| Ok("done".to_string()), None);

        assert_eq!(result, Ok(Some("done".to_string())));
        assert!(sink.is_empty());
        assert_eq!(*events.lock().unwrap(), vec!["finally:none"]);
    }

    #[test]
    fn test_failure_without_options_returns_empty() {
        let (sink, guard) = setup(Options::new());

        let result = guard.try_execute(failing, None);

        assert_eq!(result, Ok(None));
        assert_eq!(sink.lines(), vec!["division by zero"]);
    }

    #[test]
    fn test_failure_returns_default_value() {
        let (_, guard) = setup(Options::new().default_return_value("fallback".to_string()));

        let result = guard.try_execute(failing, None);
        assert_eq!(result, Ok(Some("fallback".to_string())));
    }

    #[test]
    fn test_on_error_value_wins_over_rethrow() {
        let (_, guard) = setup(
            Options::new()
                .rethrow(true)
                .on_error(|e: &String| format!("handled: {e}")),
        );

        let result = guard.try_execute(failing, None);
        assert_eq!(result, Ok(Some("handled: division by zero".to_string())));
    }

    #[test]
    fn test_rethrow_returns_original_error() {
        let (sink, guard) = setup(Options::new().log_prefix("T").rethrow(true));

        let result = guard.try_execute(failing, None);

        assert_eq!(result, Err("division by zero".to_string()));
        assert_eq!(sink.lines(), vec!["T: division by zero"]);
    }

    #[test]
    fn test_override_scenario_from_base_with_rethrow() {
        let (_, guard) = setup(
            Options::new()
                .log_prefix("T")
                .rethrow(true)
                .default_return_value(String::new()),
        );
        let overrides = Options::new()
            .rethrow(false)
            .on_error(|_: &String| "X".to_string());

        let result = guard.try_execute(failing, Some(&overrides));
        assert_eq!(result, Ok(Some("X".to_string())));
    }

    #[test]
    fn test_override_rethrow_false_uses_default() {
        let (_, guard) = setup(
            Options::new()
                .rethrow(true)
                .default_return_value("base default".to_string()),
        );
        let overrides = Options::new().rethrow(false);

        let result = guard.try_execute(failing, Some(&overrides));
        assert_eq!(result, Ok(Some("base default".to_string())));
    }

    #[test]
    fn test_override_prefix_used_in_report() {
        let (sink, guard) = setup(Options::new().log_prefix("TEST"));
        let overrides = Options::new().log_prefix("TEST A");

        let _ = guard.try_execute(failing, Some(&overrides));
        let _ = guard.try_execute(failing, None);

        assert_eq!(
            sink.lines(),
            vec!["TEST A: division by zero", "TEST: division by zero"]
        );
    }

    #[test]
    fn test_finally_runs_after_outcome_on_every_path() {
        let events = Events::default();
        let on_error_events = events.clone();
        let base = Options::new().finally(recording_finally(events.clone()));
        let (_, guard) = setup(base);

        // handled by on_error
        let handled = Options::new().on_error(move |_: &String| {
            on_error_events.lock().unwrap().push("on_error".to_string());
            "handled".to_string()
        });
        assert_eq!(guard.try_execute(failing, Some(&handled)), Ok(Some("handled".to_string())));

        // re-signalled
        let rethrow = Options::new().rethrow(true);
        assert!(guard.try_execute(failing, Some(&rethrow)).is_err());

        // defaulted
        assert_eq!(guard.try_execute(failing, None), Ok(None));

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                "on_error",
                "finally:division by zero",
                "finally:division by zero",
                "finally:division by zero",
            ]
        );
    }

    #[test]
    fn test_panicking_on_error_still_finalizes_with_error() {
        let events = Events::default();
        let (sink, guard) = setup(
            Options::new()
                .log_prefix("T")
                .finally(recording_finally(events.clone()))
                .on_error(|_: &String| -> String { panic!("on_error blew up") }),
        );

        let result = catch_unwind(AssertUnwindSafe(|| guard.try_execute(failing, None)));

        assert!(result.is_err());
        assert_eq!(*events.lock().unwrap(), vec!["finally:division by zero"]);
        assert_eq!(sink.lines(), vec!["T: division by zero"]);
    }

    #[test]
    fn test_panicking_operation_finalizes_without_error() {
        let events = Events::default();
        let (sink, guard) = setup(Options::new().finally(recording_finally(events.clone())));

        let result = catch_unwind(AssertUnwindSafe(|| {
            guard.try_execute(|| -> Result<String, String> { panic!("operation blew up") }, None)
        }));

        assert!(result.is_err());
        assert_eq!(*events.lock().unwrap(), vec!["finally:none"]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_cleared_finally_is_skipped() {
        let events = Events::default();
        let (_, guard) = setup(Options::new().finally(recording_finally(events.clone())));
        let overrides = Options::new().without(OptionName::Finally);

        let _ = guard.try_execute(failing, Some(&overrides));

        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_handler_override_replaces_sink() {
        let (sink, mut guard) = setup(Options::new().log_prefix("T"));
        let seen = Events::default();
        let recorder = seen.clone();
        guard.set_handler_override(move |e, options| {
            recorder
                .lock()
                .unwrap()
                .push(format!("{}|{e}", options.log_prefix().unwrap_or_default()));
            Ok(())
        });

        assert!(guard.has_handler_override());
        assert_eq!(guard.try_execute(failing, None), Ok(None));
        assert!(sink.is_empty());
        assert_eq!(*seen.lock().unwrap(), vec!["T|division by zero"]);

        guard.clear_handler_override();
        let _ = guard.try_execute(failing, None);
        assert_eq!(sink.lines(), vec!["T: division by zero"]);
    }

    #[test]
    fn test_failing_handler_override_never_escapes() {
        let (sink, mut guard) = setup(Options::new().default_return_value("safe".to_string()));
        guard.set_handler_override(|_, _| Err(ReportError::Handler("broken".to_string())));

        let result = guard.try_execute(failing, None);

        assert_eq!(result, Ok(Some("safe".to_string())));
        assert_eq!(sink.lines(), vec![REPORT_FAILURE_MESSAGE, "division by zero"]);
    }

    #[test]
    fn test_reporting_precedes_on_error() {
        let events = Events::default();
        let (_, mut guard) = setup(Options::new());
        let report_events = events.clone();
        guard.set_handler_override(move |_, _| {
            report_events.lock().unwrap().push("report".to_string());
            Ok(())
        });

        let on_error_events = events.clone();
        let overrides = Options::new().on_error(move |_: &String| {
            on_error_events.lock().unwrap().push("on_error".to_string());
            String::new()
        });
        let _ = guard.try_execute(failing, Some(&overrides));

        assert_eq!(*events.lock().unwrap(), vec!["report", "on_error"]);
    }

    #[test]
    fn test_base_options_unchanged_by_calls() {
        let (_, guard) = setup(Options::new().log_prefix("T").rethrow(true));
        let overrides = Options::new()
            .rethrow(false)
            .without(OptionName::LogPrefix);

        let _ = guard.try_execute(failing, Some(&overrides));

        let effective = resolve(guard.base_options(), None);
        assert_eq!(effective.log_prefix(), Some("T"));
        assert!(effective.rethrow());
    }

    #[tokio::test]
    async fn test_async_failure_path() {
        let events = Events::default();
        let (sink, guard) = setup(
            Options::new()
                .log_prefix("ASYNC")
                .finally(recording_finally(events.clone())),
        );

        let result = guard
            .try_execute_async(
                || async {
                    tokio::task::yield_now().await;
                    Err::<String, String>("rejected".to_string())
                },
                Some(&Options::new().default_return_value("recovered".to_string())),
            )
            .await;

        assert_eq!(result, Ok(Some("recovered".to_string())));
        assert_eq!(sink.lines(), vec!["ASYNC: rejected"]);
        assert_eq!(*events.lock().unwrap(), vec!["finally:rejected"]);
    }

    #[tokio::test]
    async fn test_async_success_and_rethrow() {
        let (_, guard) = setup(Options::new().rethrow(true));

        let ok = guard
            .try_execute_async(|| async { Ok::<_, String>("value".to_string()) }, None)
            .await;
        assert_eq!(ok, Ok(Some("value".to_string())));

        let err = guard
            .try_execute_async(|| async { Err::<String, _>("rejected".to_string()) }, None)
            .await;
        assert_eq!(err, Err("rejected".to_string()));
    }
}
