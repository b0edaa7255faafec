use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::options::FinallyFn;

/// Runs the `finally` callback exactly once per guarded call
///
/// The normal exit paths call [`Finalizer::complete`] after the outcome is
/// chosen. Once a failure is caught the finalizer is armed with it, so an
/// unwind out of `on_error` still hands the error to `finally` from `Drop`.
/// An unwind out of the operation itself runs the callback with `None`.
///
/// During an unwind the callback is run under `catch_unwind`: a panic from
/// `finally` there is logged and dropped instead of aborting the process.
pub(crate) struct Finalizer<'a, 'e, E> {
    callback: Option<&'a FinallyFn<E>>,
    error: Option<&'e E>,
}

impl<'a, 'e, E> Finalizer<'a, 'e, E> {
    pub(crate) fn new(callback: Option<&'a FinallyFn<E>>) -> Self {
        Self {
            callback,
            error: None,
        }
    }

    /// Record the caught error before the outcome is chosen
    pub(crate) fn arm<'x>(mut self, error: &'x E) -> Finalizer<'a, 'x, E> {
        Finalizer {
            callback: self.callback.take(),
            error: Some(error),
        }
    }

    pub(crate) fn complete(mut self) {
        if let Some(callback) = self.callback.take() {
            callback(self.error);
        }
    }
}

impl<E> Drop for Finalizer<'_, '_, E> {
    fn drop(&mut self) {
        let Some(callback) = self.callback.take() else {
            return;
        };

        tracing::warn!(
            caught_error = self.error.is_some(),
            "guarded call unwound before completion, running finally"
        );
        let error = self.error;
        if std::thread::panicking() {
            if catch_unwind(AssertUnwindSafe(|| callback(error))).is_err() {
                tracing::warn!("finally panicked during unwind, panic dropped");
            }
        } else {
            callback(error);
        }
    }
}
