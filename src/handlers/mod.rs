//! Error reporting path
//!
//! Every caught error is reported before the guard decides what to return.
//! Reporting is a two-state machine:
//!
//! - **Default** - [`DefaultReporter`] writes one line to the diagnostic sink
//! - **Overridden** - a caller-supplied [`ErrorReporter`] receives the error
//!   and the effective options; the sink is left alone
//!
//! ## Key Components
//!
//! - [`ErrorReporter`] - trait for custom reporters
//! - [`FnReporter`] - closure adapter for [`ErrorReporter`]
//! - [`ReportingPath`] - owns the state and makes reporting fault-tolerant
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tryguard::handlers::ReportingPath;
//! use tryguard::options::{Options, resolve};
//! use tryguard::sink::MemorySink;
//!
//! let sink = Arc::new(MemorySink::new());
//! let path: ReportingPath<(), String> = ReportingPath::new(sink.clone());
//! let base = Options::new().log_prefix("TEST");
//!
//! path.report(&"disk full".to_string(), &resolve(&base, None));
//! assert_eq!(sink.lines(), vec!["TEST: disk full"]);
//! ```

mod default;
mod state;
mod traits;

pub use default::DefaultReporter;
pub use state::{REPORT_FAILURE_MESSAGE, ReportingPath, ReportingState};
pub use traits::{ErrorReporter, FnReporter, ReportError};
