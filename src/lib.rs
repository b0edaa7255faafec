pub mod config;
pub mod guard;
pub mod handlers;
pub mod observability;
pub mod options;
pub mod sink;

pub use guard::{Guard, create};
pub use handlers::{ErrorReporter, ReportError};
pub use options::{EffectiveOptions, OptionName, OptionValue, Options, Setting};
pub use sink::{DiagnosticSink, MemorySink, SinkError, StderrSink, TracingSink};
