//! Tracing setup for the `tryguard` binary

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Install a formatting subscriber filtered by `RUST_LOG` (default `info`)
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
        tracing::debug!(counter = "init", "subscriber installed");
    }
}
