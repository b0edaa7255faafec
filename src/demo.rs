use thiserror::Error;
use tracing::info;
use tryguard::config::Config;
use tryguard::{Guard, OptionName, Options};

use crate::cli::Scenario;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

const DEFAULT_PREFIX: &str = "TEST";

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("attempted to divide {0} by zero")]
    DivideByZero(i64),
}

fn divide(numerator: i64, denominator: i64) -> Result<String, DemoError> {
    numerator
        .checked_div(denominator)
        .map(|quotient| quotient.to_string())
        .ok_or(DemoError::DivideByZero(numerator))
}

/// Base options from configuration, labelled if no prefix was configured
fn base_options(config: &Config) -> Options<String, DemoError> {
    let base = config.base_options();
    if base.defines(OptionName::LogPrefix) {
        base
    } else {
        base.log_prefix(DEFAULT_PREFIX)
    }
}

fn full_options(config: &Config) -> Options<String, DemoError> {
    base_options(config)
        .rethrow(true)
        .finally(|e: Option<&DemoError>| info!(failed = e.is_some(), "finally ran"))
        .on_error(|e: &DemoError| format!("custom handling of: {e}"))
        .default_return_value(String::new())
}

pub async fn run(scenario: Scenario, config: &Config) -> Result<(), AnyError> {
    let sink = config.sink();

    let outcome = match scenario {
        Scenario::Simple => {
            let guard = Guard::with_sink(base_options(config), sink);
            guard.try_execute(|| divide(1, 0), None)?
        }
        Scenario::AllOptions => {
            let guard = Guard::with_sink(full_options(config), sink);
            guard.try_execute(|| divide(1, 0), None)?
        }
        Scenario::OverrideOptions => {
            let guard = Guard::with_sink(full_options(config), sink);
            let overrides = Options::new()
                .log_prefix(format!("{DEFAULT_PREFIX} A"))
                .without(OptionName::Finally)
                .without(OptionName::DefaultReturnValue)
                .on_error(|_: &DemoError| "some custom logging...".to_string());
            guard.try_execute(|| divide(1, 0), Some(&overrides))?
        }
        Scenario::OverrideHandler => {
            let mut guard = Guard::with_sink(base_options(config), sink);
            guard.set_handler_override(|e, options| {
                println!("[{}] custom handler: {e}", options.log_prefix().unwrap_or("-"));
                Ok(())
            });
            guard.try_execute(|| divide(1, 0), None)?
        }
        Scenario::Async => {
            let guard = Guard::with_sink(base_options(config), sink);
            guard
                .try_execute_async(
                    || async {
                        tokio::task::yield_now().await;
                        divide(1, 0)
                    },
                    None,
                )
                .await?
        }
    };

    info!(?scenario, ?outcome, "Scenario finished");
    println!("{scenario:?} -> {outcome:?}");

    Ok(())
}

pub fn show_config(config: &Config) -> Result<(), AnyError> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divide() {
        assert_eq!(divide(6, 3).unwrap(), "2");
        assert!(matches!(divide(1, 0), Err(DemoError::DivideByZero(1))));
    }

    #[test]
    fn test_base_options_prefix_fallback() {
        let options = base_options(&Config::default());
        assert!(matches!(
            options.get(OptionName::LogPrefix),
            Some(tryguard::OptionValue::LogPrefix(DEFAULT_PREFIX))
        ));

        let config = Config::from_toml_str("[guard]\nlog_prefix = \"CONFIGURED\"\n").unwrap();
        assert!(matches!(
            base_options(&config).get(OptionName::LogPrefix),
            Some(tryguard::OptionValue::LogPrefix("CONFIGURED"))
        ));
    }

    #[tokio::test]
    async fn test_every_scenario_runs() {
        let config = Config::from_toml_str("[reporting]\nsink = \"tracing\"\n").unwrap();
        for scenario in [
            Scenario::Simple,
            Scenario::AllOptions,
            Scenario::OverrideOptions,
            Scenario::OverrideHandler,
            Scenario::Async,
        ] {
            assert!(run(scenario, &config).await.is_ok(), "{scenario:?} failed");
        }
    }
}
