use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("log_prefix {prefix:?} contains a line break; diagnostic output is line-oriented")]
    LogPrefixLineBreak { prefix: String },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_guard(config)?;
    Ok(())
}

fn validate_guard(config: &Config) -> Result<(), ValidationError> {
    if let Some(prefix) = &config.guard.log_prefix {
        if prefix.contains(['\n', '\r']) {
            return Err(ValidationError::LogPrefixLineBreak {
                prefix: prefix.clone(),
            });
        }
    }

    Ok(())
}
