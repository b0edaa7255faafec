use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub guard: GuardConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
}

/// Serializable subset of the base guard options
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GuardConfig {
    /// Label prepended to default report lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_prefix: Option<String>,
    /// Re-signal caught errors after handling
    #[serde(default)]
    pub rethrow: bool,
}

/// Where the default reporter writes
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReportingConfig {
    #[serde(default)]
    pub sink: SinkKind,
}

/// Diagnostic sink type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Stderr,
    Tracing,
}
