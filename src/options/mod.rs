//! Guard options and per-call resolution
//!
//! An [`Options`] value holds the five recognized options. The same type is
//! used for the base configuration a [`Guard`](crate::Guard) is created with
//! and for the overrides passed to a single call. Each field is a
//! [`Setting`], so an override can distinguish "not provided" from
//! "explicitly emptied" and from a falsy value such as `rethrow = false`.
//!
//! ## Example
//!
//! ```rust
//! use tryguard::{OptionName, Options};
//!
//! let base: Options<String, std::io::Error> = Options::new()
//!     .log_prefix("TEST")
//!     .rethrow(true)
//!     .default_return_value(String::new());
//!
//! let per_call = Options::new()
//!     .rethrow(false)
//!     .without(OptionName::DefaultReturnValue);
//!
//! let effective = tryguard::options::resolve(&base, Some(&per_call));
//! assert!(!effective.rethrow());
//! assert_eq!(effective.log_prefix(), Some("TEST"));
//! assert!(effective.default_return_value().is_none());
//! ```

mod resolver;

pub use resolver::{EffectiveOptions, resolve};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Callback invoked with the caught error; its return value becomes the result
pub type OnErrorFn<T, E> = Arc<dyn Fn(&E) -> T + Send + Sync>;

/// Cleanup callback, receives the caught error or `None` on success
pub type FinallyFn<E> = Arc<dyn Fn(Option<&E>) + Send + Sync>;

/// A single option slot
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Setting<V> {
    /// Not provided; resolution falls through to the next layer
    #[default]
    Unset,
    /// Provided as empty; resolution stops here and yields nothing
    Cleared,
    /// Provided with a value (falsy values included)
    Set(V),
}

impl<V> Setting<V> {
    /// True for anything but [`Setting::Unset`]
    pub fn is_defined(&self) -> bool {
        !matches!(self, Setting::Unset)
    }

    pub fn as_option(&self) -> Option<&V> {
        match self {
            Setting::Set(value) => Some(value),
            Setting::Unset | Setting::Cleared => None,
        }
    }
}

impl<V> From<Option<V>> for Setting<V> {
    fn from(value: Option<V>) -> Self {
        match value {
            Some(value) => Setting::Set(value),
            None => Setting::Cleared,
        }
    }
}

impl<V> fmt::Debug for Setting<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Unset => f.write_str("Unset"),
            Setting::Cleared => f.write_str("Cleared"),
            Setting::Set(_) => f.write_str("Set(..)"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown option: {0}")]
pub struct UnknownOption(pub String);

/// Names of the recognized options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionName {
    LogPrefix,
    OnError,
    Finally,
    Rethrow,
    DefaultReturnValue,
}

impl OptionName {
    pub const ALL: [OptionName; 5] = [
        OptionName::LogPrefix,
        OptionName::OnError,
        OptionName::Finally,
        OptionName::Rethrow,
        OptionName::DefaultReturnValue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionName::LogPrefix => "logPrefix",
            OptionName::OnError => "onError",
            OptionName::Finally => "finally",
            OptionName::Rethrow => "rethrow",
            OptionName::DefaultReturnValue => "defaultReturnValue",
        }
    }
}

impl fmt::Display for OptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionName {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "logPrefix" | "log_prefix" => Ok(OptionName::LogPrefix),
            "onError" | "on_error" => Ok(OptionName::OnError),
            "finally" => Ok(OptionName::Finally),
            "rethrow" => Ok(OptionName::Rethrow),
            "defaultReturnValue" | "default_return_value" => {
                Ok(OptionName::DefaultReturnValue)
            }
            other => Err(UnknownOption(other.to_string())),
        }
    }
}

/// Borrowed value of one option, as returned by name-based lookups
pub enum OptionValue<'a, T, E> {
    LogPrefix(&'a str),
    OnError(&'a OnErrorFn<T, E>),
    Finally(&'a FinallyFn<E>),
    Rethrow(bool),
    DefaultReturnValue(&'a T),
}

impl<T, E> OptionValue<'_, T, E> {
    pub fn name(&self) -> OptionName {
        match self {
            OptionValue::LogPrefix(_) => OptionName::LogPrefix,
            OptionValue::OnError(_) => OptionName::OnError,
            OptionValue::Finally(_) => OptionName::Finally,
            OptionValue::Rethrow(_) => OptionName::Rethrow,
            OptionValue::DefaultReturnValue(_) => OptionName::DefaultReturnValue,
        }
    }
}

/// Option set for a guard or for a single guarded call
pub struct Options<T, E> {
    pub log_prefix: Setting<String>,
    pub on_error: Setting<OnErrorFn<T, E>>,
    pub finally: Setting<FinallyFn<E>>,
    pub rethrow: Setting<bool>,
    pub default_return_value: Setting<T>,
}

impl<T, E> Options<T, E> {
    /// Empty option set, every slot unset
    pub fn new() -> Self {
        Self {
            log_prefix: Setting::Unset,
            on_error: Setting::Unset,
            finally: Setting::Unset,
            rethrow: Setting::Unset,
            default_return_value: Setting::Unset,
        }
    }

    pub fn log_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_prefix = Setting::Set(prefix.into());
        self
    }

    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&E) -> T + Send + Sync + 'static,
    {
        self.on_error = Setting::Set(Arc::new(handler));
        self
    }

    pub fn finally<F>(mut self, cleanup: F) -> Self
    where
        F: Fn(Option<&E>) + Send + Sync + 'static,
    {
        self.finally = Setting::Set(Arc::new(cleanup));
        self
    }

    pub fn rethrow(mut self, rethrow: bool) -> Self {
        self.rethrow = Setting::Set(rethrow);
        self
    }

    pub fn default_return_value(mut self, value: T) -> Self {
        self.default_return_value = Setting::Set(value);
        self
    }

    /// Mark an option as explicitly empty
    ///
    /// As an override this suppresses the base value for that call, e.g.
    /// `without(OptionName::Finally)` skips the configured cleanup.
    pub fn without(mut self, name: OptionName) -> Self {
        match name {
            OptionName::LogPrefix => self.log_prefix = Setting::Cleared,
            OptionName::OnError => self.on_error = Setting::Cleared,
            OptionName::Finally => self.finally = Setting::Cleared,
            OptionName::Rethrow => self.rethrow = Setting::Cleared,
            OptionName::DefaultReturnValue => self.default_return_value = Setting::Cleared,
        }
        self
    }

    /// Whether the given option is provided (set or cleared)
    pub fn defines(&self, name: OptionName) -> bool {
        match name {
            OptionName::LogPrefix => self.log_prefix.is_defined(),
            OptionName::OnError => self.on_error.is_defined(),
            OptionName::Finally => self.finally.is_defined(),
            OptionName::Rethrow => self.rethrow.is_defined(),
            OptionName::DefaultReturnValue => self.default_return_value.is_defined(),
        }
    }

    /// Current value of an option in this set alone
    pub fn get(&self, name: OptionName) -> Option<OptionValue<'_, T, E>> {
        match name {
            OptionName::LogPrefix => self
                .log_prefix
                .as_option()
                .map(|prefix| OptionValue::LogPrefix(prefix.as_str())),
            OptionName::OnError => self.on_error.as_option().map(OptionValue::OnError),
            OptionName::Finally => self.finally.as_option().map(OptionValue::Finally),
            OptionName::Rethrow => self.rethrow.as_option().map(|r| OptionValue::Rethrow(*r)),
            OptionName::DefaultReturnValue => self
                .default_return_value
                .as_option()
                .map(OptionValue::DefaultReturnValue),
        }
    }

    /// Name-based lookup; unknown names yield `None`
    pub fn get_option(&self, name: &str) -> Option<OptionValue<'_, T, E>> {
        name.parse::<OptionName>()
            .ok()
            .and_then(|name| self.get(name))
    }
}

impl<T, E> Default for Options<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, E> Clone for Options<T, E> {
    fn clone(&self) -> Self {
        Self {
            log_prefix: self.log_prefix.clone(),
            on_error: self.on_error.clone(),
            finally: self.finally.clone(),
            rethrow: self.rethrow.clone(),
            default_return_value: self.default_return_value.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Options<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("log_prefix", &self.log_prefix.as_option())
            .field("on_error", &self.on_error)
            .field("finally", &self.finally)
            .field("rethrow", &self.rethrow.as_option())
            .field("default_return_value", &self.default_return_value)
            .finish()
    }
}
