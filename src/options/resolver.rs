use super::{FinallyFn, OnErrorFn, OptionName, OptionValue, Options, Setting};

/// Merged view of a base option set and an optional per-call override
///
/// Nothing is copied: every lookup goes to the override first and falls
/// back to the base only when the override leaves the slot [`Setting::Unset`].
pub struct EffectiveOptions<'a, T, E> {
    base: &'a Options<T, E>,
    overrides: Option<&'a Options<T, E>>,
}

/// Resolve the options in effect for one guarded call
pub fn resolve<'a, T, E>(
    base: &'a Options<T, E>,
    overrides: Option<&'a Options<T, E>>,
) -> EffectiveOptions<'a, T, E> {
    EffectiveOptions { base, overrides }
}

impl<'a, T, E> EffectiveOptions<'a, T, E> {
    fn pick<V: 'a>(&self, field: impl Fn(&'a Options<T, E>) -> &'a Setting<V>) -> Option<&'a V> {
        match self.overrides.map(&field) {
            Some(setting) if setting.is_defined() => setting.as_option(),
            _ => field(self.base).as_option(),
        }
    }

    pub fn log_prefix(&self) -> Option<&'a str> {
        self.pick(|o| &o.log_prefix).map(String::as_str)
    }

    pub fn on_error(&self) -> Option<&'a OnErrorFn<T, E>> {
        self.pick(|o| &o.on_error)
    }

    pub fn finally(&self) -> Option<&'a FinallyFn<E>> {
        self.pick(|o| &o.finally)
    }

    /// Defaults to `false` when neither layer sets it
    pub fn rethrow(&self) -> bool {
        self.pick(|o| &o.rethrow).copied().unwrap_or(false)
    }

    pub fn default_return_value(&self) -> Option<&'a T> {
        self.pick(|o| &o.default_return_value)
    }

    /// Effective value of a recognized option
    pub fn get(&self, name: OptionName) -> Option<OptionValue<'a, T, E>> {
        match name {
            OptionName::LogPrefix => self.log_prefix().map(OptionValue::LogPrefix),
            OptionName::OnError => self.on_error().map(OptionValue::OnError),
            OptionName::Finally => self.finally().map(OptionValue::Finally),
            OptionName::Rethrow => self.pick(|o| &o.rethrow).map(|r| OptionValue::Rethrow(*r)),
            OptionName::DefaultReturnValue => self
                .default_return_value()
                .map(OptionValue::DefaultReturnValue),
        }
    }

    /// Name-based lookup; unknown names yield `None`
    pub fn get_by_name(&self, name: &str) -> Option<OptionValue<'a, T, E>> {
        name.parse::<OptionName>().ok().and_then(|name| self.get(name))
    }

    /// Whether the per-call override supplied this option
    pub fn is_overridden(&self, name: OptionName) -> bool {
        self.overrides.is_some_and(|o| o.defines(name))
    }

    pub fn base(&self) -> &'a Options<T, E> {
        self.base
    }

    pub fn overrides(&self) -> Option<&'a Options<T, E>> {
        self.overrides
    }

    /// Owned copy of the merged view; empty options come back unset
    pub fn to_options(&self) -> Options<T, E>
    where
        T: Clone,
    {
        Options {
            log_prefix: self.log_prefix().map(str::to_string).into_setting(),
            on_error: self.on_error().cloned().into_setting(),
            finally: self.finally().cloned().into_setting(),
            rethrow: self.pick(|o| &o.rethrow).copied().into_setting(),
            default_return_value: self.default_return_value().cloned().into_setting(),
        }
    }
}

impl<T, E> Clone for EffectiveOptions<'_, T, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, E> Copy for EffectiveOptions<'_, T, E> {}

trait IntoSetting<V> {
    fn into_setting(self) -> Setting<V>;
}

impl<V> IntoSetting<V> for Option<V> {
    fn into_setting(self) -> Setting<V> {
        self.map_or(Setting::Unset, Setting::Set)
    }
}
