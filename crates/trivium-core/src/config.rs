#![forbid(unsafe_code)]

//! Per-registry configuration.
//!
//! A [`CoreConfig`] is handed to a [`CoreRegistry`](crate::CoreRegistry) and
//! copied into every core it constructs. Values can be set with the builder
//! methods or read from the environment:
//!
//! | Variable | Field | Format |
//! |----------|-------|--------|
//! | `TRIVIUM_MAX_DISPATCH_DEPTH` | `max_dispatch_depth` | positive integer |
//! | `TRIVIUM_TRACE_DISPATCH` | `trace_dispatch` | `1`/`true`/`yes`/`on` |
//!
//! Unparseable values fall back to the defaults.

/// Environment variable for [`CoreConfig::max_dispatch_depth`].
pub const ENV_MAX_DISPATCH_DEPTH: &str = "TRIVIUM_MAX_DISPATCH_DEPTH";
/// Environment variable for [`CoreConfig::trace_dispatch`].
pub const ENV_TRACE_DISPATCH: &str = "TRIVIUM_TRACE_DISPATCH";

/// Default nesting limit for recursive dispatch within one core.
pub const DEFAULT_MAX_DISPATCH_DEPTH: usize = 256;

#[inline]
fn env_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Configuration applied to each core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Maximum number of nested `notify_observers` calls active at once in a
    /// single core. The call that would exceed it fails with
    /// [`DispatchError::DepthExceeded`](crate::DispatchError::DepthExceeded).
    /// Always at least 1.
    pub max_dispatch_depth: usize,
    /// Wrap every dispatch in a `debug_span!("dispatch", ..)`.
    pub trace_dispatch: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_dispatch_depth: DEFAULT_MAX_DISPATCH_DEPTH,
            trace_dispatch: false,
        }
    }
}

impl CoreConfig {
    /// Create a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Read overrides through an arbitrary lookup function.
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(depth) = get_env(ENV_MAX_DISPATCH_DEPTH)
            .and_then(|raw| raw.trim().parse::<usize>().ok())
        {
            config = config.with_max_dispatch_depth(depth);
        }
        if let Some(flag) = get_env(ENV_TRACE_DISPATCH) {
            config.trace_dispatch = env_flag(&flag);
        }
        config
    }

    /// Set the dispatch nesting limit. Zero is clamped to 1.
    #[must_use]
    pub fn with_max_dispatch_depth(mut self, depth: usize) -> Self {
        self.max_dispatch_depth = depth.max(1);
        self
    }

    /// Enable or disable per-dispatch tracing spans.
    #[must_use]
    pub fn with_trace_dispatch(mut self, enabled: bool) -> Self {
        self.trace_dispatch = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.max_dispatch_depth, DEFAULT_MAX_DISPATCH_DEPTH);
        assert!(!config.trace_dispatch);
        assert_eq!(CoreConfig::new(), config);
    }

    #[test]
    fn env_overrides() {
        let config = CoreConfig::from_env_with(lookup(&[
            (ENV_MAX_DISPATCH_DEPTH, " 12 "),
            (ENV_TRACE_DISPATCH, "Yes"),
        ]));
        assert_eq!(config.max_dispatch_depth, 12);
        assert!(config.trace_dispatch);
    }

    #[test]
    fn bad_env_values_fall_back() {
        let config = CoreConfig::from_env_with(lookup(&[
            (ENV_MAX_DISPATCH_DEPTH, "lots"),
            (ENV_TRACE_DISPATCH, "nope"),
        ]));
        assert_eq!(config, CoreConfig::default());
    }

    #[test]
    fn zero_depth_is_clamped() {
        assert_eq!(CoreConfig::new().with_max_dispatch_depth(0).max_dispatch_depth, 1);
        let config = CoreConfig::from_env_with(lookup(&[(ENV_MAX_DISPATCH_DEPTH, "0")]));
        assert_eq!(config.max_dispatch_depth, 1);
    }

    #[test]
    fn builder_chain() {
        let config = CoreConfig::new()
            .with_max_dispatch_depth(4)
            .with_trace_dispatch(true);
        assert_eq!(config.max_dispatch_depth, 4);
        assert!(config.trace_dispatch);
    }
}
