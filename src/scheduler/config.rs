//! Event loop configuration.
//!
//! # Configuration Precedence
//!
//! Settings are resolved in this order (highest priority first):
//!
//! 1. **Programmatic**: values set via builder methods (`with_tick_budget(64)`)
//! 2. **Environment variables**: values from `PROMISSORY_*` env vars
//! 3. **Config file**: values loaded from TOML (requires `config-file` feature)
//! 4. **Defaults**: [`EventLoopConfig::default()`]
//!
//! # Defaults
//!
//! | Field | Default |
//! |-------|---------|
//! | `name` | `"promissory-loop"` |
//! | `queue_capacity` | 64 |
//! | `tick_budget` | `None` (unlimited) |
//!
//! # Supported Environment Variables
//!
//! | Variable | Type | Maps to |
//! |----------|------|---------|
//! | `PROMISSORY_LOOP_NAME` | `String` | `name` |
//! | `PROMISSORY_QUEUE_CAPACITY` | `usize` | `queue_capacity` |
//! | `PROMISSORY_TICK_BUDGET` | `u64` (0 = unlimited) | `tick_budget` |

/// Environment variable name for the loop name used in log spans.
pub const ENV_LOOP_NAME: &str = "PROMISSORY_LOOP_NAME";
/// Environment variable name for the initial task queue capacity.
pub const ENV_QUEUE_CAPACITY: &str = "PROMISSORY_QUEUE_CAPACITY";
/// Environment variable name for the per-start tick budget.
pub const ENV_TICK_BUDGET: &str = "PROMISSORY_TICK_BUDGET";

const DEFAULT_NAME: &str = "promissory-loop";
const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Error produced while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable held an unparseable value.
    #[error("invalid value for {var}: expected {expected}, got {value:?}")]
    InvalidValue {
        /// Variable or key name.
        var: String,
        /// The raw value.
        value: String,
        /// Human-readable description of the accepted form.
        expected: &'static str,
    },
    /// A config file could not be parsed.
    #[error("failed to parse config file: {0}")]
    Parse(String),
}

/// Configuration for an [`EventLoop`](super::EventLoop).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLoopConfig {
    /// Name recorded on the loop's log span.
    pub name: String,
    /// Initial capacity reserved for the task queue.
    pub queue_capacity: usize,
    /// Maximum tasks run by a single `start` call before it gives up.
    pub tick_budget: Option<u64>,
}

impl Default for EventLoopConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            tick_budget: None,
        }
    }
}

impl EventLoopConfig {
    /// Returns the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if a `PROMISSORY_*` variable is set but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Sets the loop name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the initial queue capacity.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Caps the number of tasks a single `start` call may run.
    #[must_use]
    pub fn with_tick_budget(mut self, budget: u64) -> Self {
        self.tick_budget = Some(budget);
        self
    }

    /// Removes the tick budget.
    #[must_use]
    pub fn unbounded(mut self) -> Self {
        self.tick_budget = None;
        self
    }

    /// Apply environment variable overrides.
    ///
    /// Only variables that are set in the environment are applied.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but contains an unparseable value.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    fn apply_overrides_from(
        &mut self,
        read: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = read(ENV_LOOP_NAME) {
            self.name = val;
        }
        if let Some(val) = read(ENV_QUEUE_CAPACITY) {
            self.queue_capacity = parse_usize(ENV_QUEUE_CAPACITY, &val)?;
        }
        if let Some(val) = read(ENV_TICK_BUDGET) {
            self.tick_budget = budget_from(parse_u64(ENV_TICK_BUDGET, &val)?);
        }
        Ok(())
    }
}

fn budget_from(raw: u64) -> Option<u64> {
    (raw > 0).then_some(raw)
}

fn parse_usize(var_name: &str, val: &str) -> Result<usize, ConfigError> {
    val.trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::InvalidValue {
            var: var_name.to_string(),
            value: val.to_string(),
            expected: "unsigned integer",
        })
}

fn parse_u64(var_name: &str, val: &str) -> Result<u64, ConfigError> {
    val.trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidValue {
            var: var_name.to_string(),
            value: val.to_string(),
            expected: "u64",
        })
}

// =========================================================================
// TOML config file support (feature-gated)
// =========================================================================

/// TOML-deserializable loop configuration.
///
/// ```toml
/// [event_loop]
/// name = "app-loop"
/// queue_capacity = 256
/// tick_budget = 100000
/// ```
#[cfg(feature = "config-file")]
#[derive(serde::Deserialize, Default, Debug)]
pub struct EventLoopTomlConfig {
    /// Loop settings.
    #[serde(default)]
    pub event_loop: EventLoopToml,
}

/// `[event_loop]` section of the TOML config.
#[cfg(feature = "config-file")]
#[derive(serde::Deserialize, Default, Debug)]
pub struct EventLoopToml {
    /// Loop name.
    pub name: Option<String>,
    /// Initial queue capacity.
    pub queue_capacity: Option<usize>,
    /// Tick budget (0 = unlimited).
    pub tick_budget: Option<u64>,
}

#[cfg(feature = "config-file")]
impl EventLoopConfig {
    /// Parse TOML text into a configuration on top of the defaults.
    ///
    /// Environment overrides are not applied; call
    /// [`apply_env_overrides`](Self::apply_env_overrides) afterwards to layer
    /// them on top.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not valid TOML for this
    /// layout.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let parsed: EventLoopTomlConfig =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();
        config.apply_toml(&parsed);
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the file cannot be read or parsed.
    pub fn from_toml_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    fn apply_toml(&mut self, toml: &EventLoopTomlConfig) {
        let section = &toml.event_loop;
        if let Some(name) = &section.name {
            self.name.clone_from(name);
        }
        if let Some(capacity) = section.queue_capacity {
            self.queue_capacity = capacity;
        }
        if let Some(budget) = section.tick_budget {
            self.tick_budget = budget_from(budget);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn reader(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = EventLoopConfig::default();
        assert_eq!(config.name, "promissory-loop");
        assert_eq!(config.queue_capacity, 64);
        assert_eq!(config.tick_budget, None);
    }

    #[test]
    fn builder_methods() {
        let config = EventLoopConfig::new()
            .with_name("ui")
            .with_queue_capacity(8)
            .with_tick_budget(100);
        assert_eq!(config.name, "ui");
        assert_eq!(config.queue_capacity, 8);
        assert_eq!(config.tick_budget, Some(100));
        assert_eq!(config.unbounded().tick_budget, None);
    }

    #[test]
    fn overrides_apply_only_set_vars() {
        let mut config = EventLoopConfig::new().with_name("kept");
        config
            .apply_overrides_from(reader(&[(ENV_TICK_BUDGET, " 250 ")]))
            .expect("valid");
        assert_eq!(config.name, "kept");
        assert_eq!(config.tick_budget, Some(250));
        assert_eq!(config.queue_capacity, 64);
    }

    #[test]
    fn zero_budget_means_unlimited() {
        let mut config = EventLoopConfig::new().with_tick_budget(5);
        config
            .apply_overrides_from(reader(&[(ENV_TICK_BUDGET, "0")]))
            .expect("valid");
        assert_eq!(config.tick_budget, None);
    }

    #[test]
    fn invalid_value_is_reported() {
        let mut config = EventLoopConfig::new();
        let err = config
            .apply_overrides_from(reader(&[(ENV_QUEUE_CAPACITY, "-3")]))
            .expect_err("negative capacity");
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                var: ENV_QUEUE_CAPACITY.to_string(),
                value: "-3".to_string(),
                expected: "unsigned integer",
            }
        );
        assert!(err.to_string().contains("PROMISSORY_QUEUE_CAPACITY"));
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn toml_section_parses() {
        let config = EventLoopConfig::from_toml_str(
            "[event_loop]\nname = \"file-loop\"\ntick_budget = 0\nqueue_capacity = 4\n",
        )
        .expect("valid toml");
        assert_eq!(config.name, "file-loop");
        assert_eq!(config.queue_capacity, 4);
        assert_eq!(config.tick_budget, None);
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn toml_garbage_is_parse_error() {
        let err = EventLoopConfig::from_toml_str("[event_loop\n").expect_err("broken");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
