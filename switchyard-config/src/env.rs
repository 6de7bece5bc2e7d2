// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;
use std::path::Path;

/// Prefix applied to settings read from the environment.
pub const DEFAULT_ENV_PREFIX: &str = "SWITCHYARD";

/// Reads prefixed environment variables as lowercase setting names.
///
/// With prefix `SWITCHYARD`, `SWITCHYARD_MAX_DISPATCH_DEPTH` becomes
/// `max_dispatch_depth`.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Load matching variables from the process environment
    pub fn load(&self) -> HashMap<String, String> {
        self.collect(env::vars())
    }

    /// Load matching pairs from any source of variables
    pub fn collect<I>(&self, vars: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        vars.into_iter()
            .filter_map(|(key, value)| self.setting_name(&key).map(|name| (name, value)))
            .collect()
    }

    /// Load matching pairs from a `.env` file without touching the process
    /// environment.
    pub fn load_dotenv(&self, path: impl AsRef<Path>) -> Result<HashMap<String, String>> {
        let path = path.as_ref();
        let pairs = dotenvy::from_path_iter(path)
            .map_err(|e| ConfigError::LoadError(format!("{}: {}", path.display(), e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

        Ok(self.collect(pairs))
    }

    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.variable_name(key)).map_err(ConfigError::EnvError)
    }

    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Full variable name for a setting, e.g. `SWITCHYARD_LOG_LEVEL`.
    pub fn variable_name(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    fn setting_name(&self, key: &str) -> Option<String> {
        let Some(prefix) = &self.prefix else {
            return Some(key.to_lowercase());
        };

        key.strip_prefix(prefix.as_str())
            .and_then(|rest| rest.strip_prefix('_'))
            .filter(|rest| !rest.is_empty())
            .map(str::to_lowercase)
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(Some(DEFAULT_ENV_PREFIX.to_string()))
    }
}
