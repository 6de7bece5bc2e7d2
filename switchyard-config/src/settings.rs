//! Framework settings.
//!
//! Settings are layered: built-in defaults, then each configuration file in
//! the order given, then an optional `.env` file, then `SWITCHYARD_*`
//! environment variables, then explicit overrides. Keys are matched
//! case-insensitively with `_` and `-` treated alike, so `max_dispatch_depth`,
//! `max-dispatch-depth` and `SWITCHYARD_MAX_DISPATCH_DEPTH` name the same
//! setting.

use crate::validation::{ConfigValidator, Validate};
use crate::{ConfigError, ConfigLoader, EnvLoader, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use switchyard_core::{
    DEFAULT_MAX_DISPATCH_DEPTH, DEFAULT_METHOD, Dispatcher, FrontController, HttpStatus,
    LogConfig, LogFormat, LogLevel, RouteRegistry,
};

/// Largest recursion limit accepted for nested dispatch.
pub const MAX_DISPATCH_DEPTH_LIMIT: usize = 256;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 4] = ["json", "plain", "pretty", "compact"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// Nested dispatches allowed before `LoopDetected`.
    pub max_dispatch_depth: usize,
    /// Controller method used by routes that do not name one.
    pub default_controller_method: String,
    /// Status for failed input validation when a route declares no code.
    pub default_validation_error_code: u16,
    pub log_level: String,
    pub log_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_dispatch_depth: DEFAULT_MAX_DISPATCH_DEPTH,
            default_controller_method: DEFAULT_METHOD.to_string(),
            default_validation_error_code: HttpStatus::BadRequest.code(),
            log_level: "info".to_string(),
            log_format: "json".to_string(),
        }
    }
}

impl Settings {
    pub fn loader() -> SettingsLoader {
        SettingsLoader::new()
    }

    /// Defaults overlaid with `SWITCHYARD_*` environment variables.
    pub fn from_env() -> Result<Self> {
        SettingsLoader::new().load()
    }

    /// Logging configuration for the configured level and format.
    pub fn log_config(&self) -> Result<LogConfig> {
        let level = LogLevel::from_str(&self.log_level).ok_or_else(|| {
            ConfigError::ValidationError(format!("unknown log level '{}'", self.log_level))
        })?;
        let format = LogFormat::from_str(&self.log_format).ok_or_else(|| {
            ConfigError::ValidationError(format!("unknown log format '{}'", self.log_format))
        })?;

        Ok(LogConfig::new().level(level).format(format))
    }

    pub fn dispatcher(&self, registry: Arc<RouteRegistry>) -> Dispatcher {
        Dispatcher::new(registry).with_max_depth(self.max_dispatch_depth)
    }

    pub fn front_controller(&self, registry: Arc<RouteRegistry>) -> FrontController {
        FrontController::from_dispatcher(self.dispatcher(registry))
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        ConfigValidator::in_range(
            self.max_dispatch_depth,
            1,
            MAX_DISPATCH_DEPTH_LIMIT,
            "max-dispatch-depth",
        )?;
        ConfigValidator::is_identifier(&self.default_controller_method, "default-controller-method")?;
        ConfigValidator::is_error_status(
            self.default_validation_error_code,
            "default-validation-error-code",
        )?;
        ConfigValidator::one_of(&self.log_level.to_lowercase().as_str(), &LOG_LEVELS, "log-level")?;
        ConfigValidator::one_of(&self.log_format.to_lowercase().as_str(), &LOG_FORMATS, "log-format")?;
        Ok(())
    }
}

/// Builds [`Settings`] from layered sources.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    files: Vec<PathBuf>,
    dotenv: Option<PathBuf>,
    env: Option<EnvLoader>,
    overrides: Map<String, Value>,
}

impl SettingsLoader {
    /// Defaults plus `SWITCHYARD_*` environment variables.
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            dotenv: None,
            env: Some(EnvLoader::default()),
            overrides: Map::new(),
        }
    }

    /// Layer a JSON, TOML or `.env` file. Unrelated keys, such as a route
    /// file's `routes` table, are ignored.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Layer prefixed variables from a `.env` file, below the real
    /// environment.
    pub fn dotenv(mut self, path: impl Into<PathBuf>) -> Self {
        self.dotenv = Some(path.into());
        self
    }

    pub fn env(mut self, loader: EnvLoader) -> Self {
        self.env = Some(loader);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.env = None;
        self
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.overrides.insert(normalize_key(key), value.into());
        self
    }

    pub fn load(self) -> Result<Settings> {
        let mut merged = Map::new();

        for path in &self.files {
            merge_object(&mut merged, load_object(path)?);
        }

        if let Some(env) = &self.env {
            if let Some(path) = &self.dotenv {
                merge_strings(&mut merged, env.load_dotenv(path)?);
            }
            merge_strings(&mut merged, env.load());
        }

        merged.extend(self.overrides);

        let settings: Settings = serde_json::from_value(Value::Object(merged))
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn load_object(path: &Path) -> Result<Map<String, Value>> {
    match ConfigLoader::auto(path)?.load_file(path)? {
        Value::Object(map) => Ok(map),
        other => Err(ConfigError::ParseError(format!(
            "{}: expected a table of settings, found {}",
            path.display(),
            other
        ))),
    }
}

fn merge_object(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        let value = match value {
            Value::String(text) => coerce(text),
            other => other,
        };
        target.insert(normalize_key(&key), value);
    }
}

fn merge_strings(target: &mut Map<String, Value>, source: HashMap<String, String>) {
    for (key, value) in source {
        target.insert(normalize_key(&key), coerce(value));
    }
}

fn normalize_key(key: &str) -> String {
    key.to_lowercase().replace('_', "-")
}

/// Environment values are untyped text; numbers and booleans are parsed so
/// they deserialize into typed fields.
fn coerce(text: String) -> Value {
    if let Ok(n) = text.parse::<u64>() {
        return Value::from(n);
    }
    match text.as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(text),
    }
}
