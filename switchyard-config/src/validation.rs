// Configuration validation

use crate::{ConfigError, Result};
use std::fmt::Display;
use switchyard_core::KEY_DELIMITER;

/// Implemented by configuration types that check themselves after loading
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Field-level checks for loaded configuration
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(invalid(format!("{} cannot be empty", field)));
        }
        Ok(())
    }

    pub fn in_range<T: PartialOrd + Display>(value: T, min: T, max: T, field: &str) -> Result<()> {
        if value < min || value > max {
            return Err(invalid(format!(
                "{} must be between {} and {}, got {}",
                field, min, max, value
            )));
        }
        Ok(())
    }

    pub fn one_of<T: PartialEq + Display>(value: &T, allowed: &[T], field: &str) -> Result<()> {
        if !allowed.contains(value) {
            let allowed: Vec<String> = allowed.iter().map(ToString::to_string).collect();
            return Err(invalid(format!(
                "{} must be one of [{}], got {}",
                field,
                allowed.join(", "),
                value
            )));
        }
        Ok(())
    }

    /// HTTP status codes usable as dispatch error codes (400-599)
    pub fn is_error_status(value: u16, field: &str) -> Result<()> {
        Self::in_range(value, 400, 599, field)
    }

    /// Dot-delimited route key with no empty segments
    pub fn is_route_key(value: &str, field: &str) -> Result<()> {
        if value.is_empty() || value.split(KEY_DELIMITER).any(str::is_empty) {
            return Err(invalid(format!(
                "{} must be a route key like 'admin.users', got '{}'",
                field, value
            )));
        }
        Ok(())
    }

    /// Controller method names are plain identifiers
    pub fn is_identifier(value: &str, field: &str) -> Result<()> {
        let mut chars = value.chars();
        let valid = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

        if !valid {
            return Err(invalid(format!("{} must be an identifier, got '{}'", field, value)));
        }
        Ok(())
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::ValidationError(message)
}
