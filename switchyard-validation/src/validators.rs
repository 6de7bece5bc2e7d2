// Built-in validators

use crate::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static ALPHA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

static ALPHANUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

static NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").unwrap());

fn reject(field: &str, constraint: &str, message: String, value: &str) -> ValidationError {
    ValidationError::new(field, message)
        .with_constraint(constraint)
        .with_value(value)
}

fn pattern_check(
    regex: &Regex,
    value: &str,
    field: &str,
    constraint: &str,
    what: &str,
) -> Result<(), ValidationError> {
    if regex.is_match(value) {
        Ok(())
    } else {
        Err(reject(field, constraint, format!("{} must be {}", field, what), value))
    }
}

// String validators

/// Value must contain something other than whitespace
pub struct NotEmpty;

impl NotEmpty {
    pub fn validate(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(ValidationError::new(field, format!("{} should not be empty", field))
                .with_constraint("notEmpty"))
        } else {
            Ok(())
        }
    }
}

/// Minimum length in characters
pub struct MinLength(pub usize);

impl MinLength {
    pub fn validate(&self, value: &str, field: &str) -> Result<(), ValidationError> {
        if value.chars().count() < self.0 {
            Err(reject(
                field,
                "minLength",
                format!("{} must be at least {} characters", field, self.0),
                value,
            ))
        } else {
            Ok(())
        }
    }
}

/// Maximum length in characters
pub struct MaxLength(pub usize);

impl MaxLength {
    pub fn validate(&self, value: &str, field: &str) -> Result<(), ValidationError> {
        if value.chars().count() > self.0 {
            Err(reject(
                field,
                "maxLength",
                format!("{} must be at most {} characters", field, self.0),
                value,
            ))
        } else {
            Ok(())
        }
    }
}

pub struct IsEmail;

impl IsEmail {
    pub fn validate(value: &str, field: &str) -> Result<(), ValidationError> {
        pattern_check(&EMAIL_REGEX, value, field, "isEmail", "a valid email")
    }
}

pub struct IsUrl;

impl IsUrl {
    pub fn validate(value: &str, field: &str) -> Result<(), ValidationError> {
        pattern_check(&URL_REGEX, value, field, "isUrl", "a valid URL")
    }
}

pub struct IsUuid;

impl IsUuid {
    pub fn validate(value: &str, field: &str) -> Result<(), ValidationError> {
        pattern_check(&UUID_REGEX, value, field, "isUuid", "a valid UUID")
    }
}

pub struct IsAlpha;

impl IsAlpha {
    pub fn validate(value: &str, field: &str) -> Result<(), ValidationError> {
        pattern_check(&ALPHA_REGEX, value, field, "isAlpha", "letters only")
    }
}

pub struct IsAlphanumeric;

impl IsAlphanumeric {
    pub fn validate(value: &str, field: &str) -> Result<(), ValidationError> {
        pattern_check(
            &ALPHANUMERIC_REGEX,
            value,
            field,
            "isAlphanumeric",
            "letters and numbers only",
        )
    }
}

/// Decimal number, optionally negative
pub struct IsNumeric;

impl IsNumeric {
    pub fn validate(value: &str, field: &str) -> Result<(), ValidationError> {
        pattern_check(&NUMERIC_REGEX, value, field, "isNumeric", "a number")
    }
}

// Number validators

fn parse_number(value: &str, field: &str) -> Result<f64, ValidationError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| reject(field, "isNumeric", format!("{} must be a number", field), value))
}

/// Numeric lower bound, inclusive
pub struct Min(pub f64);

impl Min {
    pub fn validate(&self, value: &str, field: &str) -> Result<(), ValidationError> {
        if parse_number(value, field)? < self.0 {
            Err(reject(
                field,
                "min",
                format!("{} must be at least {}", field, self.0),
                value,
            ))
        } else {
            Ok(())
        }
    }
}

/// Numeric upper bound, inclusive
pub struct Max(pub f64);

impl Max {
    pub fn validate(&self, value: &str, field: &str) -> Result<(), ValidationError> {
        if parse_number(value, field)? > self.0 {
            Err(reject(
                field,
                "max",
                format!("{} must be at most {}", field, self.0),
                value,
            ))
        } else {
            Ok(())
        }
    }
}

pub struct InRange {
    pub min: f64,
    pub max: f64,
}

impl InRange {
    pub fn validate(&self, value: &str, field: &str) -> Result<(), ValidationError> {
        let number = parse_number(value, field)?;
        if (self.min..=self.max).contains(&number) {
            Ok(())
        } else {
            Err(reject(
                field,
                "inRange",
                format!("{} must be between {} and {}", field, self.min, self.max),
                value,
            ))
        }
    }
}

/// Custom regex validator
pub struct Matches(pub Regex);

impl Matches {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self(Regex::new(pattern)?))
    }

    pub fn validate(&self, value: &str, field: &str) -> Result<(), ValidationError> {
        if self.0.is_match(value) {
            Ok(())
        } else {
            Err(reject(
                field,
                "matches",
                format!("{} does not match required pattern", field),
                value,
            ))
        }
    }
}
