// Closure-based validation rules over context input

use crate::ValidationError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use switchyard_core::{InputError, InputValidator};

type ValidatorFn = Arc<dyn Fn(&str, &str) -> Result<(), ValidationError> + Send + Sync>;

/// Text form of an input value, `None` for null.
///
/// Strings are taken as-is; numbers, booleans and nested JSON use their
/// JSON rendering.
pub fn input_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Rules for one input field
#[derive(Clone)]
pub struct ValidationRules {
    validators: Vec<ValidatorFn>,
    field: String,
}

impl ValidationRules {
    pub fn for_field(field: impl Into<String>) -> Self {
        Self {
            validators: Vec::new(),
            field: field.into(),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add<F>(mut self, validator: F) -> Self
    where
        F: Fn(&str, &str) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Run every rule, collecting all failures.
    pub fn validate(&self, value: &str) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<_> = self
            .validators
            .iter()
            .filter_map(|validator| validator(value, &self.field).err())
            .collect();

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Rules for a whole input map. Absent or null fields are skipped.
#[derive(Clone, Default)]
pub struct ValidationBuilder {
    rules: Vec<ValidationRules>,
}

impl ValidationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, rules: ValidationRules) -> Self {
        self.rules.push(rules);
        self
    }

    pub fn validate(&self, input: &HashMap<String, Value>) -> Result<(), Vec<ValidationError>> {
        let mut all_errors = Vec::new();

        for rule in &self.rules {
            if let Some(text) = input.get(&rule.field).and_then(input_text) {
                if let Err(mut errors) = rule.validate(&text) {
                    all_errors.append(&mut errors);
                }
            }
        }

        if all_errors.is_empty() {
            Ok(())
        } else {
            Err(all_errors)
        }
    }
}

impl InputValidator for ValidationBuilder {
    fn validate(&self, input: &HashMap<String, Value>) -> Result<(), Vec<InputError>> {
        ValidationBuilder::validate(self, input)
            .map_err(|errors| errors.into_iter().map(InputError::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::*;
    use serde_json::json;

    fn input(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn signup() -> ValidationBuilder {
        ValidationBuilder::new()
            .field(ValidationRules::for_field("name").add(|v, f| NotEmpty::validate(v, f)))
            .field(
                ValidationRules::for_field("email")
                    .add(|v, f| NotEmpty::validate(v, f))
                    .add(|v, f| IsEmail::validate(v, f)),
            )
            .field(ValidationRules::for_field("age").add(|v, f| Min(18.0).validate(v, f)))
    }

    #[test]
    fn test_rules_collect_every_failure() {
        let rules = ValidationRules::for_field("email")
            .add(|v, f| NotEmpty::validate(v, f))
            .add(|v, f| IsEmail::validate(v, f));

        assert!(rules.validate("a@b.co").is_ok());
        assert_eq!(rules.validate("").unwrap_err().len(), 2);
    }

    #[test]
    fn test_builder_reads_json_input() {
        let ok = input(&[("name", json!("Ada")), ("email", json!("ada@x.io")), ("age", json!(36))]);
        assert!(signup().validate(&ok).is_ok());

        let bad = input(&[("name", json!("")), ("age", json!(12))]);
        let errors = signup().validate(&bad).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "age"]);
    }

    #[test]
    fn test_as_input_validator() {
        let validator: Arc<dyn InputValidator> = Arc::new(signup());
        let errors = validator
            .validate(&input(&[("email", json!("nope"))]))
            .unwrap_err();
        assert_eq!(errors, vec![InputError::new("email", "email must be a valid email")]);
    }
}
