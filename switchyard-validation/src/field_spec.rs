//! Declarative field specs.
//!
//! A route declares its input checks as a list of [`FieldSpec`]s, usually
//! loaded from a route file:
//!
//! ```toml
//! [[mvc.input-validation.fields]]
//! name = "email"
//! required = true
//! rules = [{ rule = "email" }, { rule = "max-length", value = 120 }]
//! ```
//!
//! [`FieldSpecList`] compiles them once and implements the dispatcher's
//! [`InputValidator`] seam.

use crate::rules::input_text;
use crate::validators::*;
use crate::{ValidationError, ValidationErrors};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use switchyard_core::{InputError, InputValidator};

/// One check applied to a field's text value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum Rule {
    NotEmpty,
    MinLength { value: usize },
    MaxLength { value: usize },
    Email,
    Url,
    Uuid,
    Alpha,
    Alphanumeric,
    Numeric,
    Min { value: f64 },
    Max { value: f64 },
    Range { min: f64, max: f64 },
    Pattern { pattern: String },
}

/// Checks declared for a single input field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            rules: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }
}

enum CompiledRule {
    Plain(Rule),
    Pattern(Matches),
}

impl CompiledRule {
    fn check(&self, value: &str, field: &str) -> Result<(), ValidationError> {
        let rule = match self {
            CompiledRule::Pattern(matches) => return matches.validate(value, field),
            CompiledRule::Plain(rule) => rule,
        };

        match rule {
            Rule::NotEmpty => NotEmpty::validate(value, field),
            Rule::MinLength { value: n } => MinLength(*n).validate(value, field),
            Rule::MaxLength { value: n } => MaxLength(*n).validate(value, field),
            Rule::Email => IsEmail::validate(value, field),
            Rule::Url => IsUrl::validate(value, field),
            Rule::Uuid => IsUuid::validate(value, field),
            Rule::Alpha => IsAlpha::validate(value, field),
            Rule::Alphanumeric => IsAlphanumeric::validate(value, field),
            Rule::Numeric => IsNumeric::validate(value, field),
            Rule::Min { value: n } => Min(*n).validate(value, field),
            Rule::Max { value: n } => Max(*n).validate(value, field),
            Rule::Range { min, max } => InRange {
                min: *min,
                max: *max,
            }
            .validate(value, field),
            // Compiled into CompiledRule::Pattern up front.
            Rule::Pattern { .. } => Ok(()),
        }
    }
}

/// Compiled field specs for one route.
pub struct FieldSpecList {
    fields: Vec<(FieldSpec, Vec<CompiledRule>)>,
}

impl FieldSpecList {
    /// Compile the specs, failing on the first invalid `pattern` rule.
    pub fn new(specs: Vec<FieldSpec>) -> Result<Self, regex::Error> {
        let fields = specs
            .into_iter()
            .map(|spec| -> Result<_, regex::Error> {
                let compiled = spec
                    .rules
                    .iter()
                    .map(|rule| match rule {
                        Rule::Pattern { pattern } => Matches::new(pattern).map(CompiledRule::Pattern),
                        other => Ok(CompiledRule::Plain(other.clone())),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((spec, compiled))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { fields })
    }

    pub fn specs(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().map(|(spec, _)| spec)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check `input` against every field.
    ///
    /// A missing or null field fails only when it is required; otherwise
    /// its rules are skipped.
    pub fn check(&self, input: &HashMap<String, Value>) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        for (spec, rules) in &self.fields {
            let Some(text) = input.get(&spec.name).and_then(input_text) else {
                if spec.required {
                    errors.add(
                        ValidationError::new(&spec.name, format!("{} is required", spec.name))
                            .with_constraint("required"),
                    );
                }
                continue;
            };

            for rule in rules {
                if let Err(error) = rule.check(&text, &spec.name) {
                    errors.add(error);
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl InputValidator for FieldSpecList {
    fn validate(&self, input: &HashMap<String, Value>) -> Result<(), Vec<InputError>> {
        self.check(input).map_err(ValidationErrors::into_input_errors)
    }
}

impl std::fmt::Debug for FieldSpecList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.specs()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_required_and_optional_fields() {
        let list = FieldSpecList::new(vec![
            FieldSpec::new("email").required().rule(Rule::Email),
            FieldSpec::new("nickname").rule(Rule::MinLength { value: 3 }),
        ])
        .unwrap();

        assert!(list.check(&input(json!({"email": "a@b.io"}))).is_ok());

        let errors = list.check(&input(json!({"nickname": "x"}))).unwrap_err();
        let constraints: Vec<_> = errors.errors.iter().map(|e| e.constraint.as_str()).collect();
        assert_eq!(constraints, vec!["required", "minLength"]);

        let errors = list.check(&input(json!({"email": null}))).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_numbers_and_patterns() {
        let list = FieldSpecList::new(vec![
            FieldSpec::new("age").rule(Rule::Range { min: 18.0, max: 99.0 }),
            FieldSpec::new("slug").rule(Rule::Pattern {
                pattern: "^[a-z-]+$".into(),
            }),
        ])
        .unwrap();

        assert!(list.check(&input(json!({"age": 30, "slug": "a-b"}))).is_ok());
        assert_eq!(
            list.check(&input(json!({"age": 5, "slug": "A"}))).unwrap_err().len(),
            2
        );
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let spec = FieldSpec::new("code").rule(Rule::Pattern { pattern: "(".into() });
        assert!(FieldSpecList::new(vec![spec]).is_err());
    }

    #[test]
    fn test_rules_deserialize() {
        let spec: FieldSpec = serde_json::from_value(json!({
            "name": "email",
            "required": true,
            "rules": [{"rule": "email"}, {"rule": "max-length", "value": 120}]
        }))
        .unwrap();

        assert_eq!(spec.rules, vec![Rule::Email, Rule::MaxLength { value: 120 }]);
    }
}
