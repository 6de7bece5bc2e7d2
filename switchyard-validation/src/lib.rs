//! Input validation for Switchyard routes
//!
//! Routes that declare input validation are checked by the dispatcher
//! before their action runs. This crate supplies the validators behind that
//! check: built-in string and number validators, closure-based
//! [`ValidationBuilder`] rules, and declarative [`FieldSpecList`]s that route
//! files compile into.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use switchyard_core::InputValidationSpec;
//! use switchyard_validation::{FieldSpec, FieldSpecList, Rule};
//!
//! let fields = FieldSpecList::new(vec![
//!     FieldSpec::new("email").required().rule(Rule::Email),
//!     FieldSpec::new("age").rule(Rule::Min { value: 18.0 }),
//! ])
//! .unwrap();
//!
//! let spec = InputValidationSpec::new(Arc::new(fields)).error_code(422);
//! assert!(spec.enabled);
//! ```
//!
//! ```
//! use switchyard_validation::{ValidationRules, NotEmpty, MinLength};
//!
//! let rules = ValidationRules::for_field("username")
//!     .add(|value, field| NotEmpty::validate(value, field))
//!     .add(|value, field| MinLength(3).validate(value, field));
//!
//! assert!(rules.validate("ada").is_ok());
//! assert!(rules.validate("a").is_err());
//! ```

mod errors;
mod field_spec;
mod rules;
pub mod validators;

pub use errors::*;
pub use field_spec::*;
pub use rules::*;
pub use validators::*;
