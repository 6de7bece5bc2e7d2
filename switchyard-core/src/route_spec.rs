//! Route definitions.
//!
//! [`RouteData`] is the loose shape routes arrive in from configuration;
//! [`RouteSpec`] is the validated, immutable definition built from it.

use crate::{Error, HttpMethod};
use serde::{Deserialize, Serialize};

/// Delimiter separating the segments of a hierarchical route key.
pub const KEY_DELIMITER: char = '.';

/// A raw route pattern: either a bare regex body or `[body, modifiers]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPattern {
    Plain(String),
    WithModifiers(String, String),
}

impl RawPattern {
    pub fn body(&self) -> &str {
        match self {
            RawPattern::Plain(body) | RawPattern::WithModifiers(body, _) => body,
        }
    }

    pub fn modifiers(&self) -> &str {
        match self {
            RawPattern::Plain(_) => "",
            RawPattern::WithModifiers(_, modifiers) => modifiers,
        }
    }
}

impl From<&str> for RawPattern {
    fn from(body: &str) -> Self {
        RawPattern::Plain(body.to_string())
    }
}

impl From<(&str, &str)> for RawPattern {
    fn from((body, modifiers): (&str, &str)) -> Self {
        RawPattern::WithModifiers(body.to_string(), modifiers.to_string())
    }
}

/// Unvalidated route definition as supplied by a configuration loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RouteData {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub pattern: Option<RawPattern>,
    #[serde(default)]
    pub controller: Option<String>,
    #[serde(default)]
    pub controller_method: Option<String>,
    #[serde(default, alias = "params")]
    pub route_params: Vec<String>,
    #[serde(default)]
    pub http_method: Option<HttpMethod>,
}

impl RouteData {
    pub fn new(
        key: impl Into<String>,
        pattern: impl Into<RawPattern>,
        controller: impl Into<String>,
    ) -> Self {
        Self {
            key: Some(key.into()),
            pattern: Some(pattern.into()),
            controller: Some(controller.into()),
            ..Self::default()
        }
    }

    pub fn controller_method(mut self, method: impl Into<String>) -> Self {
        self.controller_method = Some(method.into());
        self
    }

    pub fn params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.route_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn http_method(mut self, method: HttpMethod) -> Self {
        self.http_method = Some(method);
        self
    }
}

/// Immutable definition of a single route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSpec {
    key: String,
    pattern: String,
    controller: String,
    controller_method: Option<String>,
    params: Vec<String>,
    http_method: Option<HttpMethod>,
}

impl RouteSpec {
    /// Create a spec; `key`, `pattern` and `controller` must be non-empty.
    pub fn new(
        key: impl Into<String>,
        pattern: impl Into<String>,
        controller: impl Into<String>,
    ) -> Result<Self, Error> {
        let key = required("key", key.into())?;
        let pattern = required("pattern", pattern.into())?;
        let controller = required("controller", controller.into())?;

        if key.split(KEY_DELIMITER).any(str::is_empty) {
            return Err(Error::InvalidRoute(format!(
                "route key '{}' contains an empty segment",
                key
            )));
        }

        Ok(Self {
            key,
            pattern,
            controller,
            controller_method: None,
            params: Vec::new(),
            http_method: None,
        })
    }

    /// Validate raw route data, taking the pattern body verbatim.
    pub fn from_data(data: &RouteData) -> Result<Self, Error> {
        let pattern = data
            .pattern
            .as_ref()
            .map(|p| p.body().to_string())
            .unwrap_or_default();

        let spec = Self::new(
            data.key.clone().unwrap_or_default(),
            pattern,
            data.controller.clone().unwrap_or_default(),
        )?
        .with_params(data.route_params.clone());

        let spec = match &data.controller_method {
            Some(method) => spec.with_controller_method(method.clone()),
            None => spec,
        };

        Ok(match data.http_method {
            Some(method) => spec.with_http_method(method),
            None => spec,
        })
    }

    pub fn with_controller_method(mut self, method: impl Into<String>) -> Self {
        let method = method.into();
        self.controller_method = (!method.is_empty()).then_some(method);
        self
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_http_method(mut self, method: HttpMethod) -> Self {
        self.http_method = Some(method);
        self
    }

    /// Same definition with a different (usually compiled) pattern.
    pub(crate) fn with_pattern(mut self, pattern: String) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn controller_method(&self) -> Option<&str> {
        self.controller_method.as_deref()
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn http_method(&self) -> Option<HttpMethod> {
        self.http_method
    }

    /// Number of delimiters in the key; root routes have depth 0.
    pub fn depth(&self) -> usize {
        self.key.matches(KEY_DELIMITER).count()
    }

    /// Final segment of the key, used as the child slot name.
    pub fn suffix(&self) -> &str {
        self.key
            .rsplit(KEY_DELIMITER)
            .next()
            .unwrap_or(self.key.as_str())
    }
}

fn required(field: &str, value: String) -> Result<String, Error> {
    if value.trim().is_empty() {
        Err(Error::InvalidRoute(format!(
            "route {} is required and must not be empty",
            field
        )))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_supplied_values() {
        let spec = RouteSpec::new("users", "^/users$", "UsersController")
            .unwrap()
            .with_controller_method("index")
            .with_params(["id"])
            .with_http_method(HttpMethod::GET);

        assert_eq!(spec.key(), "users");
        assert_eq!(spec.pattern(), "^/users$");
        assert_eq!(spec.controller(), "UsersController");
        assert_eq!(spec.controller_method(), Some("index"));
        assert_eq!(spec.params(), ["id".to_string()]);
        assert_eq!(spec.http_method(), Some(HttpMethod::GET));
    }

    #[test]
    fn test_missing_required_fields() {
        assert!(matches!(
            RouteSpec::new("", "^/$", "Home"),
            Err(Error::InvalidRoute(_))
        ));
        assert!(RouteSpec::new("home", "", "Home").is_err());
        assert!(RouteSpec::new("home", "^/$", "  ").is_err());
    }

    #[test]
    fn test_empty_key_segment_rejected() {
        assert!(RouteSpec::new("admin..users", "^/u", "Users").is_err());
        assert!(RouteSpec::new(".admin", "^/a", "Admin").is_err());
    }

    #[test]
    fn test_depth_and_suffix() {
        let spec = RouteSpec::new("admin.users.edit", "^/edit", "Edit").unwrap();
        assert_eq!(spec.depth(), 2);
        assert_eq!(spec.suffix(), "edit");

        let root = RouteSpec::new("admin", "^/admin", "Admin").unwrap();
        assert_eq!(root.depth(), 0);
        assert_eq!(root.suffix(), "admin");
    }

    #[test]
    fn test_from_data_requires_fields() {
        let data = RouteData {
            key: Some("home".into()),
            ..RouteData::default()
        };
        assert!(RouteSpec::from_data(&data).is_err());

        let data = RouteData::new("home", ("^/$", "i"), "Home").params(["a", "b"]);
        let spec = RouteSpec::from_data(&data).unwrap();
        assert_eq!(spec.pattern(), "^/$");
        assert_eq!(spec.params().len(), 2);
        assert_eq!(spec.controller_method(), None);
    }

    #[test]
    fn test_route_data_deserializes_both_pattern_shapes() {
        let plain: RouteData = serde_json::from_str(
            r#"{"key": "users", "pattern": "^/users", "controller": "Users"}"#,
        )
        .unwrap();
        assert_eq!(plain.pattern, Some(RawPattern::Plain("^/users".into())));

        let flagged: RouteData = serde_json::from_str(
            r#"{"key": "foo", "pattern": ["foo(bar)?", "i"], "controller": "Foo",
                "route-params": ["bar"], "http-method": "get"}"#,
        )
        .unwrap();
        assert_eq!(
            flagged.pattern,
            Some(RawPattern::WithModifiers("foo(bar)?".into(), "i".into()))
        );
        assert_eq!(flagged.route_params, vec!["bar".to_string()]);
        assert_eq!(flagged.http_method, Some(HttpMethod::GET));
    }
}
