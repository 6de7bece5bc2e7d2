//! Result of a successful route match.

use crate::{Captures, RouteSpec};

/// Controller method invoked when a route does not name one.
pub const DEFAULT_METHOD: &str = "execute";

/// A matched route key bound to its controller and captures.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedRoute {
    key: String,
    controller: String,
    method: String,
    captures: Captures,
}

impl MatchedRoute {
    pub fn new(
        key: impl Into<String>,
        controller: impl Into<String>,
        method: Option<&str>,
        captures: Captures,
    ) -> Self {
        Self {
            key: key.into(),
            controller: controller.into(),
            method: method.unwrap_or(DEFAULT_METHOD).to_string(),
            captures,
        }
    }

    pub(crate) fn from_spec(spec: &RouteSpec, captures: Captures) -> Self {
        Self::new(spec.key(), spec.controller(), spec.controller_method(), captures)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn captures(&self) -> &Captures {
        &self.captures
    }

    pub fn into_captures(self) -> Captures {
        self.captures
    }
}
