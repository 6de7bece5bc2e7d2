//! Request context for the front controller pipeline.
//!
//! An [`MvcContext`] travels through pre-filters, the action and
//! post-filters. It carries the route key being served, the request input,
//! the caller's ACL codes, an exit code and whatever view the action
//! produced.

use crate::{HttpMethod, HttpStatus, InputError, is_success_code};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct MvcContext {
    route_key: String,
    method: HttpMethod,
    input: HashMap<String, Value>,
    acl: BTreeSet<String>,
    exit_code: u16,
    view: Option<Value>,
    validation_errors: Vec<InputError>,
    dispatch_depth: usize,
}

impl MvcContext {
    /// Fresh `GET` context for a route with a 200 exit code.
    pub fn new(route_key: impl Into<String>) -> Self {
        Self {
            route_key: route_key.into(),
            method: HttpMethod::GET,
            input: HashMap::new(),
            acl: BTreeSet::new(),
            exit_code: HttpStatus::Ok.code(),
            view: None,
            validation_errors: Vec::new(),
            dispatch_depth: 0,
        }
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.input.insert(key.into(), value.into());
        self
    }

    pub fn with_acl_code(mut self, code: impl Into<String>) -> Self {
        self.acl.insert(code.into());
        self
    }

    pub fn with_acl_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.acl.extend(codes.into_iter().map(Into::into));
        self
    }

    pub fn route_key(&self) -> &str {
        &self.route_key
    }

    pub fn set_route_key(&mut self, key: impl Into<String>) {
        self.route_key = key.into();
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn input(&self) -> &HashMap<String, Value> {
        &self.input
    }

    pub fn input_value(&self, key: &str) -> Option<&Value> {
        self.input.get(key)
    }

    pub fn set_input(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.input.insert(key.into(), value.into());
    }

    pub fn acl(&self) -> &BTreeSet<String> {
        &self.acl
    }

    pub fn has_acl_code(&self, code: &str) -> bool {
        self.acl.contains(code)
    }

    pub fn exit_code(&self) -> u16 {
        self.exit_code
    }

    pub fn set_exit_code(&mut self, code: u16) {
        self.exit_code = code;
    }

    pub fn view(&self) -> Option<&Value> {
        self.view.as_ref()
    }

    pub fn set_view(&mut self, view: impl Into<Value>) {
        self.view = Some(view.into());
    }

    /// Validation failures tolerated during dispatch.
    pub fn validation_errors(&self) -> &[InputError] {
        &self.validation_errors
    }

    pub fn add_validation_errors(&mut self, errors: impl IntoIterator<Item = InputError>) {
        self.validation_errors.extend(errors);
    }

    /// Number of dispatches currently running on this context's behalf.
    pub fn dispatch_depth(&self) -> usize {
        self.dispatch_depth
    }

    pub(crate) fn enter_dispatch(&mut self) {
        self.dispatch_depth += 1;
    }

    pub(crate) fn leave_dispatch(&mut self) {
        self.dispatch_depth = self.dispatch_depth.saturating_sub(1);
    }

    /// Whether the exit code still allows the action to run (2xx).
    pub fn is_dispatchable(&self) -> bool {
        is_success_code(self.exit_code)
    }

    /// Fold another context into this one.
    ///
    /// Input from `other` overwrites ours, ACL codes are unioned, the view
    /// is adopted when `other` has one and the exit code is always adopted.
    pub fn merge(&mut self, other: &MvcContext) {
        self.input
            .extend(other.input.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.acl.extend(other.acl.iter().cloned());
        if let Some(view) = &other.view {
            self.view = Some(view.clone());
        }
        self.exit_code = other.exit_code;
        self.validation_errors
            .extend(other.validation_errors.iter().cloned());
    }
}
