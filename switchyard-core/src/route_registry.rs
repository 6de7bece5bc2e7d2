//! Per-route dispatch metadata for the front controller.
//!
//! A [`RouteRegistry`] is built once at startup and shared behind an `Arc`.
//! It answers, for a route key: which filters wrap it ([`RouteDetail`]),
//! which action runs it ([`ActionSpec`]), who may call it ([`AccessSpec`])
//! and how its input is checked ([`InputValidationSpec`]).

use crate::logging::debug;
use crate::{ActionRegistry, Error, HttpMethod, HttpStatus, InterceptChain, InterceptFilter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// Filter configuration for one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RouteDetail {
    pub key: String,
    pub pre_filtering: bool,
    pub post_filtering: bool,
    pub pre_filters: Vec<String>,
    pub post_filters: Vec<String>,
    pub exclude_pre_filters: Vec<String>,
    pub exclude_post_filters: Vec<String>,
}

impl Default for RouteDetail {
    fn default() -> Self {
        Self {
            key: String::new(),
            pre_filtering: true,
            post_filtering: true,
            pre_filters: Vec::new(),
            post_filters: Vec::new(),
            exclude_pre_filters: Vec::new(),
            exclude_post_filters: Vec::new(),
        }
    }
}

impl RouteDetail {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn pre_filter(mut self, name: impl Into<String>) -> Self {
        self.pre_filters.push(name.into());
        self
    }

    pub fn post_filter(mut self, name: impl Into<String>) -> Self {
        self.post_filters.push(name.into());
        self
    }

    pub fn exclude_pre_filter(mut self, name: impl Into<String>) -> Self {
        self.exclude_pre_filters.push(name.into());
        self
    }

    pub fn exclude_post_filter(mut self, name: impl Into<String>) -> Self {
        self.exclude_post_filters.push(name.into());
        self
    }

    pub fn disable_pre_filtering(mut self) -> Self {
        self.pre_filtering = false;
        self
    }

    pub fn disable_post_filtering(mut self) -> Self {
        self.post_filtering = false;
        self
    }

    pub fn is_pre_filtering_enabled(&self) -> bool {
        self.pre_filtering
    }

    pub fn is_post_filtering_enabled(&self) -> bool {
        self.post_filtering
    }

    fn referenced_filters(&self) -> impl Iterator<Item = &String> {
        self.pre_filters
            .iter()
            .chain(&self.post_filters)
            .chain(&self.exclude_pre_filters)
            .chain(&self.exclude_post_filters)
    }
}

/// Names the action that runs a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub action: String,
}

impl ActionSpec {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
        }
    }
}

/// ACL codes allowed to reach a route.
///
/// Codes listed for a specific method take precedence over `any`. A route
/// whose effective list is empty is public.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessSpec {
    pub any: Vec<String>,
    pub methods: HashMap<HttpMethod, Vec<String>>,
}

impl AccessSpec {
    pub fn public() -> Self {
        Self::default()
    }

    /// Allow these codes for every method.
    pub fn allow<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.any.extend(codes.into_iter().map(Into::into));
        self
    }

    /// Allow these codes for one method only.
    pub fn allow_method<I, S>(mut self, method: HttpMethod, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods
            .entry(method)
            .or_default()
            .extend(codes.into_iter().map(Into::into));
        self
    }

    pub fn allowed_codes(&self, method: HttpMethod) -> &[String] {
        self.methods.get(&method).unwrap_or(&self.any)
    }

    /// Whether a caller holding `acl` may use `method` on this route.
    pub fn permits(&self, method: HttpMethod, acl: &BTreeSet<String>) -> bool {
        let allowed = self.allowed_codes(method);
        allowed.is_empty() || allowed.iter().any(|code| acl.contains(code))
    }
}

/// A single field-level input failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputError {
    pub field: String,
    pub message: String,
}

impl InputError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Checks a context's input map.
pub trait InputValidator: Send + Sync {
    fn validate(&self, input: &HashMap<String, Value>) -> Result<(), Vec<InputError>>;
}

/// How and whether a route's input is validated before its action runs.
#[derive(Clone)]
pub struct InputValidationSpec {
    pub enabled: bool,
    pub throw_on_failure: bool,
    pub error_code: u16,
    pub validator: Arc<dyn InputValidator>,
}

impl InputValidationSpec {
    /// Enabled, failing with 400 on invalid input.
    pub fn new(validator: Arc<dyn InputValidator>) -> Self {
        Self {
            enabled: true,
            throw_on_failure: true,
            error_code: HttpStatus::BadRequest.code(),
            validator,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn throw_on_failure(mut self, throw: bool) -> Self {
        self.throw_on_failure = throw;
        self
    }

    pub fn error_code(mut self, code: u16) -> Self {
        self.error_code = code;
        self
    }
}

impl fmt::Debug for InputValidationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputValidationSpec")
            .field("enabled", &self.enabled)
            .field("throw_on_failure", &self.throw_on_failure)
            .field("error_code", &self.error_code)
            .finish_non_exhaustive()
    }
}

/// Immutable dispatch metadata keyed by route key.
#[derive(Default)]
pub struct RouteRegistry {
    details: HashMap<String, RouteDetail>,
    actions: HashMap<String, ActionSpec>,
    access: HashMap<String, AccessSpec>,
    input_validation: HashMap<String, InputValidationSpec>,
    action_factories: ActionRegistry,
    filters: HashMap<String, Arc<dyn InterceptFilter>>,
    global_pre_filters: Vec<String>,
    global_post_filters: Vec<String>,
}

impl RouteRegistry {
    pub fn builder() -> RouteRegistryBuilder {
        RouteRegistryBuilder::default()
    }

    pub fn detail(&self, key: &str) -> Option<&RouteDetail> {
        self.details.get(key)
    }

    pub fn action(&self, key: &str) -> Option<&ActionSpec> {
        self.actions.get(key)
    }

    pub fn access(&self, key: &str) -> Option<&AccessSpec> {
        self.access.get(key)
    }

    pub fn input_validation(&self, key: &str) -> Option<&InputValidationSpec> {
        self.input_validation.get(key)
    }

    pub fn filter(&self, name: &str) -> Option<&Arc<dyn InterceptFilter>> {
        self.filters.get(name)
    }

    pub fn action_factories(&self) -> &ActionRegistry {
        &self.action_factories
    }

    pub fn route_keys(&self) -> impl Iterator<Item = &str> {
        self.details.keys().map(String::as_str)
    }

    /// Global pre-filters then the route's own, minus its exclusions.
    pub fn pre_filter_chain(&self, detail: &RouteDetail) -> Result<InterceptChain, Error> {
        self.chain(
            &self.global_pre_filters,
            &detail.pre_filters,
            &detail.exclude_pre_filters,
        )
    }

    /// Global post-filters then the route's own, minus its exclusions.
    pub fn post_filter_chain(&self, detail: &RouteDetail) -> Result<InterceptChain, Error> {
        self.chain(
            &self.global_post_filters,
            &detail.post_filters,
            &detail.exclude_post_filters,
        )
    }

    fn chain(
        &self,
        global: &[String],
        own: &[String],
        excluded: &[String],
    ) -> Result<InterceptChain, Error> {
        let mut chain = InterceptChain::new();
        for name in global.iter().chain(own) {
            if excluded.contains(name) || chain.names().contains(&name.as_str()) {
                continue;
            }
            let filter = self.filters.get(name).ok_or_else(|| {
                Error::InvalidRegistry(format!("filter '{}' is not registered", name))
            })?;
            chain.push(name.clone(), Arc::clone(filter));
        }
        Ok(chain)
    }
}

impl fmt::Debug for RouteRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut filters: Vec<_> = self.filters.keys().collect();
        filters.sort();
        f.debug_struct("RouteRegistry")
            .field("details", &self.details)
            .field("actions", &self.actions)
            .field("access", &self.access)
            .field("input_validation", &self.input_validation)
            .field("action_factories", &self.action_factories)
            .field("filters", &filters)
            .field("global_pre_filters", &self.global_pre_filters)
            .field("global_post_filters", &self.global_post_filters)
            .finish()
    }
}

/// Builder for [`RouteRegistry`].
#[derive(Default)]
pub struct RouteRegistryBuilder {
    registry: RouteRegistry,
}

impl RouteRegistryBuilder {
    pub fn route(mut self, detail: RouteDetail) -> Self {
        self.registry.details.insert(detail.key.clone(), detail);
        self
    }

    pub fn action(mut self, key: impl Into<String>, spec: ActionSpec) -> Self {
        self.registry.actions.insert(key.into(), spec);
        self
    }

    pub fn access(mut self, key: impl Into<String>, spec: AccessSpec) -> Self {
        self.registry.access.insert(key.into(), spec);
        self
    }

    pub fn input_validation(mut self, key: impl Into<String>, spec: InputValidationSpec) -> Self {
        self.registry.input_validation.insert(key.into(), spec);
        self
    }

    /// Register an executable action factory.
    pub fn register_action<A, F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        A: crate::Action + 'static,
        F: Fn() -> A + Send + Sync + 'static,
    {
        self.registry.action_factories.register(name, factory);
        self
    }

    /// Replace the action factories wholesale.
    pub fn actions(mut self, actions: ActionRegistry) -> Self {
        self.registry.action_factories = actions;
        self
    }

    pub fn filter(mut self, name: impl Into<String>, filter: Arc<dyn InterceptFilter>) -> Self {
        self.registry.filters.insert(name.into(), filter);
        self
    }

    pub fn filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = (S, Arc<dyn InterceptFilter>)>,
        S: Into<String>,
    {
        self.registry
            .filters
            .extend(filters.into_iter().map(|(name, filter)| (name.into(), filter)));
        self
    }

    /// Pre-filter applied ahead of every route's own list.
    pub fn global_pre_filter(mut self, name: impl Into<String>) -> Self {
        self.registry.global_pre_filters.push(name.into());
        self
    }

    /// Post-filter applied ahead of every route's own list.
    pub fn global_post_filter(mut self, name: impl Into<String>) -> Self {
        self.registry.global_post_filters.push(name.into());
        self
    }

    /// Finish the registry, rejecting references to unregistered filters.
    pub fn build(self) -> Result<RouteRegistry, Error> {
        let registry = self.registry;

        let globals = registry
            .global_pre_filters
            .iter()
            .chain(&registry.global_post_filters)
            .map(|name| ("<global>", name));
        let per_route = registry
            .details
            .values()
            .flat_map(|d| d.referenced_filters().map(move |name| (d.key.as_str(), name)));

        for (route, name) in globals.chain(per_route) {
            if !registry.filters.contains_key(name) {
                return Err(Error::InvalidRegistry(format!(
                    "route '{}' references unregistered filter '{}'",
                    route, name
                )));
            }
        }

        debug!(
            routes = registry.details.len(),
            filters = registry.filters.len(),
            actions = registry.action_factories.len(),
            "route registry built"
        );
        Ok(registry)
    }
}
