//! Route files.
//!
//! A route file declares the URI routes and the MVC dispatch table in one
//! document:
//!
//! ```toml
//! global-pre-filters = ["session"]
//!
//! [[routes]]
//! key = "users"
//! pattern = "^/users"
//! controller = "UserController"
//!
//! [[routes]]
//! key = "users.show"
//! pattern = ["^/(\\d+)$", "i"]
//! controller = "UserController"
//! controller-method = "show"
//! route-params = ["id"]
//!
//! [[mvc]]
//! key = "users.register"
//! action = "RegisterUser"
//! post-filters = ["audit"]
//! access = { any = ["member"] }
//!
//! [mvc.input-validation]
//! error-code = 422
//! fields = [{ name = "email", required = true, rules = [{ rule = "email" }] }]
//! ```

use crate::validation::ConfigValidator;
use crate::{ConfigError, ConfigLoader, FileFormat, Result, Settings};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use switchyard_core::{
    AccessSpec, ActionRegistry, ActionSpec, HttpStatus, InputValidationSpec, InterceptFilter,
    RouteCollection, RouteCollectionBuilder, RouteData, RouteDetail, RouteRegistry,
};
use switchyard_validation::{FieldSpec, FieldSpecList};

/// Input validation as declared for one MVC route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct InputValidationEntry {
    pub enabled: bool,
    pub throw_on_failure: bool,
    /// Falls back to the settings default, then 400.
    pub error_code: Option<u16>,
    pub fields: Vec<FieldSpec>,
}

impl Default for InputValidationEntry {
    fn default() -> Self {
        Self {
            enabled: true,
            throw_on_failure: true,
            error_code: None,
            fields: Vec::new(),
        }
    }
}

/// One `[[mvc]]` table: filter configuration plus what to dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MvcRouteEntry {
    #[serde(flatten)]
    pub detail: RouteDetail,
    pub action: String,
    #[serde(default)]
    pub access: Option<AccessSpec>,
    #[serde(default)]
    pub input_validation: Option<InputValidationEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RouteFile {
    pub routes: Vec<RouteData>,
    pub mvc: Vec<MvcRouteEntry>,
    pub global_pre_filters: Vec<String>,
    pub global_post_filters: Vec<String>,
}

impl RouteFile {
    /// Load a JSON or TOML route file, picking the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let value = ConfigLoader::auto(path)?.load_file(path)?;
        Self::from_value(value)
    }

    pub fn parse(content: &str, format: FileFormat) -> Result<Self> {
        if format == FileFormat::Env {
            return Err(ConfigError::LoadError(
                "route files must be JSON or TOML".to_string(),
            ));
        }
        Self::from_value(ConfigLoader::new(format).parse(content)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::DeserializationError(e.to_string()))
    }

    /// Fill in what routes leave unspecified from `settings`: the controller
    /// method and the input-validation error code.
    pub fn apply_settings(&mut self, settings: &Settings) {
        for route in &mut self.routes {
            if route.controller_method.is_none() {
                route.controller_method = Some(settings.default_controller_method.clone());
            }
        }

        for validation in self.mvc.iter_mut().filter_map(|e| e.input_validation.as_mut()) {
            validation
                .error_code
                .get_or_insert(settings.default_validation_error_code);
        }
    }

    /// Build the URI route tree from `[[routes]]`.
    pub fn into_route_collection(self) -> Result<RouteCollection> {
        let mut builder = RouteCollectionBuilder::new();
        builder.load_routes(self.routes)?;
        Ok(builder.create_route_collection()?)
    }

    /// Build the dispatch registry from `[[mvc]]`, resolving action names
    /// through `actions` and filter names through `filters`.
    pub fn into_route_registry<I, S>(self, actions: ActionRegistry, filters: I) -> Result<RouteRegistry>
    where
        I: IntoIterator<Item = (S, Arc<dyn InterceptFilter>)>,
        S: Into<String>,
    {
        let mut builder = RouteRegistry::builder().actions(actions).filters(filters);

        for name in self.global_pre_filters {
            builder = builder.global_pre_filter(name);
        }
        for name in self.global_post_filters {
            builder = builder.global_post_filter(name);
        }

        for entry in self.mvc {
            let key = entry.detail.key.clone();
            ConfigValidator::is_route_key(&key, "mvc.key")?;
            ConfigValidator::not_empty(&entry.action, &format!("mvc '{}' action", key))?;

            builder = builder
                .route(entry.detail)
                .action(key.clone(), ActionSpec::new(entry.action));

            if let Some(access) = entry.access {
                builder = builder.access(key.clone(), access);
            }

            if let Some(validation) = entry.input_validation {
                let fields =
                    FieldSpecList::new(validation.fields).map_err(|e| ConfigError::FieldPattern {
                        route: key.clone(),
                        reason: e.to_string(),
                    })?;
                let code = validation
                    .error_code
                    .unwrap_or_else(|| HttpStatus::BadRequest.code());
                ConfigValidator::is_error_status(code, &format!("mvc '{}' error-code", key))?;

                builder = builder.input_validation(
                    key,
                    InputValidationSpec::new(Arc::new(fields))
                        .enabled(validation.enabled)
                        .throw_on_failure(validation.throw_on_failure)
                        .error_code(code),
                );
            }
        }

        Ok(builder.build()?)
    }

    /// Build both runtime structures.
    pub fn into_parts<I, S>(
        self,
        actions: ActionRegistry,
        filters: I,
    ) -> Result<(RouteCollection, RouteRegistry)>
    where
        I: IntoIterator<Item = (S, Arc<dyn InterceptFilter>)>,
        S: Into<String>,
    {
        let RouteFile {
            routes,
            mvc,
            global_pre_filters,
            global_post_filters,
        } = self;

        let collection = RouteFile {
            routes,
            ..RouteFile::default()
        }
        .into_route_collection()?;
        let registry = RouteFile {
            mvc,
            global_pre_filters,
            global_post_filters,
            ..RouteFile::default()
        }
        .into_route_registry(actions, filters)?;

        Ok((collection, registry))
    }
}
