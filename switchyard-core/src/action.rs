// Actions and the factory map that creates them

use crate::{Dispatcher, Error, MvcContext};
use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Executable capability every dispatchable action implements.
///
/// The dispatcher is passed in so an action can hand work to another
/// route through [`Dispatcher::call`] or [`Dispatcher::forward`].
#[async_trait]
pub trait Action: Send + Sync {
    async fn execute(&self, ctx: &mut MvcContext, dispatcher: &Dispatcher) -> Result<(), Error>;
}

type ObjectFactory = Arc<dyn Fn() -> Box<dyn Any + Send + Sync> + Send + Sync>;

/// Registered action factories, keyed by action name.
///
/// Anything can be registered under a name; only objects registered as
/// actions can be executed. Creating anything else fails with a 404.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    factories: HashMap<String, ObjectFactory>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an executable action. `factory` runs on every dispatch.
    pub fn register<A, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        A: Action + 'static,
        F: Fn() -> A + Send + Sync + 'static,
    {
        self.factories.insert(
            name.into(),
            Arc::new(move || {
                let action: Arc<dyn Action> = Arc::new(factory());
                Box::new(action) as Box<dyn Any + Send + Sync>
            }),
        );
        self
    }

    /// Register an arbitrary object under an action name.
    pub fn register_object<T, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.factories.insert(
            name.into(),
            Arc::new(move || Box::new(factory()) as Box<dyn Any + Send + Sync>),
        );
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Instantiate `name` and make sure it is executable.
    pub fn create(&self, name: &str) -> Result<Arc<dyn Action>, Error> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("action '{}' is not registered", name)))?;

        factory()
            .downcast::<Arc<dyn Action>>()
            .map(|action| *action)
            .map_err(|_| Error::NotFound(format!("'{}' is not an executable action", name)))
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ActionRegistry")
            .field("actions", &names)
            .finish()
    }
}
