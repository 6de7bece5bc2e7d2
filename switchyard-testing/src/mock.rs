// Recording mocks for actions, filters and controllers

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use switchyard_core::{
    Action, ActionRegistry, Controller, ControllerOutput, ControllerRegistry, Dispatcher, Error,
    FilterOutcome, HttpRequest, InterceptFilter, MvcContext,
};

/// Shared, clonable log of recorded calls.
#[derive(Clone, Default, Debug)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: impl Into<String>) {
        self.lock().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    pub fn was_called(&self, call: &str) -> bool {
        self.lock().iter().any(|c| c == call)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        // A panicking test must not hide what was recorded before it.
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Action that records the route keys it executes for.
///
/// ```
/// use switchyard_core::ActionRegistry;
/// use switchyard_testing::MockAction;
///
/// let action = MockAction::new("ShowUser").with_view("user");
/// let mut actions = ActionRegistry::new();
/// action.register_into(&mut actions);
/// assert!(actions.contains("ShowUser"));
/// ```
#[derive(Clone, Debug)]
pub struct MockAction {
    name: String,
    log: CallLog,
    view: Option<Value>,
    exit_code: Option<u16>,
    forward_to: Option<String>,
    error: Option<Error>,
}

impl MockAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            log: CallLog::new(),
            view: None,
            exit_code: None,
            forward_to: None,
            error: None,
        }
    }

    pub fn with_view(mut self, view: impl Into<Value>) -> Self {
        self.view = Some(view.into());
        self
    }

    pub fn with_exit_code(mut self, code: u16) -> Self {
        self.exit_code = Some(code);
        self
    }

    /// Forward to another route after recording.
    pub fn forwarding_to(mut self, route_key: impl Into<String>) -> Self {
        self.forward_to = Some(route_key.into());
        self
    }

    pub fn failing_with(mut self, error: Error) -> Self {
        self.error = Some(error);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// Register under this action's name; every instance shares one log.
    pub fn register_into(&self, registry: &mut ActionRegistry) {
        let action = self.clone();
        registry.register(self.name.clone(), move || action.clone());
    }
}

#[async_trait]
impl Action for MockAction {
    async fn execute(&self, ctx: &mut MvcContext, dispatcher: &Dispatcher) -> Result<(), Error> {
        self.log.record(ctx.route_key());

        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        if let Some(view) = &self.view {
            ctx.set_view(view.clone());
        }
        if let Some(code) = self.exit_code {
            ctx.set_exit_code(code);
        }
        if let Some(target) = &self.forward_to {
            dispatcher.forward(target, ctx).await?;
        }
        Ok(())
    }
}

/// Filter that records the route keys it sees and returns a fixed outcome.
#[derive(Clone, Debug)]
pub struct MockFilter {
    name: String,
    log: CallLog,
    outcome: FilterOutcome,
    exit_code: Option<u16>,
    error: Option<Error>,
}

impl MockFilter {
    /// A filter that lets the chain continue.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            log: CallLog::new(),
            outcome: FilterOutcome::Continue,
            exit_code: None,
            error: None,
        }
    }

    pub fn breaking(mut self) -> Self {
        self.outcome = FilterOutcome::Break;
        self
    }

    pub fn replacing_with(mut self, ctx: MvcContext) -> Self {
        self.outcome = FilterOutcome::Replace(Box::new(ctx));
        self
    }

    /// Set the exit code, e.g. 403 to veto the dispatch.
    pub fn with_exit_code(mut self, code: u16) -> Self {
        self.exit_code = Some(code);
        self
    }

    pub fn failing_with(mut self, error: Error) -> Self {
        self.error = Some(error);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// Name/filter pair as accepted by `RouteRegistryBuilder::filters`.
    pub fn entry(&self) -> (String, Arc<dyn InterceptFilter>) {
        (self.name.clone(), Arc::new(self.clone()))
    }
}

#[async_trait]
impl InterceptFilter for MockFilter {
    async fn apply(&self, ctx: &mut MvcContext) -> Result<FilterOutcome, Error> {
        self.log.record(ctx.route_key());

        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        if let Some(code) = self.exit_code {
            ctx.set_exit_code(code);
        }
        Ok(self.outcome.clone())
    }
}

type ArgLog = Arc<Mutex<Vec<(String, Vec<String>)>>>;

/// Controller that records each method call with its arguments.
#[derive(Clone, Debug)]
pub struct MockController {
    name: String,
    calls: ArgLog,
    output: ControllerOutput,
}

impl MockController {
    /// Replies with the invoked method name as text.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calls: Arc::new(Mutex::new(Vec::new())),
            output: ControllerOutput::Empty,
        }
    }

    pub fn responding(mut self, output: impl Into<ControllerOutput>) -> Self {
        self.output = output.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method_call_count(&self, method: &str) -> usize {
        self.lock().iter().filter(|(m, _)| m == method).count()
    }

    pub fn get_all_calls(&self) -> Vec<(String, Vec<String>)> {
        self.lock().clone()
    }

    /// Arguments of the most recent call.
    pub fn last_args(&self) -> Option<Vec<String>> {
        self.lock().last().map(|(_, args)| args.clone())
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn register_into(&self, registry: &mut ControllerRegistry) {
        let controller = self.clone();
        registry.register(self.name.clone(), move || controller.clone());
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(String, Vec<String>)>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Controller for MockController {
    async fn invoke(
        &self,
        method: &str,
        _request: HttpRequest,
        args: Vec<String>,
    ) -> Result<ControllerOutput, Error> {
        self.lock().push((method.to_string(), args));

        Ok(match &self.output {
            ControllerOutput::Empty => ControllerOutput::Text(method.to_string()),
            other => other.clone(),
        })
    }
}
