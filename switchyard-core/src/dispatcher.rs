// Action dispatch: resolve, authorize, validate, execute

use crate::logging::{debug, trace, warn};
use crate::{Error, MvcContext, RouteRegistry};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Nested dispatches allowed before a route chain is treated as a loop.
pub const DEFAULT_MAX_DISPATCH_DEPTH: usize = 16;

/// Future returned by [`Dispatcher::dispatch`].
pub type DispatchFuture<'a> = Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'a>>;

/// Runs the action registered for a context's route key.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<RouteRegistry>,
    max_depth: usize,
}

impl Dispatcher {
    pub fn new(registry: Arc<RouteRegistry>) -> Self {
        Self {
            registry,
            max_depth: DEFAULT_MAX_DISPATCH_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Dispatch `ctx` to the action for its current route key.
    ///
    /// The action is created and checked to be executable, the caller's ACL
    /// codes are checked against the route's access spec for the request
    /// method, declared input validation runs, and then the action executes.
    /// Any failure is returned before the action runs.
    pub fn dispatch<'a>(&'a self, ctx: &'a mut MvcContext) -> DispatchFuture<'a> {
        Box::pin(async move {
            if ctx.dispatch_depth() >= self.max_depth {
                warn!(
                    route = ctx.route_key(),
                    depth = ctx.dispatch_depth(),
                    "dispatch depth limit reached"
                );
                return Err(Error::LoopDetected(format!(
                    "dispatching '{}' exceeds {} nested dispatches",
                    ctx.route_key(),
                    self.max_depth
                )));
            }

            let key = ctx.route_key().to_string();
            let spec = self
                .registry
                .action(&key)
                .ok_or_else(|| Error::RouteNotFound(format!("no action declared for '{}'", key)))?;

            let action = self.registry.action_factories().create(&spec.action)?;

            if let Some(access) = self.registry.access(&key) {
                if !access.permits(ctx.method(), ctx.acl()) {
                    warn!(route = %key, method = %ctx.method(), "access denied");
                    return Err(Error::Forbidden(format!(
                        "insufficient permissions for {} '{}'",
                        ctx.method(),
                        key
                    )));
                }
            }

            if let Some(validation) = self.registry.input_validation(&key) {
                if validation.enabled {
                    if let Err(errors) = validation.validator.validate(ctx.input()) {
                        let message = errors
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join("; ");

                        if validation.throw_on_failure {
                            debug!(route = %key, errors = errors.len(), "input rejected");
                            return Err(Error::Validation {
                                code: validation.error_code,
                                message,
                            });
                        }

                        warn!(route = %key, %message, "input invalid, continuing");
                        ctx.add_validation_errors(errors);
                    }
                }
            }

            trace!(route = %key, action = %spec.action, depth = ctx.dispatch_depth(), "executing action");
            ctx.enter_dispatch();
            let result = action.execute(ctx, self).await;
            ctx.leave_dispatch();
            result
        })
    }

    /// Dispatch `route_key` on a copy of `ctx` and return the copy.
    pub async fn call(&self, route_key: &str, ctx: &MvcContext) -> Result<MvcContext, Error> {
        let mut sub = ctx.clone();
        sub.set_route_key(route_key);
        debug!(from = ctx.route_key(), to = route_key, "sub-dispatch");
        self.dispatch(&mut sub).await?;
        Ok(sub)
    }

    /// Point `ctx` at `route_key` and dispatch it in place.
    pub async fn forward(&self, route_key: &str, ctx: &mut MvcContext) -> Result<(), Error> {
        debug!(from = ctx.route_key(), to = route_key, "forwarding");
        ctx.set_route_key(route_key);
        self.dispatch(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccessSpec, Action, ActionSpec, HttpMethod, InputError, InputValidationSpec, InputValidator};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static EXECUTIONS: AtomicUsize = AtomicUsize::new(0);

    struct Show;

    #[async_trait]
    impl Action for Show {
        async fn execute(&self, ctx: &mut MvcContext, _: &Dispatcher) -> Result<(), Error> {
            ctx.set_view(format!("show:{}", ctx.route_key()));
            Ok(())
        }
    }

    struct Counted;

    #[async_trait]
    impl Action for Counted {
        async fn execute(&self, _: &mut MvcContext, _: &Dispatcher) -> Result<(), Error> {
            EXECUTIONS.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct CallsShow;

    #[async_trait]
    impl Action for CallsShow {
        async fn execute(&self, ctx: &mut MvcContext, dispatcher: &Dispatcher) -> Result<(), Error> {
            let sub = dispatcher.call("show", ctx).await?;
            ctx.merge(&sub);
            Ok(())
        }
    }

    struct ForwardsToShow;

    #[async_trait]
    impl Action for ForwardsToShow {
        async fn execute(&self, ctx: &mut MvcContext, dispatcher: &Dispatcher) -> Result<(), Error> {
            dispatcher.forward("show", ctx).await
        }
    }

    struct SelfCall;

    #[async_trait]
    impl Action for SelfCall {
        async fn execute(&self, ctx: &mut MvcContext, dispatcher: &Dispatcher) -> Result<(), Error> {
            dispatcher.call("loop", ctx).await.map(|_| ())
        }
    }

    struct RequiresName;

    impl InputValidator for RequiresName {
        fn validate(&self, input: &HashMap<String, Value>) -> Result<(), Vec<InputError>> {
            match input.get("name") {
                Some(Value::String(s)) if !s.is_empty() => Ok(()),
                _ => Err(vec![InputError::new("name", "is required")]),
            }
        }
    }

    struct Helper;

    fn dispatcher() -> Dispatcher {
        let mut actions = crate::ActionRegistry::new();
        actions
            .register("Show", || Show)
            .register("Counted", || Counted)
            .register("CallsShow", || CallsShow)
            .register("ForwardsToShow", || ForwardsToShow)
            .register("SelfCall", || SelfCall)
            .register_object("Helper", || Helper);

        let registry = RouteRegistry::builder()
            .actions(actions)
            .action("show", ActionSpec::new("Show"))
            .action("helper", ActionSpec::new("Helper"))
            .action("call", ActionSpec::new("CallsShow"))
            .action("forward", ActionSpec::new("ForwardsToShow"))
            .action("loop", ActionSpec::new("SelfCall"))
            .action("admin", ActionSpec::new("Show"))
            .access(
                "admin",
                AccessSpec::public()
                    .allow(["staff"])
                    .allow_method(HttpMethod::POST, ["admin"]),
            )
            .action("save", ActionSpec::new("Show"))
            .input_validation(
                "save",
                InputValidationSpec::new(Arc::new(RequiresName)).error_code(422),
            )
            .action("lenient", ActionSpec::new("Show"))
            .input_validation(
                "lenient",
                InputValidationSpec::new(Arc::new(RequiresName)).throw_on_failure(false),
            )
            .build()
            .unwrap();

        Dispatcher::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_executes_action() {
        let mut ctx = MvcContext::new("show");
        dispatcher().dispatch(&mut ctx).await.unwrap();
        assert_eq!(ctx.view(), Some(&Value::from("show:show")));
        assert_eq!(ctx.dispatch_depth(), 0);
    }

    #[tokio::test]
    async fn test_non_executable_action_is_404() {
        let mut ctx = MvcContext::new("helper");
        let err = dispatcher().dispatch(&mut ctx).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert!(ctx.view().is_none());
    }

    #[tokio::test]
    async fn test_undeclared_route() {
        let mut ctx = MvcContext::new("nowhere");
        let err = dispatcher().dispatch(&mut ctx).await.unwrap_err();
        assert!(matches!(err, Error::RouteNotFound(_)));
    }

    #[tokio::test]
    async fn test_access_checked_per_method() {
        let dispatcher = dispatcher();

        let mut ctx = MvcContext::new("admin").with_acl_code("staff");
        dispatcher.dispatch(&mut ctx).await.unwrap();

        let mut ctx = MvcContext::new("admin")
            .with_method(HttpMethod::POST)
            .with_acl_code("staff");
        let err = dispatcher.dispatch(&mut ctx).await.unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert!(ctx.view().is_none());
    }

    #[tokio::test]
    async fn test_validation_failure_uses_declared_code() {
        let mut ctx = MvcContext::new("save");
        let err = dispatcher().dispatch(&mut ctx).await.unwrap_err();
        assert_eq!(err.status_code(), 422);
        assert!(err.to_string().contains("name: is required"));

        let mut ctx = MvcContext::new("save").with_input("name", "ada");
        dispatcher().dispatch(&mut ctx).await.unwrap();
    }

    #[tokio::test]
    async fn test_tolerated_validation_failure_is_recorded() {
        let mut ctx = MvcContext::new("lenient");
        dispatcher().dispatch(&mut ctx).await.unwrap();
        assert_eq!(ctx.validation_errors().len(), 1);
        assert!(ctx.view().is_some());
    }

    #[tokio::test]
    async fn test_call_dispatches_a_copy() {
        let mut ctx = MvcContext::new("call");
        dispatcher().dispatch(&mut ctx).await.unwrap();
        assert_eq!(ctx.route_key(), "call");
        assert_eq!(ctx.view(), Some(&Value::from("show:show")));
    }

    #[tokio::test]
    async fn test_forward_rewrites_route_key() {
        let mut ctx = MvcContext::new("forward");
        dispatcher().dispatch(&mut ctx).await.unwrap();
        assert_eq!(ctx.route_key(), "show");
        assert_eq!(ctx.view(), Some(&Value::from("show:show")));
    }

    #[tokio::test]
    async fn test_self_referential_route_is_stopped() {
        let dispatcher = dispatcher().with_max_depth(4);
        let mut ctx = MvcContext::new("loop");
        let err = dispatcher.dispatch(&mut ctx).await.unwrap_err();
        assert_eq!(err.status_code(), 508);
        assert_eq!(ctx.dispatch_depth(), 0);
    }

    #[tokio::test]
    async fn test_counted_action_runs_once() {
        let registry = RouteRegistry::builder()
            .register_action("Counted", || Counted)
            .action("count", ActionSpec::new("Counted"))
            .build()
            .unwrap();
        let before = EXECUTIONS.load(Ordering::SeqCst);

        let mut ctx = MvcContext::new("count");
        Dispatcher::new(Arc::new(registry))
            .dispatch(&mut ctx)
            .await
            .unwrap();
        assert_eq!(EXECUTIONS.load(Ordering::SeqCst), before + 1);
    }
}
