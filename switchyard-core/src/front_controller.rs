// Front controller: filters around dispatch

use crate::logging::{debug, trace};
use crate::{Dispatcher, Error, MvcContext, RouteDetail, RouteRegistry};
use std::sync::Arc;

/// Drives one context through pre-filters, its action and post-filters.
///
/// The action only runs while the context's exit code is 2xx, so a
/// pre-filter vetoes dispatch by setting any other code. A vetoed context
/// skips post-filtering as well.
#[derive(Debug, Clone)]
pub struct FrontController {
    dispatcher: Dispatcher,
}

impl FrontController {
    pub fn new(registry: Arc<RouteRegistry>) -> Self {
        Self::from_dispatcher(Dispatcher::new(registry))
    }

    /// Use a preconfigured dispatcher, e.g. one with a custom depth limit.
    pub fn from_dispatcher(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub async fn run(&self, mut ctx: MvcContext) -> Result<MvcContext, Error> {
        let registry = self.dispatcher.registry();
        let detail = self.detail(ctx.route_key())?;

        if detail.is_pre_filtering_enabled() {
            let outcome = registry.pre_filter_chain(detail)?.apply(&mut ctx).await?;
            trace!(route = ctx.route_key(), ?outcome, "pre-filters applied");
        }

        if !ctx.is_dispatchable() {
            debug!(
                route = ctx.route_key(),
                exit_code = ctx.exit_code(),
                "dispatch vetoed by exit code"
            );
            return Ok(ctx);
        }

        self.dispatcher.dispatch(&mut ctx).await?;

        // An action may have forwarded to another route. A forward target
        // without a route detail has no post-filters of its own.
        let detail = if ctx.route_key() == detail.key {
            Some(detail)
        } else {
            debug!(from = %detail.key, to = ctx.route_key(), "route changed during dispatch");
            registry.detail(ctx.route_key())
        };

        match detail {
            Some(detail) if detail.is_post_filtering_enabled() => {
                let outcome = registry.post_filter_chain(detail)?.apply(&mut ctx).await?;
                trace!(route = ctx.route_key(), ?outcome, "post-filters applied");
            }
            Some(_) => {}
            None => debug!(route = ctx.route_key(), "no route detail, skipping post-filters"),
        }

        Ok(ctx)
    }

    fn detail(&self, key: &str) -> Result<&RouteDetail, Error> {
        self.dispatcher
            .registry()
            .detail(key)
            .ok_or_else(|| Error::RouteNotFound(format!("no route detail for '{}'", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Action, ActionSpec, FilterOutcome, InterceptFilter};
    use async_trait::async_trait;
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    struct Record(&'static str, Log);

    #[async_trait]
    impl InterceptFilter for Record {
        async fn apply(&self, ctx: &mut MvcContext) -> Result<FilterOutcome, Error> {
            self.1
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.0, ctx.route_key()));
            Ok(FilterOutcome::Continue)
        }
    }

    struct Deny;

    #[async_trait]
    impl InterceptFilter for Deny {
        async fn apply(&self, ctx: &mut MvcContext) -> Result<FilterOutcome, Error> {
            ctx.set_exit_code(403);
            Ok(FilterOutcome::Break)
        }
    }

    struct Page(Log);

    #[async_trait]
    impl Action for Page {
        async fn execute(&self, ctx: &mut MvcContext, _: &Dispatcher) -> Result<(), Error> {
            self.0
                .lock()
                .unwrap()
                .push(format!("action:{}", ctx.route_key()));
            Ok(())
        }
    }

    struct Jump;

    #[async_trait]
    impl Action for Jump {
        async fn execute(&self, ctx: &mut MvcContext, dispatcher: &Dispatcher) -> Result<(), Error> {
            dispatcher.forward("page", ctx).await
        }
    }

    fn controller(log: &Log) -> FrontController {
        let page_log = Arc::clone(log);
        let registry = RouteRegistry::builder()
            .register_action("Page", move || Page(Arc::clone(&page_log)))
            .register_action("Jump", || Jump)
            .filter("pre", Arc::new(Record("pre", Arc::clone(log))))
            .filter("post", Arc::new(Record("post", Arc::clone(log))))
            .filter("other-post", Arc::new(Record("other-post", Arc::clone(log))))
            .filter("deny", Arc::new(Deny))
            .route(RouteDetail::new("page").pre_filter("pre").post_filter("post"))
            .action("page", ActionSpec::new("Page"))
            .route(
                RouteDetail::new("private")
                    .pre_filter("deny")
                    .pre_filter("pre")
                    .post_filter("post"),
            )
            .action("private", ActionSpec::new("Page"))
            .route(RouteDetail::new("jump").post_filter("other-post"))
            .action("jump", ActionSpec::new("Jump"))
            .route(RouteDetail::new("quiet").pre_filter("pre").disable_pre_filtering())
            .action("quiet", ActionSpec::new("Page"))
            .build()
            .unwrap();

        FrontController::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_filters_wrap_action() {
        let log = Log::default();
        let ctx = controller(&log).run(MvcContext::new("page")).await.unwrap();

        assert_eq!(ctx.exit_code(), 200);
        assert_eq!(*log.lock().unwrap(), vec!["pre:page", "action:page", "post:page"]);
    }

    #[tokio::test]
    async fn test_exit_code_veto_skips_action_and_post_filters() {
        let log = Log::default();
        let ctx = controller(&log).run(MvcContext::new("private")).await.unwrap();

        assert_eq!(ctx.exit_code(), 403);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_post_filters_follow_forwarded_route() {
        let log = Log::default();
        let ctx = controller(&log).run(MvcContext::new("jump")).await.unwrap();

        assert_eq!(ctx.route_key(), "page");
        assert_eq!(*log.lock().unwrap(), vec!["action:page", "post:page"]);
    }

    #[tokio::test]
    async fn test_disabled_pre_filtering() {
        let log = Log::default();
        controller(&log).run(MvcContext::new("quiet")).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["action:quiet"]);
    }

    #[tokio::test]
    async fn test_unknown_route_detail() {
        let log = Log::default();
        let err = controller(&log)
            .run(MvcContext::new("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
