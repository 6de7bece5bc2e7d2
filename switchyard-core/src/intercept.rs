//! Intercepting filters run around an action.
//!
//! Each filter decides what happens next through the [`FilterOutcome`] it
//! returns: keep going, swap in a different context, or stop the chain.

use crate::logging::{debug, trace};
use crate::{Error, MvcContext};
use async_trait::async_trait;
use std::sync::Arc;

/// How the chain proceeds after a filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    /// Run the next filter with the (possibly mutated) context.
    Continue,
    /// Substitute this context for the current one, then continue.
    Replace(Box<MvcContext>),
    /// Skip every remaining filter.
    Break,
}

/// Trait for pre- and post-dispatch filters.
#[async_trait]
pub trait InterceptFilter: Send + Sync {
    async fn apply(&self, ctx: &mut MvcContext) -> Result<FilterOutcome, Error>;
}

/// How a chain run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOutcome {
    /// Every filter ran.
    Completed,
    /// The filter at this index broke the chain.
    Broken(usize),
}

/// An ordered list of named filters.
#[derive(Clone, Default)]
pub struct InterceptChain {
    filters: Vec<(String, Arc<dyn InterceptFilter>)>,
}

impl InterceptChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain that runs `filters` in order.
    pub fn load<I, S>(filters: I) -> Self
    where
        I: IntoIterator<Item = (S, Arc<dyn InterceptFilter>)>,
        S: Into<String>,
    {
        Self {
            filters: filters
                .into_iter()
                .map(|(name, filter)| (name.into(), filter))
                .collect(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, filter: Arc<dyn InterceptFilter>) {
        self.filters.push((name.into(), filter));
    }

    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run the filters in order against `ctx`.
    ///
    /// A filter error aborts the run and is returned as-is.
    pub async fn apply(&self, ctx: &mut MvcContext) -> Result<ChainOutcome, Error> {
        for (index, (name, filter)) in self.filters.iter().enumerate() {
            trace!(filter = %name, route = ctx.route_key(), "applying filter");

            match filter.apply(ctx).await? {
                FilterOutcome::Continue => {}
                FilterOutcome::Replace(replacement) => {
                    trace!(filter = %name, "filter replaced the context");
                    *ctx = *replacement;
                }
                FilterOutcome::Break => {
                    debug!(filter = %name, route = ctx.route_key(), "filter chain broken");
                    return Ok(ChainOutcome::Broken(index));
                }
            }
        }

        Ok(ChainOutcome::Completed)
    }
}

impl std::fmt::Debug for InterceptChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptChain")
            .field("filters", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Tag {
        name: &'static str,
        outcome: fn() -> FilterOutcome,
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl InterceptFilter for Tag {
        async fn apply(&self, ctx: &mut MvcContext) -> Result<FilterOutcome, Error> {
            self.seen
                .lock()
                .unwrap()
                .push(format!("{}@{}", self.name, ctx.route_key()));
            Ok((self.outcome)())
        }
    }

    fn tag(
        name: &'static str,
        outcome: fn() -> FilterOutcome,
        seen: &Arc<Mutex<Vec<String>>>,
    ) -> (&'static str, Arc<dyn InterceptFilter>) {
        (
            name,
            Arc::new(Tag {
                name,
                outcome,
                seen: Arc::clone(seen),
            }),
        )
    }

    #[tokio::test]
    async fn test_runs_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let chain = InterceptChain::load([
            tag("a", || FilterOutcome::Continue, &seen),
            tag("b", || FilterOutcome::Continue, &seen),
        ]);

        let mut ctx = MvcContext::new("home");
        assert_eq!(chain.apply(&mut ctx).await.unwrap(), ChainOutcome::Completed);
        assert_eq!(*seen.lock().unwrap(), vec!["a@home", "b@home"]);
    }

    #[tokio::test]
    async fn test_break_skips_remaining() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let chain = InterceptChain::load([
            tag("a", || FilterOutcome::Break, &seen),
            tag("b", || FilterOutcome::Continue, &seen),
        ]);

        let mut ctx = MvcContext::new("home");
        assert_eq!(chain.apply(&mut ctx).await.unwrap(), ChainOutcome::Broken(0));
        assert_eq!(*seen.lock().unwrap(), vec!["a@home"]);
    }

    #[tokio::test]
    async fn test_replace_feeds_later_filters() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let chain = InterceptChain::load([
            tag(
                "swap",
                || FilterOutcome::Replace(Box::new(MvcContext::new("login"))),
                &seen,
            ),
            tag("after", || FilterOutcome::Continue, &seen),
        ]);

        let mut ctx = MvcContext::new("home");
        chain.apply(&mut ctx).await.unwrap();
        assert_eq!(ctx.route_key(), "login");
        assert_eq!(*seen.lock().unwrap(), vec!["swap@home", "after@login"]);
    }
}
