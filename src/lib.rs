// Switchyard - hierarchical route matching and MVC dispatch for Rust
//
// Routes are matched against a tree of regex patterns keyed by dot-delimited
// route keys; MVC requests run through pre-filters, ACL and input checks,
// the action itself, then post-filters.

// Re-export core functionality
pub use switchyard_core::*;

// Re-export optional crates
#[cfg(feature = "config")]
pub use switchyard_config;

#[cfg(feature = "validation")]
pub use switchyard_validation;

#[cfg(feature = "testing")]
pub use switchyard_testing;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        AccessSpec,
        Action,
        ActionRegistry,
        ActionSpec,
        Controller,
        ControllerOutput,
        ControllerRegistry,
        Dispatcher,
        Error,
        FilterOutcome,
        FrontController,
        HttpMethod,
        HttpRequest,
        HttpResponse,
        InterceptFilter,
        MvcContext,
        RouteCollection,
        RouteCollectionBuilder,
        RouteData,
        RouteDetail,
        RouteDispatcher,
        RouteRegistry,
    };

    pub use async_trait::async_trait;
}
