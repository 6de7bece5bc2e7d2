// Core library for the Switchyard framework
// Route trees, regex URI matching, controller dispatch and the filter-chain front controller

pub mod action;
pub mod action_route;
pub mod captures;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod front_controller;
pub mod http;
pub mod intercept;
pub mod logging;
pub mod matched_route;
pub mod route_builder;
pub mod route_collection;
pub mod route_registry;
pub mod route_spec;
pub mod routing;
pub mod status;
pub mod uri_matcher;

// Re-export commonly used types
pub use action::*;
pub use action_route::*;
pub use captures::*;
pub use context::*;
pub use dispatcher::*;
pub use error::*;
pub use front_controller::*;
pub use http::*;
pub use intercept::*;
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput, Rotation};
pub use matched_route::*;
pub use route_builder::*;
pub use route_collection::*;
pub use route_registry::*;
pub use route_spec::*;
pub use routing::*;
pub use status::*;
pub use uri_matcher::*;
