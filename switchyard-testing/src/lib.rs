//! Testing utilities for Switchyard.
//!
//! - **TestClient** sends requests through a `RouteDispatcher`
//! - **MockAction**, **MockFilter** and **MockController** record what
//!   the dispatch pipeline did to them
//! - **Assertions** for responses, dispatch errors and MVC contexts
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use switchyard_core::{ControllerRegistry, RouteCollectionBuilder, RouteData, RouteDispatcher};
//! use switchyard_testing::*;
//!
//! # tokio_test::block_on(async {
//! let mut builder = RouteCollectionBuilder::new();
//! builder
//!     .load_route(RouteData::new("user", "^/users/(\\d+)$", "UserController").params(["id"]))
//!     .unwrap();
//! let routes = Arc::new(builder.create_route_collection().unwrap());
//!
//! let users = MockController::new("UserController");
//! let mut controllers = ControllerRegistry::new();
//! users.register_into(&mut controllers);
//!
//! let client = TestClient::new(Arc::new(RouteDispatcher::new(routes, Arc::new(controllers))));
//! let response = client.get("/users/42").await;
//!
//! assert_status(&response, 200);
//! assert_eq!(users.last_args(), Some(vec!["42".to_string()]));
//! assert_not_matched(&client.get("/teams").await);
//! # });
//! ```

pub mod assertions;
pub mod mock;
pub mod test_client;

pub use assertions::*;
pub use mock::*;
pub use test_client::*;
