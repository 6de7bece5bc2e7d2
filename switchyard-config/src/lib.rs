//! Configuration for Switchyard
//!
//! Loads route files (URI routes plus the MVC dispatch table) and framework
//! settings from JSON, TOML, `.env` files and `SWITCHYARD_*` environment
//! variables.
//!
//! # Examples
//!
//! ```
//! use switchyard_config::{FileFormat, RouteFile, Settings};
//!
//! let mut file = RouteFile::parse(
//!     r#"
//!     [[routes]]
//!     key = "users"
//!     pattern = "/users"
//!     controller = "UserController"
//!     "#,
//!     FileFormat::Toml,
//! )
//! .unwrap();
//!
//! file.apply_settings(&Settings::default());
//! let routes = file.into_route_collection().unwrap();
//! assert!(routes.exists("users"));
//! ```

mod env;
mod error;
mod loader;
mod routes;
mod settings;
pub mod validation;

pub use env::*;
pub use error::*;
pub use loader::*;
pub use routes::*;
pub use settings::*;
pub use validation::{ConfigValidator, Validate};
