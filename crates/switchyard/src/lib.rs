//! # Switchyard
//!
//! Host layer around [`switchyard_router`]:
//! - `switchyard.toml` configuration ([`Config`])
//! - tracing setup ([`logging::init`])
//! - `json`, `text` and `template` renderers
//! - [`App`], which matches, dispatches and turns routing failures into
//!   404/405/500 responses
//!
//! ## Example
//!
//! ```
//! use switchyard::{App, Config};
//! use switchyard_router::{Reply, Request, View};
//! use serde_json::json;
//!
//! let mut config = Config::default();
//! config.routing.base_prefix = "/api".to_string();
//!
//! let mut app = App::from_config(config).unwrap();
//! app.group("/albums", |group| {
//!     group.get(
//!         "/{name}",
//!         View::handler(|_req, args| Ok(Reply::data(json!({ "name": args["name"] })))),
//!         Some("album"),
//!     )
//! })
//! .unwrap();
//!
//! let response = app.handle(Request::new("GET", "/api/albums/human").unwrap());
//! assert_eq!(response.text(), r#"{"name":"human"}"#);
//!
//! let response = app.handle(Request::new("POST", "/api/albums/human").unwrap());
//! assert_eq!(response.header("allow"), Some("GET"));
//! ```

pub mod app;
pub mod config;
pub mod logging;
pub mod renderer;

pub use app::App;
pub use config::{Config, LoggingConfig, RoutingConfig, StaticConfig};
pub use renderer::{JsonRenderer, TemplateRenderer, TextRenderer};
