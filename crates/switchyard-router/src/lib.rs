//! # Switchyard Router
//!
//! A synchronous HTTP routing and dispatch core:
//! - Route patterns with literal segments, captures (`{id}`) and a trailing
//!   wildcard (`...path`)
//! - Two-phase matching that tells "no such path" (404) apart from "path
//!   exists, method not allowed" (405)
//! - Nested groups contributing prefixes, name prefixes, middleware levels,
//!   renderers and controllers to the routes they contain
//! - REST-style endpoints mapping verbs to controller actions
//! - Named-route URL generation and cache-busted static asset URLs
//! - A dispatcher running before handlers, a middleware onion, the view,
//!   after handlers and a renderer
//!
//! ## Example
//!
//! ```
//! use switchyard_router::{Dispatcher, Group, Reply, Request, Response, Route, Router, View};
//!
//! let mut router = Router::new();
//! router
//!     .add_group(
//!         Group::new("/albums", |group| {
//!             group.add_route(
//!                 Route::get("/{name}", View::handler(|_req, args| {
//!                     Ok(Reply::Response(Response::with_body("text/plain", args["name"].clone())))
//!                 }))?
//!                 .with_name("show"),
//!             )
//!         })
//!         .with_name_prefix("albums:"),
//!     )
//!     .unwrap();
//!
//! let request = Request::new("GET", "/albums/symbolic").unwrap();
//! let matched = router.match_request(&request).unwrap();
//! let response = Dispatcher::new().dispatch(request, &matched).unwrap();
//!
//! assert_eq!(response.text(), "symbolic");
//! assert_eq!(router.route_url("albums:show", [("name", "leprosy")]).unwrap(), "/albums/leprosy");
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod group;
pub mod handler;
pub mod http;
pub mod route;
pub mod router;
pub mod statics;
pub mod view;

pub use dispatcher::Dispatcher;
pub use endpoint::{Endpoint, Scope};
pub use error::{Error, Result};
pub use group::{Group, GroupState, RouteAdder};
pub use handler::{After, Before, Middleware, Next, Renderer, RendererSpec};
pub use http::{Reply, Request, Response};
pub use route::{Params, Route, RouteMatch, RoutePattern, Segment, UrlParams};
pub use router::Router;
pub use statics::{StaticDir, StaticRoutes};
pub use view::{Controllers, Invoker, View};
