//! Match-and-dispatch adapter for hosts.
//!
//! ```text
//! Request → Router::match_request → Dispatcher::dispatch → Response
//!                 │                        │
//!                 └── NotFound 404 ────────┤
//!                 └── MethodNotAllowed 405 (Allow header)
//!                                          └── any other error 500
//! ```

use anyhow::Context;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use switchyard_router::{Dispatcher, Error, Group, Request, RendererSpec, Response, Router};

use crate::config::Config;
use crate::renderer;

/// A configured router and dispatcher pair
#[derive(Debug, Default)]
pub struct App {
    router: Router,
    dispatcher: Dispatcher,
    config: Config,
}

impl App {
    /// Creates an app with no routes and no renderers
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an app from configuration
    ///
    /// Registers the configured static directories, the built-in renderers
    /// and the configured default renderer.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let mut router = Router::new();
        config.register_statics(&mut router)?;

        let mut dispatcher = Dispatcher::new();
        renderer::register_defaults(&mut dispatcher);
        dispatcher.set_default_renderer(
            config
                .routing
                .default_renderer
                .as_deref()
                .map(RendererSpec::new),
        );

        tracing::info!(
            base_prefix = %config.routing.base_prefix,
            statics = config.statics.len(),
            "application configured"
        );

        Ok(Self {
            router,
            dispatcher,
            config,
        })
    }

    /// Loads `path` and builds an app from it
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let config = Config::load(path)?;
        Self::from_config(config).with_context(|| format!("Failed to build app from {:?}", path))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    /// Adds a group below the configured base prefix and creates it
    pub fn group<F>(&mut self, prefix: &str, builder: F) -> switchyard_router::Result<()>
    where
        F: FnOnce(&mut Group) -> switchyard_router::Result<()> + 'static,
    {
        let prefix = format!("{}{}", self.config.routing.base_prefix, prefix);
        Group::new(prefix, builder).create(&mut self.router)
    }

    /// Matches and dispatches, answering errors with a status response
    pub fn handle(&self, request: Request) -> Response {
        let result = self
            .router
            .match_request(&request)
            .and_then(|matched| self.dispatcher.dispatch(request, &matched));

        match result {
            Ok(response) => response,
            Err(err) => error_response(&err),
        }
    }

    /// Adapts an `http::Request` and returns an axum response
    pub fn handle_http<B>(&self, request: &axum::http::Request<B>) -> axum::response::Response {
        self.handle(Request::from_http(request)).into_response()
    }
}

fn error_response(err: &Error) -> Response {
    let status = err.status();
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }

    let mut response = Response::with_body(
        "text/plain; charset=utf-8",
        status.canonical_reason().unwrap_or("Error"),
    )
    .with_status(status);

    if let Some(allowed) = err.allowed_methods() {
        let allow: Vec<&str> = allowed.iter().map(|m| m.as_str()).collect();
        response.set_header(header::ALLOW.as_str(), &allow.join(", "));
    }

    response
}
