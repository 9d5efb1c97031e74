//! Request pipeline execution for a matched route.
//!
//! # Data Flow
//! ```text
//! Request
//!     → before handlers         (dispatcher-global, then route)
//!     → middleware onion        (global, group levels outer → inner, route)
//!         → view                (closure, or controller action via Invoker)
//!         → after handlers      (global, then route; a Response short-circuits)
//!         → renderer            (route renderer, else the default renderer)
//!     ← middleware onion unwinds
//! Response
//! ```
//!
//! # Design Decisions
//! - Fully synchronous; the dispatcher holds no per-request state and can be
//!   shared between threads once configured
//! - Any stage error aborts the pipeline and is returned unchanged; core
//!   errors raised inside handlers come back as their original variant

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::handler::{After, Before, Middleware, Next, Renderer, RendererSpec};
use crate::http::{Reply, Request, Response};
use crate::route::RouteMatch;
use crate::view::{Invoker, View};

/// Executes the handler pipeline of matched routes
#[derive(Default, Clone)]
pub struct Dispatcher {
    middleware: Vec<Arc<dyn Middleware>>,
    before: Vec<Arc<dyn Before>>,
    after: Vec<Arc<dyn After>>,
    renderers: HashMap<String, Arc<dyn Renderer>>,
    default_renderer: Option<RendererSpec>,
    invoker: Option<Arc<dyn Invoker>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Adds global middleware, wrapped around every route's own middleware
    pub fn with_middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.add_middleware(middleware);
        self
    }

    pub fn with_before(mut self, handler: impl Before + 'static) -> Self {
        self.add_before(handler);
        self
    }

    pub fn with_after(mut self, handler: impl After + 'static) -> Self {
        self.add_after(handler);
        self
    }

    pub fn with_renderer(mut self, kind: impl Into<String>, renderer: impl Renderer + 'static) -> Self {
        self.add_renderer(kind, renderer);
        self
    }

    /// Renderer used for routes that configure none
    pub fn with_default_renderer(mut self, renderer: impl Into<RendererSpec>) -> Self {
        self.default_renderer = Some(renderer.into());
        self
    }

    pub fn with_invoker(mut self, invoker: impl Invoker + 'static) -> Self {
        self.invoker = Some(Arc::new(invoker));
        self
    }

    pub fn add_middleware(&mut self, middleware: impl Middleware + 'static) -> &mut Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn add_before(&mut self, handler: impl Before + 'static) -> &mut Self {
        self.before.push(Arc::new(handler));
        self
    }

    pub fn add_after(&mut self, handler: impl After + 'static) -> &mut Self {
        self.after.push(Arc::new(handler));
        self
    }

    /// Registers a renderer under `kind`, replacing any earlier one
    pub fn add_renderer(&mut self, kind: impl Into<String>, renderer: impl Renderer + 'static) -> &mut Self {
        self.renderers.insert(kind.into(), Arc::new(renderer));
        self
    }

    pub fn set_default_renderer(&mut self, renderer: Option<RendererSpec>) {
        self.default_renderer = renderer;
    }

    pub fn set_invoker(&mut self, invoker: Arc<dyn Invoker>) {
        self.invoker = Some(invoker);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }

    pub fn before_handlers(&self) -> &[Arc<dyn Before>] {
        &self.before
    }

    pub fn after_handlers(&self) -> &[Arc<dyn After>] {
        &self.after
    }

    pub fn renderer(&self, kind: &str) -> Option<&Arc<dyn Renderer>> {
        self.renderers.get(kind)
    }

    pub fn default_renderer(&self) -> Option<&RendererSpec> {
        self.default_renderer.as_ref()
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Runs the full pipeline of a matched route against `request`
    ///
    /// # Examples
    ///
    /// ```
    /// use switchyard_router::{Dispatcher, Reply, Request, Response, Route, Router, View};
    ///
    /// let mut router = Router::new();
    /// router
    ///     .get("/hello/{name}", View::handler(|_req, args| {
    ///         Ok(Reply::Response(Response::with_body("text/plain", format!("Hello, {}", args["name"]))))
    ///     }), None)
    ///     .unwrap();
    ///
    /// let request = Request::new("GET", "/hello/ada").unwrap();
    /// let matched = router.match_request(&request).unwrap();
    /// let response = Dispatcher::new().dispatch(request, &matched).unwrap();
    /// assert_eq!(response.text(), "Hello, ada");
    /// ```
    pub fn dispatch(&self, request: Request, matched: &RouteMatch) -> Result<Response> {
        let route = &matched.route;
        tracing::debug!(
            method = %request.method(),
            path = request.path(),
            pattern = route.pattern(),
            "dispatching request"
        );

        let result = self.run(request, matched);
        if let Err(err) = &result {
            tracing::warn!(pattern = route.pattern(), error = %err, "request pipeline failed");
        }
        result
    }

    fn run(&self, request: Request, matched: &RouteMatch) -> Result<Response> {
        let route = &matched.route;

        let request = self
            .before
            .iter()
            .chain(route.before_handlers())
            .try_fold(request, |request, handler| handler.handle(request))
            .map_err(from_pipeline)?;

        let layers: Vec<Arc<dyn Middleware>> = self
            .middleware
            .iter()
            .chain(route.middleware_chain())
            .cloned()
            .collect();

        let endpoint = |request: Request| -> anyhow::Result<Response> {
            self.respond(request, matched).map_err(anyhow::Error::from)
        };

        Next::new(&layers, &endpoint)
            .run(request)
            .map_err(from_pipeline)
    }

    /// View → after handlers → renderer
    fn respond(&self, request: Request, matched: &RouteMatch) -> Result<Response> {
        let mut data = match self.invoke(request, matched)? {
            Reply::Response(response) => return Ok(response),
            Reply::Data(data) => data,
        };

        for handler in self.after.iter().chain(matched.route.after_handlers()) {
            match handler.handle(data, matched).map_err(from_pipeline)? {
                Reply::Response(response) => return Ok(response),
                Reply::Data(next) => data = next,
            }
        }

        self.render(data, matched)
    }

    fn invoke(&self, request: Request, matched: &RouteMatch) -> Result<Reply> {
        let (controller, action) = match matched.route.view() {
            View::Handler(view) => return view(request, &matched.params).map_err(from_pipeline),
            View::Action { controller, action } => (controller.as_str(), action.as_str()),
            View::Named(action) => ("", action.as_str()),
        };

        let invoker = self.invoker.as_ref().ok_or_else(|| Error::MissingInvoker {
            controller: controller.to_string(),
            action: action.to_string(),
        })?;

        invoker
            .invoke(controller, action, request, &matched.params)
            .map_err(from_pipeline)
    }

    fn render(&self, data: Value, matched: &RouteMatch) -> Result<Response> {
        let spec = matched
            .route
            .renderer()
            .or(self.default_renderer.as_ref())
            .ok_or_else(|| Error::UnrenderedReply(matched.route.pattern().to_string()))?;

        let renderer = self
            .renderers
            .get(&spec.kind)
            .ok_or_else(|| Error::UnknownRenderer(spec.kind.clone()))?;

        renderer.render(data, spec).map_err(from_pipeline)
    }
}

/// Recovers core errors that travelled through a handler as `anyhow::Error`
fn from_pipeline(err: anyhow::Error) -> Error {
    match err.downcast::<Error>() {
        Ok(err) => err,
        Err(err) => Error::Handler(err),
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut renderers: Vec<&str> = self.renderers.keys().map(String::as_str).collect();
        renderers.sort_unstable();

        f.debug_struct("Dispatcher")
            .field(
                "middleware",
                &self.middleware.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .field("renderers", &renderers)
            .field("default_renderer", &self.default_renderer)
            .field("invoker", &self.invoker.is_some())
            .finish()
    }
}
