//! Route definitions
//!
//! A [`Route`] binds a compiled pattern to a view. Pattern and name are fixed
//! once the route is constructed; methods, middleware, before/after handlers
//! and the renderer are configured with consuming `with_*` builders before
//! the route is handed to a router or group.
//!
//! Captured arguments are never stored on the route. A successful match
//! returns them in a fresh [`RouteMatch`], so one route can serve concurrent
//! matches.

pub mod params;
pub mod pattern;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;

use crate::error::Result;
use crate::handler::{After, Before, Middleware, RendererSpec};
use crate::http::normalize_method;
use crate::view::View;

pub use params::UrlParams;
pub use pattern::{classify_segment, Params, RoutePattern, Segment};

/// A single pattern → view binding with its pipeline configuration
#[derive(Clone)]
pub struct Route {
    pattern: RoutePattern,
    name: Option<String>,
    /// Empty means "any method"
    methods: Vec<Method>,
    view: View,
    /// Levels contributed by enclosing groups, outermost first
    inherited_middleware: Vec<Vec<Arc<dyn Middleware>>>,
    middleware: Vec<Arc<dyn Middleware>>,
    before: Vec<Arc<dyn Before>>,
    after: Vec<Arc<dyn After>>,
    renderer: Option<RendererSpec>,
}

impl Route {
    /// Creates a route that matches any method
    ///
    /// # Examples
    ///
    /// ```
    /// use switchyard_router::Route;
    ///
    /// let route = Route::new("/albums/{name}", "Albums::show").unwrap();
    /// assert_eq!(route.pattern(), "/albums/{name}");
    /// assert!(route.methods().is_empty());
    /// assert!(route.matches("/albums/symbolic").is_some());
    /// ```
    pub fn new(pattern: &str, view: impl Into<View>) -> Result<Self> {
        Ok(Self {
            pattern: RoutePattern::parse(pattern)?,
            name: None,
            methods: Vec::new(),
            view: view.into(),
            inherited_middleware: Vec::new(),
            middleware: Vec::new(),
            before: Vec::new(),
            after: Vec::new(),
            renderer: None,
        })
    }

    /// Creates a route restricted to one method
    pub fn with_verb(method: Method, pattern: &str, view: impl Into<View>) -> Result<Self> {
        Ok(Self::new(pattern, view)?.with_method(method))
    }

    pub fn get(pattern: &str, view: impl Into<View>) -> Result<Self> {
        Self::with_verb(Method::GET, pattern, view)
    }

    pub fn post(pattern: &str, view: impl Into<View>) -> Result<Self> {
        Self::with_verb(Method::POST, pattern, view)
    }

    pub fn put(pattern: &str, view: impl Into<View>) -> Result<Self> {
        Self::with_verb(Method::PUT, pattern, view)
    }

    pub fn patch(pattern: &str, view: impl Into<View>) -> Result<Self> {
        Self::with_verb(Method::PATCH, pattern, view)
    }

    pub fn delete(pattern: &str, view: impl Into<View>) -> Result<Self> {
        Self::with_verb(Method::DELETE, pattern, view)
    }

    pub fn head(pattern: &str, view: impl Into<View>) -> Result<Self> {
        Self::with_verb(Method::HEAD, pattern, view)
    }

    pub fn options(pattern: &str, view: impl Into<View>) -> Result<Self> {
        Self::with_verb(Method::OPTIONS, pattern, view)
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Sets the route name used for URL generation
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds an allowed method (compared case-insensitively)
    pub fn with_method(mut self, method: Method) -> Self {
        let method = normalize_method(method);
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
        self
    }

    /// Adds several allowed methods at once
    ///
    /// # Examples
    ///
    /// ```
    /// use switchyard_router::Route;
    /// use axum::http::Method;
    ///
    /// let route = Route::new("/", "index").unwrap()
    ///     .with_methods([Method::HEAD, Method::PUT]);
    /// assert!(route.allows(&Method::PUT));
    /// assert!(!route.allows(&Method::GET));
    /// ```
    pub fn with_methods<I>(self, methods: I) -> Self
    where
        I: IntoIterator<Item = Method>,
    {
        methods.into_iter().fold(self, Route::with_method)
    }

    /// Appends middleware to the route's own (innermost) level
    pub fn with_middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn with_middleware_arc(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    pub fn with_before(mut self, handler: impl Before + 'static) -> Self {
        self.before.push(Arc::new(handler));
        self
    }

    pub fn with_after(mut self, handler: impl After + 'static) -> Self {
        self.after.push(Arc::new(handler));
        self
    }

    /// Sets the renderer, overriding anything a group would contribute
    pub fn with_renderer(mut self, renderer: impl Into<RendererSpec>) -> Self {
        self.renderer = Some(renderer.into());
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn compiled(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Whether `method` passes this route's method filter
    pub fn allows(&self, method: &Method) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// Middleware grouped by the nesting level that contributed it,
    /// outermost group first and the route's own middleware last
    pub fn middleware(&self) -> Vec<&[Arc<dyn Middleware>]> {
        let mut levels: Vec<&[Arc<dyn Middleware>]> = self
            .inherited_middleware
            .iter()
            .map(Vec::as_slice)
            .collect();
        if !self.middleware.is_empty() {
            levels.push(&self.middleware);
        }
        levels
    }

    /// Middleware in onion order (outer → inner), levels flattened
    pub fn middleware_chain(&self) -> impl Iterator<Item = &Arc<dyn Middleware>> {
        self.inherited_middleware
            .iter()
            .flatten()
            .chain(self.middleware.iter())
    }

    pub fn before_handlers(&self) -> &[Arc<dyn Before>] {
        &self.before
    }

    pub fn after_handlers(&self) -> &[Arc<dyn After>] {
        &self.after
    }

    pub fn renderer(&self) -> Option<&RendererSpec> {
        self.renderer.as_ref()
    }

    /// Matches a request path against the pattern
    pub fn matches(&self, path: &str) -> Option<Params> {
        self.pattern.matches(path)
    }

    /// Generates a URL for this route by substituting parameters
    pub fn url(&self, params: impl Into<UrlParams>) -> Result<String> {
        self.pattern.expand(&params.into())
    }

    // ========================================================================
    // Group inheritance
    // ========================================================================

    /// Applies one enclosing group's settings to this route
    ///
    /// Called once per ancestor, innermost group first, so every step
    /// prepends: prefixes and name prefixes concatenate outer-to-inner, each
    /// non-empty middleware list becomes a new outermost level, and a
    /// renderer is only filled in when nothing nearer set one.
    pub(crate) fn inherit(
        mut self,
        prefix: &str,
        name_prefix: &str,
        middleware: &[Arc<dyn Middleware>],
        renderer: Option<&RendererSpec>,
        controller: Option<&str>,
    ) -> Result<Self> {
        if let Some(controller) = controller {
            self.view = self.view.with_controller(controller, self.pattern.as_str())?;
        }

        self.pattern = self.pattern.prefixed(prefix)?;
        if let Some(name) = self.name.take() {
            self.name = Some(format!("{}{}", name_prefix, name));
        }
        if !middleware.is_empty() {
            self.inherited_middleware.insert(0, middleware.to_vec());
        }
        if self.renderer.is_none() {
            self.renderer = renderer.cloned();
        }

        Ok(self)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let middleware: Vec<Vec<&str>> = self
            .middleware()
            .into_iter()
            .map(|level| level.iter().map(|m| m.name()).collect())
            .collect();

        f.debug_struct("Route")
            .field("pattern", &self.pattern.as_str())
            .field("name", &self.name)
            .field("methods", &self.methods)
            .field("view", &self.view)
            .field("middleware", &middleware)
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .field("renderer", &self.renderer)
            .finish()
    }
}

/// Result of matching a request against the router
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route
    pub route: Arc<Route>,
    /// Arguments captured from the path
    pub params: HashMap<String, String>,
}

impl RouteMatch {
    pub fn new(route: Arc<Route>, params: Params) -> Self {
        Self { route, params }
    }

    pub fn args(&self) -> &Params {
        &self.params
    }

    pub fn name(&self) -> Option<&str> {
        self.route.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_constructors_restrict_methods() {
        let route = Route::delete("/albums/{id}", "Albums::delete").unwrap();
        assert_eq!(route.methods(), &[Method::DELETE]);
        assert!(route.allows(&Method::DELETE));
        assert!(!route.allows(&Method::GET));
    }

    #[test]
    fn test_methods_are_normalized_and_deduplicated() {
        let route = Route::new("/", "index")
            .unwrap()
            .with_method(Method::from_bytes(b"gEt").unwrap())
            .with_method(Method::GET)
            .with_method(Method::from_bytes(b"Put").unwrap());
        assert_eq!(route.methods(), &[Method::GET, Method::PUT]);
    }

    #[test]
    fn test_invalid_pattern_fails_at_construction() {
        assert!(Route::get("/...rest/tail", "index").is_err());
    }

    #[test]
    fn test_inherit_prefixes_pattern_and_name() {
        let route = Route::get("/{name}", "show")
            .unwrap()
            .with_name("name")
            .inherit("/albums", "albums:", &[], None, None)
            .unwrap();
        assert_eq!(route.pattern(), "/albums/{name}");
        assert_eq!(route.name(), Some("albums:name"));
    }

    #[test]
    fn test_inherit_keeps_unnamed_routes_unnamed() {
        let route = Route::get("", "list")
            .unwrap()
            .inherit("/albums", "albums:", &[], None, None)
            .unwrap();
        assert_eq!(route.pattern(), "/albums");
        assert_eq!(route.name(), None);
    }

    #[test]
    fn test_own_renderer_wins_over_inherited() {
        let group_renderer = RendererSpec::new("json");
        let own = Route::get("/home", "home")
            .unwrap()
            .with_renderer("template")
            .inherit("", "", &[], Some(&group_renderer), None)
            .unwrap();
        assert_eq!(own.renderer().map(|r| r.kind.as_str()), Some("template"));

        let inherited = Route::get("/", "index")
            .unwrap()
            .inherit("", "", &[], Some(&group_renderer), None)
            .unwrap();
        assert_eq!(inherited.renderer().map(|r| r.kind.as_str()), Some("json"));
    }
}
