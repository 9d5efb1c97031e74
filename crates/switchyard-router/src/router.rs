//! Route registry and two-phase matching.
//!
//! # Data Flow
//! ```text
//! (method, path)
//!     → scan routes in registration order
//!         pattern matches, method allowed  → RouteMatch (stop)
//!         pattern matches, method excluded → remember route methods
//!         pattern misses                   → continue
//!     → remembered methods?  MethodNotAllowed { allowed } : NotFound
//! ```
//!
//! Registration order is significant: the first route whose pattern and
//! method filter both pass wins, and later routes may serve methods an
//! earlier route with the same pattern does not.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use axum::http::Method;

use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::group::{Group, RouteAdder};
use crate::http::{normalize_method, Request};
use crate::route::{Route, RouteMatch, UrlParams};
use crate::statics::{StaticDir, StaticRoutes};
use crate::view::View;

/// Registry of materialized routes
#[derive(Debug, Default, Clone)]
pub struct Router {
    routes: Vec<Arc<Route>>,
    named: HashMap<String, Arc<Route>>,
    statics: StaticRoutes,
}

impl Router {
    /// Creates an empty router
    ///
    /// # Examples
    ///
    /// ```
    /// use switchyard_router::{Route, Router};
    /// use axum::http::Method;
    ///
    /// let mut router = Router::new();
    /// router.add_route(Route::get("/albums/{id}", "Albums::show").unwrap()).unwrap();
    ///
    /// let matched = router.match_route(&Method::GET, "/albums/13").unwrap();
    /// assert_eq!(matched.params["id"], "13");
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Appends a finished route
    ///
    /// Named routes are indexed for URL generation; a name may only be used
    /// once.
    pub fn add_route(&mut self, route: Route) -> Result<Arc<Route>> {
        if let Some(name) = route.name() {
            if self.named.contains_key(name) {
                return Err(Error::DuplicateRouteName(name.to_string()));
            }
        }

        let route = Arc::new(route);
        if let Some(name) = route.name() {
            self.named.insert(name.to_string(), Arc::clone(&route));
        }

        tracing::debug!(
            pattern = route.pattern(),
            name = route.name(),
            methods = ?route.methods(),
            "registered route"
        );

        self.routes.push(Arc::clone(&route));
        Ok(route)
    }

    fn add_verb(
        &mut self,
        method: Option<Method>,
        pattern: &str,
        view: View,
        name: Option<&str>,
    ) -> Result<Arc<Route>> {
        let route = Route::new(pattern, view)?;
        let route = match method {
            Some(method) => route.with_method(method),
            None => route,
        };
        let route = match name {
            Some(name) => route.with_name(name),
            None => route,
        };
        self.add_route(route)
    }

    pub fn get(
        &mut self,
        pattern: &str,
        view: impl Into<View>,
        name: Option<&str>,
    ) -> Result<Arc<Route>> {
        self.add_verb(Some(Method::GET), pattern, view.into(), name)
    }

    pub fn post(
        &mut self,
        pattern: &str,
        view: impl Into<View>,
        name: Option<&str>,
    ) -> Result<Arc<Route>> {
        self.add_verb(Some(Method::POST), pattern, view.into(), name)
    }

    pub fn put(
        &mut self,
        pattern: &str,
        view: impl Into<View>,
        name: Option<&str>,
    ) -> Result<Arc<Route>> {
        self.add_verb(Some(Method::PUT), pattern, view.into(), name)
    }

    pub fn patch(
        &mut self,
        pattern: &str,
        view: impl Into<View>,
        name: Option<&str>,
    ) -> Result<Arc<Route>> {
        self.add_verb(Some(Method::PATCH), pattern, view.into(), name)
    }

    pub fn delete(
        &mut self,
        pattern: &str,
        view: impl Into<View>,
        name: Option<&str>,
    ) -> Result<Arc<Route>> {
        self.add_verb(Some(Method::DELETE), pattern, view.into(), name)
    }

    pub fn head(
        &mut self,
        pattern: &str,
        view: impl Into<View>,
        name: Option<&str>,
    ) -> Result<Arc<Route>> {
        self.add_verb(Some(Method::HEAD), pattern, view.into(), name)
    }

    pub fn options(
        &mut self,
        pattern: &str,
        view: impl Into<View>,
        name: Option<&str>,
    ) -> Result<Arc<Route>> {
        self.add_verb(Some(Method::OPTIONS), pattern, view.into(), name)
    }

    /// Registers a route that matches any method
    pub fn route(
        &mut self,
        pattern: &str,
        view: impl Into<View>,
        name: Option<&str>,
    ) -> Result<Arc<Route>> {
        self.add_verb(None, pattern, view.into(), name)
    }

    /// Runs a registration callback against this router
    pub fn routes<F>(&mut self, register: F) -> Result<()>
    where
        F: FnOnce(&mut Router) -> Result<()>,
    {
        register(self)
    }

    /// Creates a group under `prefix` and materializes it right away
    pub fn group<F>(&mut self, prefix: impl Into<String>, builder: F) -> Result<()>
    where
        F: FnOnce(&mut Group) -> Result<()> + 'static,
    {
        Group::new(prefix, builder).create(self)
    }

    /// Materializes an already configured group
    pub fn add_group(&mut self, mut group: Group) -> Result<()> {
        group.create(self)
    }

    /// Starts a resource endpoint registered directly on this router
    pub fn endpoint<I, S>(
        &mut self,
        pattern: &str,
        controller: impl Into<String>,
        ids: I,
    ) -> Endpoint<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Endpoint::new(self, pattern, controller, ids)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Named route lookup
    pub fn route_by_name(&self, name: &str) -> Option<&Arc<Route>> {
        self.named.get(name)
    }

    /// All routes in registration order
    pub fn routes_iter(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    // ========================================================================
    // Matching
    // ========================================================================

    /// Resolves a request to a route
    pub fn match_request(&self, request: &Request) -> Result<RouteMatch> {
        self.match_route(request.method(), request.path())
    }

    /// Resolves a method and a percent-encoded path to a route
    ///
    /// Fails with [`Error::MethodNotAllowed`] when some route pattern matched
    /// the path but none allowed the method, and with [`Error::NotFound`]
    /// when no pattern matched at all.
    pub fn match_route(&self, method: &Method, path: &str) -> Result<RouteMatch> {
        let method = normalize_method(method.clone());
        let mut seen: Vec<Method> = Vec::new();

        for route in &self.routes {
            let Some(params) = route.matches(path) else {
                continue;
            };

            if route.allows(&method) {
                tracing::trace!(%method, path, pattern = route.pattern(), "route matched");
                return Ok(RouteMatch::new(Arc::clone(route), params));
            }

            seen.extend(route.methods().iter().cloned());
        }

        if seen.is_empty() {
            tracing::debug!(%method, path, "no route matched");
            return Err(Error::NotFound {
                method,
                path: path.to_string(),
            });
        }

        seen.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        seen.dedup();

        tracing::debug!(%method, path, allowed = ?seen, "method not allowed");
        Err(Error::MethodNotAllowed {
            method,
            path: path.to_string(),
            allowed: seen,
        })
    }

    // ========================================================================
    // URL generation
    // ========================================================================

    /// Generates the path of a named route
    ///
    /// # Examples
    ///
    /// ```
    /// use switchyard_router::{Route, Router};
    ///
    /// let mut router = Router::new();
    /// router
    ///     .add_route(Route::get("/albums/{from}/{to}", "Albums::range").unwrap().with_name("albums"))
    ///     .unwrap();
    ///
    /// assert_eq!(router.route_url("albums", [("from", 1990), ("to", 1995)]).unwrap(), "/albums/1990/1995");
    /// assert_eq!(router.route_url("albums", vec![1990, 1995]).unwrap(), "/albums/1990/1995");
    /// ```
    pub fn route_url(&self, name: &str, params: impl Into<UrlParams>) -> Result<String> {
        let route = self
            .named
            .get(name)
            .ok_or_else(|| Error::RouteNotFound(name.to_string()))?;
        route.url(params)
    }

    // ========================================================================
    // Static routes
    // ========================================================================

    /// Registers a static directory under `prefix` and optionally `name`
    pub fn add_static(&mut self, prefix: &str, dir: impl AsRef<Path>, name: Option<&str>) -> Result<()> {
        self.statics.add(prefix, dir, name)
    }

    /// Public URL of a file in a static directory, by prefix or name
    pub fn static_url(
        &self,
        identifier: &str,
        file: &str,
        bust: bool,
        host: Option<&str>,
    ) -> Result<String> {
        self.statics.url(identifier, file, bust, host)
    }

    pub fn static_dir(&self, identifier: &str) -> Option<&StaticDir> {
        self.statics.get(identifier)
    }

    pub fn statics(&self) -> &StaticRoutes {
        &self.statics
    }
}

impl RouteAdder for Router {
    fn add_route(&mut self, route: Route) -> Result<()> {
        Router::add_route(self, route).map(|_| ())
    }
}
