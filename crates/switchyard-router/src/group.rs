//! Hierarchical route groups.
//!
//! # Data Flow
//! ```text
//! Group::new(prefix, builder)          (uncreated, builder stored)
//!     → create(adder)                  (router or parent group)
//!         → builder(&mut group)        add_route / verbs / endpoint / group / add_group
//!         → deferred children create(&mut group)
//!         → pending routes inherit prefix, name, middleware, renderer, controller
//!         → adder.add_route(route)
//!     (created; a second create is a no-op)
//! ```
//!
//! # Design Decisions
//! - Prefixes and names concatenate with no separator inserted
//! - Each group's middleware stays a distinct level on the emitted route
//! - The nearest renderer wins
//! - A group is only allowed to accept routes while it is being materialized
//!   into a router, directly or through its ancestors; once created it
//!   rejects further routes and groups

use std::sync::Arc;

use axum::http::Method;

use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::handler::{Middleware, RendererSpec};
use crate::route::Route;
use crate::view::View;

/// The capability a group needs from whatever it materializes into
pub trait RouteAdder {
    fn add_route(&mut self, route: Route) -> Result<()>;
}

/// Builder callback invoked with the group when it is created
pub type GroupBuilder = Box<dyn FnOnce(&mut Group) -> Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    Uncreated,
    Created,
}

/// A composition node contributing shared settings to nested routes
pub struct Group {
    prefix: String,
    name_prefix: String,
    middleware: Vec<Arc<dyn Middleware>>,
    renderer: Option<RendererSpec>,
    controller: Option<String>,
    builder: Option<GroupBuilder>,
    children: Vec<Group>,
    pending: Vec<Route>,
    attached: bool,
    state: GroupState,
}

impl Group {
    /// Creates a group; `builder` runs when the group is created
    ///
    /// # Examples
    ///
    /// ```
    /// use switchyard_router::{Group, Request, Route, Router};
    ///
    /// let mut router = Router::new();
    /// let mut group = Group::new("/albums", |group| {
    ///     group.add_route(Route::get("/{name}", "Albums::show")?.with_name("show"))?;
    ///     Ok(())
    /// })
    /// .with_name_prefix("albums:");
    /// group.create(&mut router).unwrap();
    ///
    /// let matched = router.match_request(&Request::new("GET", "/albums/symbolic").unwrap()).unwrap();
    /// assert_eq!(matched.name(), Some("albums:show"));
    /// ```
    pub fn new<F>(prefix: impl Into<String>, builder: F) -> Self
    where
        F: FnOnce(&mut Group) -> Result<()> + 'static,
    {
        Self {
            prefix: prefix.into(),
            name_prefix: String::new(),
            middleware: Vec::new(),
            renderer: None,
            controller: None,
            builder: Some(Box::new(builder)),
            children: Vec::new(),
            pending: Vec::new(),
            attached: false,
            state: GroupState::Uncreated,
        }
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    pub fn with_name_prefix(mut self, name_prefix: impl Into<String>) -> Self {
        self.name_prefix = name_prefix.into();
        self
    }

    pub fn with_middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware(middleware);
        self
    }

    pub fn with_renderer(mut self, renderer: impl Into<RendererSpec>) -> Self {
        self.render(renderer);
        self
    }

    pub fn with_controller(mut self, controller: impl Into<String>) -> Self {
        self.controller(controller);
        self
    }

    pub fn set_name_prefix(&mut self, name_prefix: impl Into<String>) -> &mut Self {
        self.name_prefix = name_prefix.into();
        self
    }

    /// Appends middleware to this group's level
    pub fn middleware(&mut self, middleware: impl Middleware + 'static) -> &mut Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn render(&mut self, renderer: impl Into<RendererSpec>) -> &mut Self {
        self.renderer = Some(renderer.into());
        self
    }

    /// Completes every bare action name under this group with `controller`
    pub fn controller(&mut self, controller: impl Into<String>) -> &mut Self {
        self.controller = Some(controller.into());
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn name_prefix(&self) -> &str {
        &self.name_prefix
    }

    pub fn state(&self) -> GroupState {
        self.state
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Buffers a route; fails unless the group is being created
    pub fn add_route(&mut self, route: Route) -> Result<()> {
        self.ensure_open()?;
        self.pending.push(route);
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == GroupState::Created {
            return Err(Error::GroupCreated(self.prefix.clone()));
        }
        if !self.attached {
            return Err(Error::RouteAdderNotSet);
        }
        Ok(())
    }

    fn add_verb(
        &mut self,
        method: Option<Method>,
        pattern: &str,
        view: View,
        name: Option<&str>,
    ) -> Result<()> {
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
    ) -> Result<()> {
        self.add_verb(Some(Method::GET), pattern, view.into(), name)
    }

    pub fn post(
        &mut self,
        pattern: &str,
        view: impl Into<View>,
        name: Option<&str>,
    ) -> Result<()> {
        self.add_verb(Some(Method::POST), pattern, view.into(), name)
    }

    pub fn put(
        &mut self,
        pattern: &str,
        view: impl Into<View>,
        name: Option<&str>,
    ) -> Result<()> {
        self.add_verb(Some(Method::PUT), pattern, view.into(), name)
    }

    pub fn patch(
        &mut self,
        pattern: &str,
        view: impl Into<View>,
        name: Option<&str>,
    ) -> Result<()> {
        self.add_verb(Some(Method::PATCH), pattern, view.into(), name)
    }

    pub fn delete(
        &mut self,
        pattern: &str,
        view: impl Into<View>,
        name: Option<&str>,
    ) -> Result<()> {
        self.add_verb(Some(Method::DELETE), pattern, view.into(), name)
    }

    pub fn head(
        &mut self,
        pattern: &str,
        view: impl Into<View>,
        name: Option<&str>,
    ) -> Result<()> {
        self.add_verb(Some(Method::HEAD), pattern, view.into(), name)
    }

    pub fn options(
        &mut self,
        pattern: &str,
        view: impl Into<View>,
        name: Option<&str>,
    ) -> Result<()> {
        self.add_verb(Some(Method::OPTIONS), pattern, view.into(), name)
    }

    /// Registers a route that matches any method
    pub fn route(
        &mut self,
        pattern: &str,
        view: impl Into<View>,
        name: Option<&str>,
    ) -> Result<()> {
        self.add_verb(None, pattern, view.into(), name)
    }

    /// Starts a resource endpoint scoped to this group
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

    /// Adds a nested group that is created when this group is created
    ///
    /// Returns the child so it can be configured further.
    pub fn group<F>(&mut self, prefix: impl Into<String>, builder: F) -> Result<&mut Group>
    where
        F: FnOnce(&mut Group) -> Result<()> + 'static,
    {
        self.ensure_open()?;
        let idx = self.children.len();
        self.children.push(Group::new(prefix, builder));
        Ok(&mut self.children[idx])
    }

    /// Adds a nested group and creates it immediately
    pub fn add_group(&mut self, mut group: Group) -> Result<()> {
        self.ensure_open()?;
        group.create(self)?;
        self.children.push(group);
        Ok(())
    }

    // ========================================================================
    // Materialization
    // ========================================================================

    /// Materializes this group into `adder`
    ///
    /// Idempotent: creating an already created group does nothing.
    pub fn create(&mut self, adder: &mut dyn RouteAdder) -> Result<()> {
        if self.state == GroupState::Created {
            return Ok(());
        }
        self.attached = true;

        if let Some(builder) = self.builder.take() {
            builder(self)?;
        }

        let mut children = std::mem::take(&mut self.children);
        for child in children.iter_mut() {
            child.create(self)?;
        }
        self.children = children;

        let pending = std::mem::take(&mut self.pending);
        tracing::debug!(
            prefix = %self.prefix,
            routes = pending.len(),
            "materializing route group"
        );
        let routes = pending
            .into_iter()
            .map(|route| {
                route.inherit(
                    &self.prefix,
                    &self.name_prefix,
                    &self.middleware,
                    self.renderer.as_ref(),
                    self.controller.as_deref(),
                )
            })
            .collect::<Result<Vec<_>>>()?;
        for route in routes {
            adder.add_route(route)?;
        }

        self.state = GroupState::Created;
        Ok(())
    }
}

impl RouteAdder for Group {
    fn add_route(&mut self, route: Route) -> Result<()> {
        Group::add_route(self, route)
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("prefix", &self.prefix)
            .field("name_prefix", &self.name_prefix)
            .field("middleware", &self.middleware.len())
            .field("renderer", &self.renderer)
            .field("controller", &self.controller)
            .field("children", &self.children)
            .field("pending", &self.pending.len())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collect(Vec<Route>);

    impl RouteAdder for Collect {
        fn add_route(&mut self, route: Route) -> Result<()> {
            self.0.push(route);
            Ok(())
        }
    }

    #[test]
    fn test_add_route_requires_adder() {
        let mut group = Group::new("/albums", |_| Ok(())).with_name_prefix("test:");
        let err = group.add_route(Route::get("/", "index").unwrap()).unwrap_err();
        assert!(matches!(err, Error::RouteAdderNotSet));
    }

    #[test]
    fn test_create_is_idempotent() {
        let mut sink = Collect::default();
        let mut group = Group::new("/albums", |g| g.get("", "list", None));

        group.create(&mut sink).unwrap();
        group.create(&mut sink).unwrap();

        assert_eq!(sink.0.len(), 1);
        assert_eq!(group.state(), GroupState::Created);
    }

    #[test]
    fn test_created_group_rejects_late_routes() {
        let mut sink = Collect::default();
        let mut group = Group::new("/albums", |g| g.get("", "list", None));
        group.create(&mut sink).unwrap();

        let err = group.get("/late", "late", None).unwrap_err();
        assert!(matches!(err, Error::GroupCreated(ref prefix) if prefix == "/albums"));
        assert!(err.is_configuration());
        assert!(group.group("/late", |g| g.get("", "late", None)).is_err());
        assert_eq!(sink.0.len(), 1);
    }

    #[test]
    fn test_failed_inheritance_adds_nothing() {
        let mut sink = Collect::default();
        let mut group = Group::new("/albums", |g| {
            g.get("/list", "list", None)?;
            g.get("/show", "Albums::show", None)
        })
        .with_controller("Albums");

        let err = group.create(&mut sink).unwrap_err();
        assert!(matches!(err, Error::ControllerConflict { .. }));
        assert!(sink.0.is_empty());
    }

    #[test]
    fn test_deferred_children_follow_direct_routes() {
        let mut sink = Collect::default();
        let mut group = Group::new("/media", |g| {
            g.group("/music", |g| g.get("", "music", None))?;
            g.get("", "media", None)
        });
        group.create(&mut sink).unwrap();

        let patterns: Vec<&str> = sink.0.iter().map(|r| r.pattern()).collect();
        assert_eq!(patterns, vec!["/media", "/media/music"]);
    }

    #[test]
    fn test_add_group_registers_in_call_order() {
        let mut sink = Collect::default();
        let mut group = Group::new("/media", |g| {
            g.get("/first", "first", None)?;
            g.add_group(Group::new("/albums", |g| g.get("", "albums", None)))?;
            g.get("/last", "last", None)
        });
        group.create(&mut sink).unwrap();

        let patterns: Vec<&str> = sink.0.iter().map(|r| r.pattern()).collect();
        assert_eq!(patterns, vec!["/media/first", "/media/albums", "/media/last"]);
    }
}
