//! REST-style resource builder.
//!
//! An [`Endpoint`] maps HTTP verbs to actions of one controller and emits a
//! route per mapping when [`Endpoint::add`] is called. Without explicit
//! mappings it registers the conventional set:
//!
//! | Verb      | Pattern                 | Action    |
//! |-----------|-------------------------|-----------|
//! | `POST`    | `/albums`               | `post`    |
//! | `GET`     | `/albums/{id}`          | `get`     |
//! | `PUT`     | `/albums/{id}`          | `put`     |
//! | `PATCH`   | `/albums/{id}`          | `patch`   |
//! | `DELETE`  | `/albums/{id}`          | `delete`  |
//! | `HEAD`    | `/albums/{id}`          | `head`    |
//! | `OPTIONS` | `/albums/{id}`          | `options` |
//!
//! Routes are named `{name}-{action}`.

use std::sync::Arc;

use axum::http::Method;

use crate::error::Result;
use crate::group::RouteAdder;
use crate::handler::{Middleware, RendererSpec};
use crate::http::normalize_method;
use crate::route::{classify_segment, Route, Segment};
use crate::view::View;

/// Which of the two resource patterns a mapping targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The bare pattern, e.g. `/albums`
    Collection,
    /// The pattern followed by one capture per identifier, e.g. `/albums/{id}`
    Member,
}

#[derive(Debug, Clone)]
struct Mapping {
    method: Method,
    action: String,
    scope: Scope,
}

/// Builder for a controller-backed resource
pub struct Endpoint<'a> {
    adder: &'a mut dyn RouteAdder,
    pattern: String,
    controller: String,
    ids: Vec<String>,
    name: Option<String>,
    middleware: Vec<Arc<dyn Middleware>>,
    renderer: Option<RendererSpec>,
    mappings: Vec<Mapping>,
}

impl<'a> Endpoint<'a> {
    pub fn new<I, S>(
        adder: &'a mut dyn RouteAdder,
        pattern: &str,
        controller: impl Into<String>,
        ids: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            adder,
            pattern: pattern.to_string(),
            controller: controller.into(),
            ids: ids.into_iter().map(Into::into).collect(),
            name: None,
            middleware: Vec::new(),
            renderer: None,
            mappings: Vec::new(),
        }
    }

    /// Base name for the emitted routes
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds middleware to every emitted route
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn render(mut self, renderer: impl Into<RendererSpec>) -> Self {
        self.renderer = Some(renderer.into());
        self
    }

    /// Maps a verb on the member pattern to an action
    pub fn map(self, method: Method, action: impl Into<String>) -> Self {
        self.push_mapping(method, action.into(), Scope::Member)
    }

    /// Maps a verb on the collection pattern to an action
    pub fn map_collection(self, method: Method, action: impl Into<String>) -> Self {
        self.push_mapping(method, action.into(), Scope::Collection)
    }

    fn push_mapping(mut self, method: Method, action: String, scope: Scope) -> Self {
        self.mappings.push(Mapping {
            method: normalize_method(method),
            action,
            scope,
        });
        self
    }

    /// Emits one route per mapping into the enclosing group or router
    pub fn add(self) -> Result<()> {
        let Endpoint {
            adder,
            pattern,
            controller,
            ids,
            name,
            middleware,
            renderer,
            mut mappings,
        } = self;

        if mappings.is_empty() {
            mappings = default_mappings();
        }

        let name = name.unwrap_or_else(|| default_name(&pattern));
        let member = member_pattern(&pattern, &ids);

        for mapping in mappings {
            let target = match mapping.scope {
                Scope::Collection => pattern.as_str(),
                Scope::Member => member.as_str(),
            };
            let view = View::action(controller.clone(), mapping.action.clone());

            let mut route = Route::new(target, view)?
                .with_method(mapping.method)
                .with_name(format!("{}-{}", name, mapping.action));
            for layer in &middleware {
                route = route.with_middleware_arc(Arc::clone(layer));
            }
            if let Some(renderer) = &renderer {
                route = route.with_renderer(renderer.clone());
            }

            adder.add_route(route)?;
        }

        Ok(())
    }
}

fn default_mappings() -> Vec<Mapping> {
    let mut mappings = vec![Mapping {
        method: Method::POST,
        action: "post".to_string(),
        scope: Scope::Collection,
    }];
    for method in [
        Method::GET,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::HEAD,
        Method::OPTIONS,
    ] {
        mappings.push(Mapping {
            action: method.as_str().to_ascii_lowercase(),
            method,
            scope: Scope::Member,
        });
    }
    mappings
}

/// `/albums` + `["album", "song"]` → `/albums/{album}/{song}`
fn member_pattern(pattern: &str, ids: &[String]) -> String {
    ids.iter().fold(pattern.to_string(), |acc, id| {
        format!("{}/{{{}}}", acc.trim_end_matches('/'), id)
    })
}

/// Literal segments of the pattern joined with `-`
fn default_name(pattern: &str) -> String {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .filter(|s| matches!(classify_segment(s), Segment::Literal(_)))
        .collect::<Vec<_>>()
        .join("-")
}
