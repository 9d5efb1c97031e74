//! Pipeline stage contracts.
//!
//! ```text
//! Request
//!     → Before (each returns a possibly rebuilt request)
//!     → Middleware onion (outer → inner, each wraps `Next`)
//!         → View → After chain → Renderer
//!     ← Middleware onion (inner → outer, may rewrite the response)
//! Response
//! ```
//!
//! Every stage is synchronous. An error from any stage aborts the pipeline
//! and reaches the caller of `Dispatcher::dispatch` unchanged.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::{Reply, Request, Response};
use crate::route::RouteMatch;

/// Transforms the request before middleware and view run
pub trait Before: Send + Sync {
    fn handle(&self, request: Request) -> anyhow::Result<Request>;
}

/// A layer of the middleware onion
///
/// A middleware may inspect or rebuild the request, delegate to `next`, and
/// inspect or rewrite the response the inner layers produced.
pub trait Middleware: Send + Sync {
    fn process(&self, request: Request, next: Next<'_>) -> anyhow::Result<Response>;

    /// Label used in logs and when inspecting a route's middleware levels
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Turns view data into a response, or passes transformed data on
///
/// Returning `Reply::Response` short-circuits the remaining after-handlers.
pub trait After: Send + Sync {
    fn handle(&self, data: Value, matched: &RouteMatch) -> anyhow::Result<Reply>;
}

/// Serializes view data into a response according to a [`RendererSpec`]
pub trait Renderer: Send + Sync {
    fn render(&self, data: Value, spec: &RendererSpec) -> anyhow::Result<Response>;
}

impl<F> Before for F
where
    F: Fn(Request) -> anyhow::Result<Request> + Send + Sync,
{
    fn handle(&self, request: Request) -> anyhow::Result<Request> {
        self(request)
    }
}

impl<F> Renderer for F
where
    F: Fn(Value, &RendererSpec) -> anyhow::Result<Response> + Send + Sync,
{
    fn render(&self, data: Value, spec: &RendererSpec) -> anyhow::Result<Response> {
        self(data, spec)
    }
}

/// The terminal stage the onion wraps
pub(crate) type Terminal<'a> = &'a dyn Fn(Request) -> anyhow::Result<Response>;

/// The remainder of the middleware onion
///
/// Calling [`Next::run`] hands the request to the next inner layer, or to the
/// view when no layers remain.
pub struct Next<'a> {
    layers: &'a [Arc<dyn Middleware>],
    endpoint: Terminal<'a>,
}

impl<'a> Next<'a> {
    pub(crate) fn new(layers: &'a [Arc<dyn Middleware>], endpoint: Terminal<'a>) -> Self {
        Self { layers, endpoint }
    }

    pub fn run(self, request: Request) -> anyhow::Result<Response> {
        match self.layers.split_first() {
            Some((layer, inner)) => layer.process(request, Next::new(inner, self.endpoint)),
            None => (self.endpoint)(request),
        }
    }

    /// Number of middleware layers still to run
    pub fn remaining(&self) -> usize {
        self.layers.len()
    }
}

/// Renderer descriptor attached to a route or group
///
/// `kind` selects a renderer registered on the dispatcher; `options` is
/// free-form configuration handed to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RendererSpec {
    pub kind: String,
    #[serde(default)]
    pub options: Value,
}

impl RendererSpec {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            options: Value::Null,
        }
    }

    pub fn with_options(kind: impl Into<String>, options: Value) -> Self {
        Self {
            kind: kind.into(),
            options,
        }
    }

    /// String option lookup
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }
}

impl From<&str> for RendererSpec {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

impl From<String> for RendererSpec {
    fn from(kind: String) -> Self {
        Self::new(kind)
    }
}
