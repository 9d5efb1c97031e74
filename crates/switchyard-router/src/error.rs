//! Error taxonomy surfaced to the host.
//!
//! Two kinds of failure live here:
//! - **Match failures** (`NotFound`, `MethodNotAllowed`) reported once at the
//!   end of a full scan of the registry
//! - **Configuration failures** raised while routes, groups and static
//!   directories are registered, before any request is served
//!
//! A pattern that simply does not match a path is not an error and never
//! produces one of these values.

use std::path::PathBuf;

use axum::http::{Method, StatusCode};

/// Errors produced by the routing and dispatch core
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No registered route pattern matched the request path
    #[error("Not found: {method} {path}")]
    NotFound { method: Method, path: String },

    /// At least one route pattern matched, but none allows the request method
    #[error("Method not allowed: {method} {path}")]
    MethodNotAllowed {
        method: Method,
        path: String,
        /// Union of the methods of every route whose pattern matched
        allowed: Vec<Method>,
    },

    #[error("Invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Cannot add controller `{controller}` to route `{pattern}`: {reason}")]
    ControllerConflict {
        controller: String,
        pattern: String,
        reason: &'static str,
    },

    #[error("Route group `{0}` is already created and accepts no further routes")]
    GroupCreated(String),

    #[error("RouteAdder not set")]
    RouteAdderNotSet,

    #[error("Duplicate route name: {0}")]
    DuplicateRouteName(String),

    #[error("Duplicate static route: {0}")]
    DuplicateStatic(String),

    #[error("Static directory {0:?} does not exist")]
    MissingDirectory(PathBuf),

    #[error("Static route not found: {0}")]
    StaticNotFound(String),

    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Missing parameter `{param}` for route pattern `{pattern}`")]
    MissingParameter { pattern: String, param: String },

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Invalid request URI `{uri}`: {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("No invoker configured for controller action {controller}::{action}")]
    MissingInvoker { controller: String, action: String },

    #[error("No renderer registered for `{0}`")]
    UnknownRenderer(String),

    #[error("View of route `{0}` returned data that no after-handler or renderer turned into a response")]
    UnrenderedReply(String),

    /// Failure raised by a before-handler, middleware, view, after-handler or renderer
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

/// Result alias used across the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// HTTP status a host would answer with for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this error signals a registration-time mistake
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidPattern { .. }
                | Error::ControllerConflict { .. }
                | Error::RouteAdderNotSet
                | Error::GroupCreated(_)
                | Error::DuplicateRouteName(_)
                | Error::DuplicateStatic(_)
                | Error::MissingDirectory(_)
        )
    }

    /// Allowed methods carried by a `MethodNotAllowed` error
    pub fn allowed_methods(&self) -> Option<&[Method]> {
        match self {
            Error::MethodNotAllowed { allowed, .. } => Some(allowed),
            _ => None,
        }
    }
}
