//! View targets and their invocation.
//!
//! A route points at one of three targets:
//! - a closure invoked directly with the request and captured arguments
//! - a controller action (`controller`, `action`) resolved by an [`Invoker`]
//! - a bare action name, completed into a controller action by a group's
//!   controller setting
//!
//! The core never looks inside controller types; argument binding and type
//! coercion of the (string-valued) captures belong to the invoker.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::http::{Reply, Request};
use crate::route::pattern::Params;

/// Closure view signature
pub type ViewFn = dyn Fn(Request, &Params) -> anyhow::Result<Reply> + Send + Sync;

/// The target a route dispatches to
#[derive(Clone)]
pub enum View {
    Handler(Arc<ViewFn>),
    Action { controller: String, action: String },
    Named(String),
}

impl View {
    /// Wraps a closure as a view
    ///
    /// # Examples
    ///
    /// ```
    /// use switchyard_router::{Reply, View};
    ///
    /// let view = View::handler(|_request, args| {
    ///     Ok(Reply::data(args.get("id").cloned().unwrap_or_default()))
    /// });
    /// assert!(view.is_handler());
    /// ```
    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(Request, &Params) -> anyhow::Result<Reply> + Send + Sync + 'static,
    {
        View::Handler(Arc::new(f))
    }

    pub fn action(controller: impl Into<String>, action: impl Into<String>) -> Self {
        View::Action {
            controller: controller.into(),
            action: action.into(),
        }
    }

    pub fn is_handler(&self) -> bool {
        matches!(self, View::Handler(_))
    }

    /// `(controller, action)` when this is a controller action
    pub fn as_action(&self) -> Option<(&str, &str)> {
        match self {
            View::Action { controller, action } => Some((controller, action)),
            _ => None,
        }
    }

    /// Completes a bare action name with `controller`
    ///
    /// Closures and already-resolved actions cannot take a controller.
    pub(crate) fn with_controller(self, controller: &str, pattern: &str) -> Result<Self> {
        let conflict = |reason| Error::ControllerConflict {
            controller: controller.to_string(),
            pattern: pattern.to_string(),
            reason,
        };

        match self {
            View::Named(action) => Ok(View::action(controller, action)),
            View::Handler(_) => Err(conflict("view is a closure")),
            View::Action { .. } => Err(conflict("view is already a controller action")),
        }
    }
}

/// `"Controller::action"` parses to an action, anything else is a bare name
impl From<&str> for View {
    fn from(target: &str) -> Self {
        match target.split_once("::") {
            Some((controller, action)) => View::action(controller, action),
            None => View::Named(target.to_string()),
        }
    }
}

impl From<String> for View {
    fn from(target: String) -> Self {
        View::from(target.as_str())
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Handler(_) => f.write_str("View::Handler(..)"),
            View::Action { controller, action } => write!(f, "View::Action({}::{})", controller, action),
            View::Named(action) => write!(f, "View::Named({})", action),
        }
    }
}

/// Resolves controller actions to calls
///
/// Bare action names registered outside any controller group arrive with an
/// empty `controller`.
pub trait Invoker: Send + Sync {
    fn invoke(
        &self,
        controller: &str,
        action: &str,
        request: Request,
        args: &Params,
    ) -> anyhow::Result<Reply>;
}

/// Map-backed [`Invoker`]: `(controller, action)` → closure
///
/// # Examples
///
/// ```
/// use switchyard_router::{Controllers, Invoker, Reply, Request};
/// use std::collections::HashMap;
///
/// let controllers = Controllers::new()
///     .action("Albums", "show", |_req, args| Ok(Reply::data(args["id"].clone())));
///
/// let reply = controllers
///     .invoke("Albums", "show", Request::new("GET", "/").unwrap(), &HashMap::from([("id".into(), "7".into())]))
///     .unwrap();
/// assert!(matches!(reply, Reply::Data(v) if v == "7"));
/// ```
#[derive(Default, Clone)]
pub struct Controllers {
    actions: HashMap<(String, String), Arc<ViewFn>>,
}

impl Controllers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action<F>(mut self, controller: impl Into<String>, action: impl Into<String>, f: F) -> Self
    where
        F: Fn(Request, &Params) -> anyhow::Result<Reply> + Send + Sync + 'static,
    {
        self.actions
            .insert((controller.into(), action.into()), Arc::new(f));
        self
    }

    pub fn contains(&self, controller: &str, action: &str) -> bool {
        self.actions
            .contains_key(&(controller.to_string(), action.to_string()))
    }
}

impl Invoker for Controllers {
    fn invoke(
        &self,
        controller: &str,
        action: &str,
        request: Request,
        args: &Params,
    ) -> anyhow::Result<Reply> {
        let handler = self
            .actions
            .get(&(controller.to_string(), action.to_string()))
            .ok_or_else(|| anyhow::anyhow!("Unknown controller action {}::{}", controller, action))?;
        handler(request, args)
    }
}
