//! The route registration unit and the action it dispatches to.

use std::fmt;

use crate::handler::{BoxedHandler, Handler};

/// What a route does once it is resolved.
///
/// The kind is fixed when the route is registered:
///
/// ```rust
/// use mvc_router::{Action, Request, Response};
///
/// async fn ping(_req: Request, _res: Response) -> &'static str { "pong" }
///
/// let closure = Action::handler(ping);
/// let view: Action = "home".into();                   // render the `home` view
/// let method: Action = ("users", "show").into();      // UsersController::show
/// # let _ = (closure, view, method);
/// ```
#[derive(Clone)]
pub enum Action {
    /// Call a closure with the request and response.
    Handler(BoxedHandler),
    /// Render the named view with the route's parameters.
    View(String),
    /// Construct the controller registered under `controller` and call `method` on it.
    Controller { controller: String, method: String },
}

impl Action {
    pub fn handler(handler: impl Handler) -> Self {
        Self::Handler(handler.into_boxed_handler())
    }

    pub fn view(name: impl Into<String>) -> Self {
        Self::View(name.into())
    }

    pub fn controller(controller: impl Into<String>, method: impl Into<String>) -> Self {
        Self::Controller { controller: controller.into(), method: method.into() }
    }
}

impl From<&str> for Action {
    fn from(name: &str) -> Self { Self::view(name) }
}

impl From<String> for Action {
    fn from(name: String) -> Self { Self::View(name) }
}

impl From<(&str, &str)> for Action {
    fn from((controller, method): (&str, &str)) -> Self {
        Self::controller(controller, method)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler(_) => f.write_str("Handler(..)"),
            Self::View(name) => f.debug_tuple("View").field(name).finish(),
            Self::Controller { controller, method } => f
                .debug_struct("Controller")
                .field("controller", controller)
                .field("method", method)
                .finish(),
        }
    }
}

/// One registered `(method, pattern)` entry.
#[derive(Clone, Debug)]
pub struct Route {
    pub(crate) pattern: String,
    pub(crate) action: Action,
    pub(crate) middleware: Option<String>,
}

impl Route {
    pub fn pattern(&self) -> &str { &self.pattern }
    pub fn action(&self) -> &Action { &self.action }
    pub fn middleware(&self) -> Option<&str> { self.middleware.as_deref() }
}
