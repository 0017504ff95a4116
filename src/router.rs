//! Route registration and request dispatch.
//!
//! Registration is a chain of by-value calls that starts from
//! [`Router::new`]. Each route registration returns a [`RouteBuilder`], which
//! can take the route's middleware with [`RouteBuilder::only`] or simply
//! carry on registering.
//!
//! ```rust
//! use mvc_router::{Action, Request, Response, Router};
//!
//! async fn health(_req: Request, res: Response) -> Response { res }
//!
//! let app: Router = Router::new()
//!     .get("/", "home")                                 // view
//!     .get("/health", Action::handler(health))
//!     .prefix("/admin")
//!     .controller("admin")
//!     .get("/users/{id}", "show").only("auth")          // AdminController::show
//!     .post("/users/{id}", "update")
//!     .into();
//! ```

use std::sync::Arc;

use http::StatusCode;
use tracing::debug;

use crate::controller::{Controller, ControllerRegistry};
use crate::error::{Error, ErrorTitles};
use crate::matcher;
use crate::method::Method;
use crate::middleware::{Middleware, MiddlewareRegistry};
use crate::request::{Params, Request};
use crate::response::Response;
use crate::route::Action;
use crate::table::RouteTable;
use crate::view::{ViewContext, ViewRenderer};

/// The application router.
///
/// Build it once at startup and pass it to
/// [`Server::serve`](crate::Server::serve). Resolution only reads the router,
/// so one instance serves every request concurrently.
#[derive(Clone, Default)]
pub struct Router {
    table: RouteTable,
    prefix: String,
    controller: Option<String>,
    middleware: MiddlewareRegistry,
    controllers: ControllerRegistry,
    views: Option<Arc<dyn ViewRenderer>>,
    error_titles: ErrorTitles,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Registration ─────────────────────────────────────────────────────────

    /// Registers `action` for `method` + `pattern`. Registering the same pair
    /// again replaces its action and middleware.
    ///
    /// The current [`prefix`](Router::prefix) is prepended to `pattern`. While
    /// a [`controller`](Router::controller) is bound, a plain string action
    /// names a method on that controller instead of a view.
    pub fn route(self, method: Method, pattern: &str, action: impl Into<Action>) -> RouteBuilder {
        let pattern = join(&self.prefix, pattern);
        let action = match (action.into(), &self.controller) {
            (Action::View(name), Some(controller)) => Action::controller(controller.as_str(), name),
            (action, _) => action,
        };
        RouteBuilder { router: self, method, pattern, action }
    }

    pub fn get(self, pattern: &str, action: impl Into<Action>) -> RouteBuilder {
        self.route(Method::Get, pattern, action)
    }

    pub fn post(self, pattern: &str, action: impl Into<Action>) -> RouteBuilder {
        self.route(Method::Post, pattern, action)
    }

    pub fn put(self, pattern: &str, action: impl Into<Action>) -> RouteBuilder {
        self.route(Method::Put, pattern, action)
    }

    pub fn patch(self, pattern: &str, action: impl Into<Action>) -> RouteBuilder {
        self.route(Method::Patch, pattern, action)
    }

    pub fn delete(self, pattern: &str, action: impl Into<Action>) -> RouteBuilder {
        self.route(Method::Delete, pattern, action)
    }

    pub fn update(self, pattern: &str, action: impl Into<Action>) -> RouteBuilder {
        self.route(Method::Update, pattern, action)
    }

    /// Prepends `prefix` to every pattern registered from now on. An empty
    /// prefix clears it. Routes already registered are unaffected.
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_owned();
        self
    }

    /// Binds string actions registered from now on to the controller
    /// registered under `key`. An empty key unbinds.
    pub fn controller(mut self, key: &str) -> Self {
        self.controller = (!key.is_empty()).then(|| key.to_owned());
        self
    }

    /// Merges the routes of `other` into this router, `other` winning on
    /// conflicting `(method, pattern)` pairs. Its middleware and controller
    /// registrations come along; its prefix, bound controller, view renderer
    /// and error titles do not.
    pub fn include(mut self, other: Router) -> Self {
        self.table.merge(other.table);
        self.middleware.merge(other.middleware);
        self.controllers.merge(other.controllers);
        self
    }

    /// Registers middleware under `key` for use with [`RouteBuilder::only`].
    pub fn middleware(mut self, key: &str, middleware: impl Middleware) -> Self {
        self.middleware.register(key, middleware);
        self
    }

    /// Registers a controller factory under `key`.
    pub fn register_controller<C, F>(mut self, key: &str, factory: F) -> Self
    where
        C: Controller,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.controllers.register(key, factory);
        self
    }

    /// Installs the renderer used by view routes.
    pub fn views(mut self, renderer: impl ViewRenderer) -> Self {
        self.views = Some(Arc::new(renderer));
        self
    }

    /// Overrides the title sent with error responses of `status`.
    pub fn error_title(mut self, status: StatusCode, title: &str) -> Self {
        self.error_titles.set(status, title);
        self
    }

    // ── Inspection ───────────────────────────────────────────────────────────

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Checks that every middleware and controller a route names is
    /// registered, and that a renderer exists if any route is a view.
    pub fn validate(&self) -> Result<(), Error> {
        for (method, route) in self.table.iter() {
            let location = || format!("{method} {}", route.pattern());
            if let Some(key) = route.middleware().filter(|k| !k.is_empty()) {
                if !self.middleware.contains(key) {
                    return Err(Error::InvalidArgument(format!(
                        "{} uses unregistered middleware `{key}`",
                        location()
                    )));
                }
            }
            match route.action() {
                Action::Controller { controller, .. } if !self.controllers.contains(controller) => {
                    return Err(Error::InvalidArgument(format!(
                        "{} uses unregistered controller `{controller}`",
                        location()
                    )));
                }
                Action::View(name) if self.views.is_none() => {
                    return Err(Error::InvalidArgument(format!(
                        "{} renders view `{name}` but no view renderer is installed",
                        location()
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// The response reported for a failed resolution.
    pub fn error_response(&self, err: &Error) -> Response {
        self.error_titles.respond(err)
    }

    // ── Dispatch ─────────────────────────────────────────────────────────────

    /// Resolves `request` to a route and runs it.
    ///
    /// The matched parameters are published on the request, the route's
    /// middleware runs, then the action: a view is rendered, a controller is
    /// built and called, a closure is called. Whatever the action produces is
    /// returned unmodified. Nothing is dispatched if no route matches or the
    /// middleware rejects the request.
    pub async fn resolve(&self, mut request: Request, response: Response) -> Result<Response, Error> {
        let method = request.method();
        let mut params = Params::new();

        let route = match matcher::find(self.table.routes(method), request.path()) {
            Some(found) => {
                params = found.params;
                self.table.get(method, found.pattern)
            }
            None => self.table.get(method, request.path()),
        };
        let Some(route) = route else {
            debug!(%method, path = request.path(), "no route matched");
            return Err(Error::RouteNotFound { method, path: request.path().to_owned() });
        };

        debug!(%method, path = request.path(), pattern = route.pattern(), "route resolved");
        request.set_params(params);
        self.middleware.resolve(route.middleware(), &request)?;

        match route.action() {
            Action::Handler(handler) => Ok(handler.call(request, response).await),
            Action::View(name) => self.render(name, &request, response),
            Action::Controller { controller, method: action } => {
                self.controllers.dispatch(controller, action, request, response).await
            }
        }
    }

    fn render(&self, name: &str, request: &Request, mut response: Response) -> Result<Response, Error> {
        let renderer = self
            .views
            .as_ref()
            .ok_or_else(|| Error::NoViewRenderer(name.to_owned()))?;

        let context = ViewContext { title: name.to_owned(), params: request.params().clone() };
        let html = renderer
            .render(name, &context)
            .map_err(|source| Error::View { name: name.to_owned(), source })?;

        response.set_header("content-type", "text/html; charset=utf-8");
        response.set_body(html);
        Ok(response)
    }
}

/// `prefix` + `pattern` with exactly one `/` between them.
fn join(prefix: &str, pattern: &str) -> String {
    if prefix.is_empty() {
        return pattern.to_owned();
    }
    format!("{}/{}", prefix.trim_end_matches('/'), pattern.trim_start_matches('/'))
}

// ── RouteBuilder ──────────────────────────────────────────────────────────────

/// A route that has just been registered.
///
/// [`only`](RouteBuilder::only) attaches middleware to exactly this route.
/// Every other registration call is available too, so chains read the same
/// with or without middleware; converting into [`Router`] finishes the chain.
#[must_use = "a route is only added once the chain continues or is converted into a Router"]
pub struct RouteBuilder {
    router: Router,
    method: Method,
    pattern: String,
    action: Action,
}

macro_rules! forward {
    ($( $(#[$meta:meta])* fn $name:ident(self $(, $arg:ident: $ty:ty)*) -> $ret:ty; )*) => {
        $(
            $(#[$meta])*
            pub fn $name(self $(, $arg: $ty)*) -> $ret {
                self.commit(None).$name($($arg),*)
            }
        )*
    };
}

impl RouteBuilder {
    /// Runs the middleware registered under `key` before this route.
    pub fn only(self, key: &str) -> Router {
        self.commit(Some(key.to_owned()))
    }

    fn commit(mut self, middleware: Option<String>) -> Router {
        debug!(method = %self.method, pattern = %self.pattern, ?middleware, "route registered");
        self.router.table.add(self.method, self.pattern, self.action, middleware);
        self.router
    }

    forward! {
        fn route(self, method: Method, pattern: &str, action: impl Into<Action>) -> RouteBuilder;
        fn get(self, pattern: &str, action: impl Into<Action>) -> RouteBuilder;
        fn post(self, pattern: &str, action: impl Into<Action>) -> RouteBuilder;
        fn put(self, pattern: &str, action: impl Into<Action>) -> RouteBuilder;
        fn patch(self, pattern: &str, action: impl Into<Action>) -> RouteBuilder;
        fn delete(self, pattern: &str, action: impl Into<Action>) -> RouteBuilder;
        fn update(self, pattern: &str, action: impl Into<Action>) -> RouteBuilder;
        fn prefix(self, prefix: &str) -> Router;
        fn controller(self, key: &str) -> Router;
        fn include(self, other: Router) -> Router;
        fn middleware(self, key: &str, middleware: impl Middleware) -> Router;
        fn views(self, renderer: impl ViewRenderer) -> Router;
        fn error_title(self, status: StatusCode, title: &str) -> Router;
    }

    pub fn register_controller<C, F>(self, key: &str, factory: F) -> Router
    where
        C: Controller,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.commit(None).register_controller(key, factory)
    }
}

impl From<RouteBuilder> for Router {
    fn from(builder: RouteBuilder) -> Self {
        builder.commit(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::Rejection;

    fn action(router: &Router, method: Method, pattern: &str) -> String {
        let route = router.table().get(method, pattern).unwrap_or_else(|| panic!("no route {pattern}"));
        format!("{:?}", route.action())
    }

    #[test]
    fn prefix_is_sticky_and_not_retroactive() {
        let router: Router = Router::new()
            .get("/", "home")
            .prefix("/admin/")
            .get("/users", "users")
            .get("stats", "stats")
            .prefix("")
            .get("/about", "about")
            .into();

        let patterns: Vec<_> = router.table().routes(Method::Get).iter().map(|r| r.pattern()).collect();
        assert_eq!(patterns, ["/", "/admin/users", "/admin/stats", "/about"]);
    }

    #[test]
    fn bound_controller_turns_strings_into_methods() {
        let router: Router = Router::new()
            .get("/", "home")
            .controller("users")
            .get("/users/{id}", "show")
            .get("/users/{id}/card", Action::view("card"))
            .controller("")
            .get("/about", "about")
            .into();

        assert_eq!(action(&router, Method::Get, "/"), r#"View("home")"#);
        assert_eq!(
            action(&router, Method::Get, "/users/{id}"),
            r#"Controller { controller: "users", method: "show" }"#,
        );
        assert_eq!(
            action(&router, Method::Get, "/users/{id}/card"),
            r#"Controller { controller: "users", method: "card" }"#,
        );
        assert_eq!(action(&router, Method::Get, "/about"), r#"View("about")"#);
    }

    #[test]
    fn only_applies_to_the_route_just_registered() {
        let router = Router::new()
            .get("/admin", "admin").only("auth")
            .get("/public", "public")
            .post("/admin", "save").only("csrf");
        let router: Router = router.into();

        let table = router.table();
        assert_eq!(table.get(Method::Get, "/admin").unwrap().middleware(), Some("auth"));
        assert_eq!(table.get(Method::Get, "/public").unwrap().middleware(), None);
        assert_eq!(table.get(Method::Post, "/admin").unwrap().middleware(), Some("csrf"));
    }

    #[test]
    fn reregistering_clears_middleware() {
        let router: Router = Router::new()
            .get("/admin", "old").only("auth")
            .get("/admin", "new")
            .into();
        let route = router.table().get(Method::Get, "/admin").unwrap();
        assert_eq!(route.middleware(), None);
        assert_eq!(format!("{:?}", route.action()), r#"View("new")"#);
    }

    #[test]
    fn validate_reports_missing_registrations() {
        let router: Router = Router::new().get("/", "home").into();
        assert!(matches!(router.validate(), Err(Error::InvalidArgument(_))));

        let router: Router = Router::new()
            .get("/x", ("users", "index")).only("auth")
            .middleware("auth", |_: &Request| -> Result<(), Rejection> { Ok(()) });
        assert!(matches!(router.validate(), Err(Error::InvalidArgument(msg)) if msg.contains("users")));

        let router: Router = Router::new().get("/x", "home").only("auth");
        assert!(matches!(router.validate(), Err(Error::InvalidArgument(msg)) if msg.contains("auth")));
    }

    #[test]
    fn join_normalizes_slashes() {
        assert_eq!(join("", "/a"), "/a");
        assert_eq!(join("/admin", "/a"), "/admin/a");
        assert_eq!(join("/admin/", "a"), "/admin/a");
    }
}
