//! # mvc-router
//!
//! Route table, path matching and request dispatch for a small MVC
//! framework.
//!
//! Application code declares routes; the router resolves every inbound
//! request to one of them, runs the route's middleware, and dispatches to a
//! closure, a controller method, or a view.
//!
//! - Patterns are slash-separated literals and `{name}` parameters.
//! - A literal route always beats a parametrized one of the same shape;
//!   otherwise the first registered pattern that fits wins.
//! - Parameters are URL-decoded strings, read with [`Request::param`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::StatusCode;
//! use mvc_router::{Action, Request, Response, Router, Server};
//! use mvc_router::middleware::Rejection;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mvc_router::Error> {
//!     let app = Router::new()
//!         .middleware("auth", |req: &Request| match req.header("authorization") {
//!             Some(_) => Ok(()),
//!             None => Err(Rejection::forbidden("sign in first")),
//!         })
//!         .get("/users/{id}", Action::handler(get_user))
//!         .delete("/users/{id}", Action::handler(delete_user)).only("auth");
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! async fn get_user(req: Request, _res: Response) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//!
//! async fn delete_user(_req: Request, mut res: Response) -> Response {
//!     res.set_status(StatusCode::NO_CONTENT);
//!     res
//! }
//! ```

mod controller;
mod error;
mod handler;
mod matcher;
mod method;
mod request;
mod response;
mod route;
mod router;
mod server;
mod shared;
mod table;
mod view;

pub mod middleware;

pub use controller::{Controller, ControllerRegistry};
pub use error::{BoxError, Error, ErrorTitles};
pub use handler::{BoxFuture, Handler};
pub use matcher::{Match, find as match_path};
pub use method::Method;
pub use request::{METHOD_OVERRIDE_KEY, Params, Request};
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use route::{Action, Route};
pub use router::{RouteBuilder, Router};
pub use server::Server;
pub use shared::SharedRouter;
pub use table::RouteTable;
pub use view::{ViewContext, ViewRenderer};
