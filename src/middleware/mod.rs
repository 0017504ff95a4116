//! Named middleware.
//!
//! Routes refer to middleware by key (`.only("auth")`); the implementation is
//! registered on the router under that key. A middleware inspects the
//! request before dispatch and either lets it through or rejects it with a
//! status. A rejection ends the request: the handler never runs.
//!
//! ```rust
//! use http::StatusCode;
//! use mvc_router::Request;
//! use mvc_router::middleware::{MiddlewareRegistry, Rejection};
//!
//! let mut registry = MiddlewareRegistry::new();
//! registry.register("auth", |req: &Request| match req.header("authorization") {
//!     Some(_) => Ok(()),
//!     None => Err(Rejection::new(StatusCode::FORBIDDEN, "missing credentials")),
//! });
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use tracing::{debug, warn};

use crate::error::Error;
use crate::request::Request;

/// Why a middleware refused a request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rejection {
    status: StatusCode,
    message: String,
}

impl Rejection {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    /// `403 Forbidden`.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn message(&self) -> &str { &self.message }
}

/// A check run before a route's action.
///
/// Implemented for any `Fn(&Request) -> Result<(), Rejection>`. Closures
/// need the parameter type spelled out (`|req: &Request| …`).
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, req: &Request) -> Result<(), Rejection>;
}

impl<F> Middleware for F
where
    F: Fn(&Request) -> Result<(), Rejection> + Send + Sync + 'static,
{
    fn handle(&self, req: &Request) -> Result<(), Rejection> {
        self(req)
    }
}

/// Middleware implementations by key.
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    entries: HashMap<String, Arc<dyn Middleware>>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `middleware` under `key`, replacing any previous one.
    pub fn register(&mut self, key: impl Into<String>, middleware: impl Middleware) {
        self.entries.insert(key.into(), Arc::new(middleware));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Copies every entry of `other` into `self`, `other` winning on conflict.
    pub fn merge(&mut self, other: MiddlewareRegistry) {
        self.entries.extend(other.entries);
    }

    /// Runs the middleware a route names. `None` (or an empty key) means the
    /// route has none.
    pub fn resolve(&self, key: Option<&str>, req: &Request) -> Result<(), Error> {
        let Some(key) = key.filter(|k| !k.is_empty()) else {
            return Ok(());
        };
        let middleware = self
            .entries
            .get(key)
            .ok_or_else(|| Error::UnknownMiddleware(key.to_owned()))?;

        match middleware.handle(req) {
            Ok(()) => {
                debug!(middleware = key, path = req.path(), "middleware passed");
                Ok(())
            }
            Err(rejection) => {
                warn!(
                    middleware = key,
                    path = req.path(),
                    status = rejection.status.as_u16(),
                    "request rejected: {}",
                    rejection.message,
                );
                Err(Error::Middleware {
                    key: key.to_owned(),
                    status: rejection.status,
                    message: rejection.message,
                })
            }
        }
    }
}

impl fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;

    fn registry() -> MiddlewareRegistry {
        let mut registry = MiddlewareRegistry::new();
        registry.register("auth", |req: &Request| match req.header("authorization") {
            Some("Bearer ok") => Ok(()),
            _ => Err(Rejection::forbidden("bad token")),
        });
        registry
    }

    #[test]
    fn no_key_is_a_no_op() {
        let req = Request::new(Method::Get, "/");
        assert!(registry().resolve(None, &req).is_ok());
        assert!(registry().resolve(Some(""), &req).is_ok());
    }

    #[test]
    fn passes_and_rejects() {
        let ok = Request::new(Method::Get, "/").with_header("Authorization", "Bearer ok");
        assert!(registry().resolve(Some("auth"), &ok).is_ok());

        let bad = Request::new(Method::Get, "/");
        match registry().resolve(Some("auth"), &bad) {
            Err(Error::Middleware { key, status, message }) => {
                assert_eq!(key, "auth");
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(message, "bad token");
            }
            other => panic!("expected a rejection, got {other:?}"),
        }
    }

    #[test]
    fn unknown_key_is_an_error() {
        let req = Request::new(Method::Get, "/");
        let err = registry().resolve(Some("admin"), &req).unwrap_err();
        assert!(matches!(err, Error::UnknownMiddleware(k) if k == "admin"));
    }
}
