//! Controller registry.
//!
//! A controller route names a controller by key and a method on it. On every
//! request the registered factory builds a fresh controller, which is then
//! asked to run that method with the request and response.
//!
//! ```rust
//! use mvc_router::{BoxFuture, Controller, Request, Response};
//!
//! #[derive(Default)]
//! struct Users;
//!
//! impl Controller for Users {
//!     fn call(self: Box<Self>, action: &str, req: Request, _res: Response)
//!         -> Option<BoxFuture<Response>>
//!     {
//!         match action {
//!             "show" => Some(Box::pin(async move {
//!                 Response::text(format!("user {}", req.param("id").unwrap_or("?")))
//!             })),
//!             _ => None,
//!         }
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::Error;
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;

/// A group of related actions, constructed per request.
pub trait Controller: Send + 'static {
    /// Starts `action`, or returns `None` if the controller has no such
    /// method.
    fn call(self: Box<Self>, action: &str, req: Request, res: Response)
        -> Option<BoxFuture<Response>>;
}

type Factory = Arc<dyn Fn() -> Box<dyn Controller> + Send + Sync>;

/// Controller factories by key.
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    factories: HashMap<String, Factory>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `key`, replacing any previous one.
    pub fn register<C, F>(&mut self, key: impl Into<String>, factory: F)
    where
        C: Controller,
        F: Fn() -> C + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move || Box::new(factory()) as Box<dyn Controller>);
        self.factories.insert(key.into(), factory);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Copies every entry of `other` into `self`, `other` winning on conflict.
    pub fn merge(&mut self, other: ControllerRegistry) {
        self.factories.extend(other.factories);
    }

    /// Builds the controller registered under `key` and runs `action` on it.
    pub async fn dispatch(
        &self,
        key: &str,
        action: &str,
        req: Request,
        res: Response,
    ) -> Result<Response, Error> {
        let factory = self
            .factories
            .get(key)
            .ok_or_else(|| Error::UnknownController(key.to_owned()))?;

        debug!(controller = key, action, "dispatching to controller");
        let fut = factory().call(action, req, res).ok_or_else(|| Error::UnknownAction {
            controller: key.to_owned(),
            action: action.to_owned(),
        })?;
        Ok(fut.await)
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::method::Method;

    struct Counter {
        id: usize,
    }

    impl Controller for Counter {
        fn call(self: Box<Self>, action: &str, _req: Request, _res: Response)
            -> Option<BoxFuture<Response>>
        {
            let id = self.id;
            match action {
                "id" => Some(Box::pin(async move { Response::text(id.to_string()) })),
                _ => None,
            }
        }
    }

    fn registry() -> ControllerRegistry {
        let next = Arc::new(AtomicUsize::new(0));
        let mut registry = ControllerRegistry::new();
        registry.register("counter", move || Counter { id: next.fetch_add(1, Ordering::SeqCst) });
        registry
    }

    #[tokio::test]
    async fn every_dispatch_builds_a_fresh_controller() {
        let registry = registry();
        for expected in ["0", "1"] {
            let res = registry
                .dispatch("counter", "id", Request::new(Method::Get, "/"), Response::new())
                .await
                .unwrap();
            assert_eq!(res.body(), expected.as_bytes());
        }
    }

    #[tokio::test]
    async fn unknown_controller_and_action() {
        let registry = registry();
        let err = registry
            .dispatch("nope", "id", Request::new(Method::Get, "/"), Response::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownController(k) if k == "nope"));

        let err = registry
            .dispatch("counter", "missing", Request::new(Method::Get, "/"), Response::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownAction { action, .. } if action == "missing"));
    }
}
