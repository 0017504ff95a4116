//! A router that can be re-registered while serving.
//!
//! Readers take a snapshot per request and never see a half-updated table.
//! Writers are serialized, build the next router off to the side and publish
//! it with one atomic store.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use tracing::info;

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

struct Inner {
    current: ArcSwap<Router>,
    writer: Mutex<()>,
}

/// Cheaply cloneable handle to a swappable [`Router`].
#[derive(Clone)]
pub struct SharedRouter {
    inner: Arc<Inner>,
}

impl SharedRouter {
    pub fn new(router: Router) -> Self {
        Self {
            inner: Arc::new(Inner {
                current: ArcSwap::from_pointee(router),
                writer: Mutex::new(()),
            }),
        }
    }

    /// The router requests are currently resolved against.
    pub fn load(&self) -> Arc<Router> {
        self.inner.current.load_full()
    }

    /// Publishes `router` in place of the current one, after
    /// [`validating`](Router::validate) it.
    pub fn replace(&self, router: Router) -> Result<(), Error> {
        let _guard = self.inner.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.publish(router)
    }

    /// Derives the next router from a copy of the current one. Concurrent
    /// updates are applied one after another, each seeing the previous one's
    /// result.
    pub fn update(&self, f: impl FnOnce(Router) -> Router) -> Result<(), Error> {
        let _guard = self.inner.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let next = f(Router::clone(&self.load()));
        self.publish(next)
    }

    fn publish(&self, router: Router) -> Result<(), Error> {
        router.validate()?;
        info!(routes = router.table().len(), "route table replaced");
        self.inner.current.store(Arc::new(router));
        Ok(())
    }

    /// Resolves against the current snapshot.
    pub async fn resolve(&self, request: Request, response: Response) -> Result<Response, Error> {
        self.load().resolve(request, response).await
    }
}

impl From<Router> for SharedRouter {
    fn from(router: Router) -> Self {
        Self::new(router)
    }
}
