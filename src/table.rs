//! Per-method route storage.
//!
//! Each method keeps its routes in registration order, which is the order
//! the matcher tries parametrized patterns in, plus a pattern index for
//! exact lookups.

use std::collections::HashMap;

use crate::error::Error;
use crate::method::Method;
use crate::route::{Action, Route};

#[derive(Clone, Debug, Default)]
struct MethodRoutes {
    routes: Vec<Route>,
    index: HashMap<String, usize>,
}

/// Every registered route, grouped by method.
///
/// `(method, pattern)` is unique. Registering it again replaces the action
/// and middleware in place; the route keeps its original position.
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    methods: [MethodRoutes; Method::ALL.len()],
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the entry for `(method, pattern)`.
    pub fn add(
        &mut self,
        method: Method,
        pattern: impl Into<String>,
        action: Action,
        middleware: Option<String>,
    ) {
        let pattern = pattern.into();
        let slot = &mut self.methods[method.index()];
        match slot.index.get(&pattern) {
            Some(&i) => {
                let route = &mut slot.routes[i];
                route.action = action;
                route.middleware = middleware;
            }
            None => {
                slot.index.insert(pattern.clone(), slot.routes.len());
                slot.routes.push(Route { pattern, action, middleware });
            }
        }
    }

    /// All routes for `method`, in registration order.
    pub fn routes(&self, method: Method) -> &[Route] {
        &self.methods[method.index()].routes
    }

    /// Exact lookup; `None` when `pattern` was never registered.
    pub fn get(&self, method: Method, pattern: &str) -> Option<&Route> {
        let slot = &self.methods[method.index()];
        slot.index.get(pattern).map(|&i| &slot.routes[i])
    }

    /// Copies every route of `other` into `self`, `other` winning on conflict.
    pub fn merge(&mut self, other: RouteTable) {
        for (method, slot) in Method::ALL.into_iter().zip(other.methods) {
            for route in slot.routes {
                self.add(method, route.pattern, route.action, route.middleware);
            }
        }
    }

    /// Sets (or with `None` clears) the middleware of an existing route.
    pub fn set_middleware(
        &mut self,
        method: Method,
        pattern: &str,
        key: Option<String>,
    ) -> Result<(), Error> {
        let slot = &mut self.methods[method.index()];
        let &i = slot.index.get(pattern).ok_or_else(|| {
            Error::InvalidArgument(format!("cannot attach middleware: no route {method} {pattern}"))
        })?;
        slot.routes[i].middleware = key;
        Ok(())
    }

    /// Every route with its method, methods in [`Method::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Method, &Route)> {
        Method::ALL
            .into_iter()
            .flat_map(move |m| self.routes(m).iter().map(move |r| (m, r)))
    }

    pub fn len(&self) -> usize {
        self.methods.iter().map(|s| s.routes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_of(route: &Route) -> &str {
        match route.action() {
            Action::View(name) => name,
            other => panic!("expected a view action, got {other:?}"),
        }
    }

    #[test]
    fn reregistration_overwrites_in_place() {
        let mut table = RouteTable::new();
        table.add(Method::Get, "/a", "first".into(), Some("auth".into()));
        table.add(Method::Get, "/b", "b".into(), None);
        table.add(Method::Get, "/a", "second".into(), None);

        let routes = table.routes(Method::Get);
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].pattern(), "/a");
        assert_eq!(view_of(&routes[0]), "second");
        assert_eq!(routes[0].middleware(), None);
    }

    #[test]
    fn methods_are_independent() {
        let mut table = RouteTable::new();
        table.add(Method::Get, "/x", "g".into(), None);
        assert!(table.get(Method::Post, "/x").is_none());
        assert!(table.routes(Method::Update).is_empty());
        assert_eq!(view_of(table.get(Method::Get, "/x").unwrap()), "g");
    }

    #[test]
    fn merge_appends_and_overwrites() {
        let mut a = RouteTable::new();
        a.add(Method::Get, "/shared", "a".into(), None);
        a.add(Method::Get, "/only-a", "a".into(), None);

        let mut b = RouteTable::new();
        b.add(Method::Get, "/only-b", "b".into(), None);
        b.add(Method::Get, "/shared", "b".into(), Some("auth".into()));
        b.add(Method::Delete, "/gone", "b".into(), None);

        a.merge(b);

        let patterns: Vec<_> = a.routes(Method::Get).iter().map(Route::pattern).collect();
        assert_eq!(patterns, ["/shared", "/only-a", "/only-b"]);
        let shared = a.get(Method::Get, "/shared").unwrap();
        assert_eq!(view_of(shared), "b");
        assert_eq!(shared.middleware(), Some("auth"));
        assert!(a.get(Method::Delete, "/gone").is_some());
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn set_middleware_requires_an_existing_route() {
        let mut table = RouteTable::new();
        table.add(Method::Post, "/login", "login".into(), None);

        table.set_middleware(Method::Post, "/login", Some("guest".into())).unwrap();
        assert_eq!(table.get(Method::Post, "/login").unwrap().middleware(), Some("guest"));

        let err = table.set_middleware(Method::Get, "/login", Some("guest".into())).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn iter_walks_methods_in_order() {
        let mut table = RouteTable::new();
        table.add(Method::Delete, "/d", "d".into(), None);
        table.add(Method::Get, "/g", "g".into(), None);
        let seen: Vec<_> = table.iter().map(|(m, r)| (m, r.pattern().to_owned())).collect();
        assert_eq!(seen, [(Method::Get, "/g".to_owned()), (Method::Delete, "/d".to_owned())]);
        assert!(!table.is_empty());
    }
}
