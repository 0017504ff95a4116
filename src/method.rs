//! HTTP method as a typed enum.
//!
//! The framework routes six verbs. `UPDATE` is not an RFC 9110 method but
//! is accepted as its own verb, usually reached through the `_method`
//! query-string override.
//!
//! Unknown method strings are rejected when parsed, so an unroutable verb
//! can never reach the route table.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A routable HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Update,
}

impl Method {
    /// Every routable method, in route-table order.
    pub const ALL: [Method; 6] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Update,
    ];

    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get    => "GET",
            Self::Post   => "POST",
            Self::Put    => "PUT",
            Self::Patch  => "PATCH",
            Self::Delete => "DELETE",
            Self::Update => "UPDATE",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Parses a method name. Case-insensitive: route files and `_method`
/// overrides commonly use the lowercase spelling.
impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidArgument(format!("unknown HTTP method `{s}`")))
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = Error;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse().map_err(|_| Error::MethodNotAllowed(method.to_string()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_any_case() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("PATCH".parse::<Method>().unwrap(), Method::Patch);
        assert_eq!("Update".parse::<Method>().unwrap(), Method::Update);
    }

    #[test]
    fn rejects_methods_outside_the_set() {
        assert!(matches!("trace".parse::<Method>(), Err(Error::InvalidArgument(_))));
        assert!(matches!("".parse::<Method>(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn wire_method_outside_the_set_is_not_allowed() {
        let err = Method::try_from(&http::Method::OPTIONS).unwrap_err();
        assert!(matches!(err, Error::MethodNotAllowed(m) if m == "OPTIONS"));
        assert_eq!(Method::try_from(&http::Method::DELETE).unwrap(), Method::Delete);
    }

    #[test]
    fn index_follows_table_order() {
        for (i, m) in Method::ALL.into_iter().enumerate() {
            assert_eq!(m.index(), i);
        }
    }
}
