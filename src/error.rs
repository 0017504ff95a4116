//! Unified error type.
//!
//! Everything [`Router::resolve`](crate::Router::resolve) can fail with is an
//! [`Error`]. Each variant knows its HTTP status, so the server can turn a
//! failed resolution into a response without inspecting it further.

use std::collections::HashMap;

use http::StatusCode;
use thiserror::Error;

use crate::method::Method;
use crate::response::{IntoResponse, Response};

/// A boxed error type for failures raised by application code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by the crate's fallible operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A malformed registration or lookup: unknown method name, missing
    /// route for middleware attachment, unparsable bind address.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No registered route matches the method and path.
    #[error("no route for {method} {path}")]
    RouteNotFound { method: Method, path: String },

    /// The request could not be read or understood.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The wire method is outside the routable set.
    #[error("method `{0}` is not allowed")]
    MethodNotAllowed(String),

    /// A route names a middleware key nothing was registered under.
    #[error("no middleware registered under `{0}`")]
    UnknownMiddleware(String),

    /// A middleware refused the request.
    #[error("middleware `{key}` rejected the request: {message}")]
    Middleware {
        key: String,
        status: StatusCode,
        message: String,
    },

    /// A route names a controller key nothing was registered under.
    #[error("no controller registered under `{0}`")]
    UnknownController(String),

    /// The controller exists but has no such method.
    #[error("controller `{controller}` has no action `{action}`")]
    UnknownAction { controller: String, action: String },

    /// A view route was hit but the router has no renderer.
    #[error("no view renderer configured for view `{0}`")]
    NoViewRenderer(String),

    /// The view renderer failed.
    #[error("failed to render view `{name}`")]
    View {
        name: String,
        #[source]
        source: BoxError,
    },

    /// Binding to a port or accepting a connection failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RouteNotFound { .. } | Self::UnknownAction { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Middleware { status, .. } => *status,
            Self::UnknownMiddleware(_)
            | Self::UnknownController(_)
            | Self::NoViewRenderer(_)
            | Self::View { .. }
            | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Human-readable titles for error responses, keyed by status code.
///
/// Statuses without a title fall back to `"Error"`.
#[derive(Clone, Debug)]
pub struct ErrorTitles {
    titles: HashMap<u16, String>,
}

impl ErrorTitles {
    pub fn title(&self, status: StatusCode) -> &str {
        self.titles.get(&status.as_u16()).map_or("Error", String::as_str)
    }

    /// Replaces (or adds) the title for `status`.
    pub fn set(&mut self, status: StatusCode, title: impl Into<String>) {
        self.titles.insert(status.as_u16(), title.into());
    }

    /// Builds the response reported for `err`.
    pub fn respond(&self, err: &Error) -> Response {
        let status = err.status();
        Response::builder().status(status).text(self.title(status))
    }
}

impl Default for ErrorTitles {
    fn default() -> Self {
        let titles = [
            (400, "400: Bad request, The server received malformed data in the last request"),
            (403, "403: You're Not Authorized"),
            (404, "404: Page Not Found"),
        ];
        Self {
            titles: titles.into_iter().map(|(code, t)| (code, t.to_owned())).collect(),
        }
    }
}

/// Reports the error with the default titles.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        ErrorTitles::default().respond(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404_with_default_title() {
        let err = Error::RouteNotFound { method: Method::Get, path: "/nope".into() };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let res = err.into_response();
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(res.body(), b"404: Page Not Found".as_slice());
    }

    #[test]
    fn middleware_rejection_keeps_its_status() {
        let err = Error::Middleware {
            key: "auth".into(),
            status: StatusCode::FORBIDDEN,
            message: "no session".into(),
        };
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorTitles::default().title(err.status()), "403: You're Not Authorized");
    }

    #[test]
    fn titles_can_be_overridden_and_default_to_error() {
        let mut titles = ErrorTitles::default();
        assert_eq!(titles.title(StatusCode::INTERNAL_SERVER_ERROR), "Error");

        titles.set(StatusCode::NOT_FOUND, "gone fishing");
        assert_eq!(titles.title(StatusCode::NOT_FOUND), "gone fishing");
    }
}
