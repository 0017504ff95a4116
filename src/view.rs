//! View rendering seam.
//!
//! The router does not render templates. A view route hands its view name and
//! the matched parameters to whatever [`ViewRenderer`] the application
//! installed and sends back the result as HTML.

use crate::error::BoxError;
use crate::request::Params;

/// What a view is rendered with.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ViewContext {
    /// The view name, used as the page title.
    pub title: String,
    /// Path parameters of the resolved route.
    pub params: Params,
}

/// Renders a named view to HTML.
///
/// Implemented for any `Fn(&str, &ViewContext) -> Result<String, BoxError>`.
pub trait ViewRenderer: Send + Sync + 'static {
    fn render(&self, name: &str, context: &ViewContext) -> Result<String, BoxError>;
}

impl<F> ViewRenderer for F
where
    F: Fn(&str, &ViewContext) -> Result<String, BoxError> + Send + Sync + 'static,
{
    fn render(&self, name: &str, context: &ViewContext) -> Result<String, BoxError> {
        self(name, context)
    }
}
