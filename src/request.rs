//! Incoming HTTP request type.
//!
//! A [`Request`] is built once per inbound request at the server boundary
//! and threaded explicitly through routing, middleware and the handler.

use http_body_util::BodyExt;

use crate::error::Error;
use crate::method::Method;

/// Query-string key that overrides the wire method, so HTML forms (which can
/// only `GET` or `POST`) can reach `PUT`/`PATCH`/`DELETE`/`UPDATE` routes.
pub const METHOD_OVERRIDE_KEY: &str = "_method";

// ── Params ────────────────────────────────────────────────────────────────────

/// Path parameters extracted by the matcher, in pattern-declaration order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self { Self(Vec::new()) }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    /// Sets `name`. A name already present keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

// ── Request ───────────────────────────────────────────────────────────────────

/// An incoming HTTP request.
#[derive(Clone, Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
    pub(crate) params: Params,
}

impl Request {
    /// Builds a request from a method and a request target such as
    /// `/users/42?tab=posts`. The query string is split off the path and
    /// decoded; the path itself is kept verbatim.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (target, Vec::new()),
        };
        Self {
            method,
            path: path.to_owned(),
            query,
            headers: Vec::new(),
            body: Vec::new(),
            params: Params::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Reads a hyper request in full.
    ///
    /// Fails with [`Error::MethodNotAllowed`] for verbs outside the routable
    /// set and [`Error::BadRequest`] when the body cannot be read or the
    /// `_method` override names an unknown verb. Non-UTF-8 header values are
    /// skipped.
    pub async fn from_hyper<B>(req: http::Request<B>) -> Result<Self, Error>
    where
        B: hyper::body::Body,
        B::Error: std::fmt::Display,
    {
        let (parts, body) = req.into_parts();
        let method = Method::try_from(&parts.method)?;
        let target = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());

        let body = body
            .collect()
            .await
            .map_err(|e| Error::BadRequest(format!("unreadable body: {e}")))?
            .to_bytes();

        let mut request = Self::new(method, target).with_body(body.to_vec());
        request.headers = parts.headers.iter()
            .filter_map(|(k, v)| Some((k.as_str().to_owned(), v.to_str().ok()?.to_owned())))
            .collect();
        request.apply_method_override()?;
        Ok(request)
    }

    /// Replaces the method with the `_method` query value, if present.
    pub(crate) fn apply_method_override(&mut self) -> Result<(), Error> {
        if let Some(spoofed) = self.query(METHOD_OVERRIDE_KEY) {
            self.method = spoofed
                .parse()
                .map_err(|_| Error::BadRequest(format!("unknown `_method` override `{spoofed}`")))?;
        }
        Ok(())
    }

    pub fn method(&self) -> Method { self.method }
    /// The request path, query string stripped.
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn params(&self) -> &Params { &self.params }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key)
    }

    /// Returns the first query-string value for `key`, decoded.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Publishes the parameters extracted for the resolved route.
    pub fn set_params(&mut self, params: Params) {
        self.params = params;
    }
}

/// Decodes one URL component: `+` is a space, `%XX` an escaped byte.
/// Invalid UTF-8 is replaced rather than rejected.
pub(crate) fn url_decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (url_decode(k), url_decode(v))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http_body_util::Full;

    use super::*;

    #[test]
    fn query_string_is_stripped_and_decoded() {
        let req = Request::new(Method::Get, "/search?q=rust+lang&tag=a%26b&flag");
        assert_eq!(req.path(), "/search");
        assert_eq!(req.query("q"), Some("rust lang"));
        assert_eq!(req.query("tag"), Some("a&b"));
        assert_eq!(req.query("flag"), Some(""));
        assert_eq!(req.query("missing"), None);
    }

    #[test]
    fn url_decode_handles_plus_and_bad_utf8() {
        assert_eq!(url_decode("a%20b+c"), "a b c");
        assert_eq!(url_decode("caf%C3%A9"), "café");
        assert_eq!(url_decode("%FF"), "\u{FFFD}");
    }

    #[test]
    fn params_keep_first_position_on_repeat() {
        let params: Params = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("a"), Some("3"));
        assert_eq!(params.iter().map(|(k, _)| k).collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn method_override_from_query() {
        let mut req = Request::new(Method::Post, "/users/4?_method=delete");
        req.apply_method_override().unwrap();
        assert_eq!(req.method(), Method::Delete);

        let mut bad = Request::new(Method::Post, "/users/4?_method=brew");
        assert!(matches!(bad.apply_method_override(), Err(Error::BadRequest(_))));
    }

    #[tokio::test]
    async fn from_hyper_reads_everything() {
        let raw = http::Request::builder()
            .method("PUT")
            .uri("/users/7?x=1")
            .header("X-Trace", "abc")
            .body(Full::new(Bytes::from_static(b"payload")))
            .unwrap();

        let req = Request::from_hyper(raw).await.unwrap();
        assert_eq!(req.method(), Method::Put);
        assert_eq!(req.path(), "/users/7");
        assert_eq!(req.query("x"), Some("1"));
        assert_eq!(req.header("x-trace"), Some("abc"));
        assert_eq!(req.body(), b"payload");
    }

    #[tokio::test]
    async fn from_hyper_rejects_unroutable_verbs() {
        let raw = http::Request::builder()
            .method("OPTIONS")
            .uri("/")
            .body(Full::new(Bytes::new()))
            .unwrap();
        assert!(matches!(Request::from_hyper(raw).await, Err(Error::MethodNotAllowed(_))));
    }
}
