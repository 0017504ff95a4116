//! Path matching and parameter extraction.
//!
//! Patterns are compared segment by segment, never through a tree, because
//! priority between ambiguous patterns is registration order:
//!
//! 1. One leading and one trailing `/` are stripped from both sides.
//! 2. Only patterns with the request's segment count are considered.
//! 3. A pattern whose text equals the request path wins outright, so
//!    `/user/new` beats `/user/{id}` whichever was registered first.
//! 4. Otherwise the first pattern whose literal segments all equal the
//!    request's wins, and its `{name}` segments become parameters.
//!
//! A parameter segment that is empty in the request (`/a//b` against
//! `/a/{x}/b`) is not a match for that pattern; the next one is tried.

use crate::request::{Params, url_decode};
use crate::route::Route;

/// A successful match: the registered pattern and its decoded parameters.
#[derive(Debug, PartialEq, Eq)]
pub struct Match<'a> {
    pub pattern: &'a str,
    pub params: Params,
}

/// Finds the route `path` resolves to among `routes`, which must be in
/// registration order.
pub fn find<'a>(routes: &'a [Route], path: &str) -> Option<Match<'a>> {
    let wanted = strip(path);
    let segments: Vec<&str> = wanted.split('/').collect();

    let candidates: Vec<&Route> = routes
        .iter()
        .filter(|r| strip(&r.pattern).split('/').count() == segments.len())
        .collect();

    if let Some(exact) = candidates.iter().copied().find(|r| strip(&r.pattern) == wanted) {
        return Some(Match { pattern: &exact.pattern, params: Params::new() });
    }

    candidates.into_iter().find_map(|route| {
        let params = extract(&route.pattern, &segments)?;
        Some(Match { pattern: &route.pattern, params })
    })
}

/// Walks `pattern` against the request segments. The caller guarantees both
/// have the same segment count.
fn extract(pattern: &str, segments: &[&str]) -> Option<Params> {
    let mut positions = Vec::new();
    for (i, (expected, actual)) in strip(pattern).split('/').zip(segments).enumerate() {
        if is_placeholder(expected) {
            positions.push(i);
        } else if expected != *actual {
            return None;
        }
    }

    if positions.iter().any(|&i| segments[i].is_empty()) {
        return None;
    }

    Some(
        param_names(pattern)
            .into_iter()
            .zip(positions)
            .map(|(name, i)| (name, url_decode(segments[i])))
            .collect(),
    )
}

fn strip(path: &str) -> &str {
    let path = path.strip_prefix('/').unwrap_or(path);
    path.strip_suffix('/').unwrap_or(path)
}

/// A segment holding a `{` with a `}` somewhere after it is a parameter,
/// whatever else it contains.
fn is_placeholder(segment: &str) -> bool {
    segment
        .find('{')
        .is_some_and(|open| segment[open + 1..].contains('}'))
}

/// Names between `{` and `}` across the whole pattern, left to right.
/// Empty braces name nothing.
fn param_names(pattern: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = pattern;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(first) = after.chars().next() else { break };
        let Some(close) = after[first.len_utf8()..].find('}') else { break };
        let end = first.len_utf8() + close;
        names.push(&after[..end]);
        rest = &after[end..];
    }
    names
}
