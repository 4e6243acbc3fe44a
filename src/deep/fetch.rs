//! Fixed-path lookup over nested values.

use thiserror::Error;

use crate::map::key::KeyPolicy;
use crate::map::value::Value;
use crate::map::DynMap;

/// A path segment that could not be resolved, with the full attempted path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("undefined path: segment '{segment}' in '{path}'")]
pub struct UndefinedPathError {
    pub path: String,
    pub segment: String,
}

impl UndefinedPathError {
    fn at(path: &[&str], segment: &str) -> Self {
        Self {
            path: path.join("."),
            segment: segment.to_string(),
        }
    }
}

/// Walk `path` from `root`, failing on the first unresolvable segment.
///
/// Map nodes resolve segments as keys (indifferently); sequence nodes resolve
/// numeric-looking segments as indices; scalars resolve nothing.
pub fn deep_fetch<'a, P: KeyPolicy>(
    root: &'a Value<P>,
    path: &[&str],
) -> Result<&'a Value<P>, UndefinedPathError> {
    let mut current = root;
    for segment in path {
        current = step(current, segment).ok_or_else(|| UndefinedPathError::at(path, segment))?;
    }
    Ok(current)
}

/// Like [`deep_fetch`], but resolve a failure through `fallback`, which
/// receives the failing segment.
pub fn deep_fetch_or<P: KeyPolicy>(
    root: &Value<P>,
    path: &[&str],
    fallback: impl FnOnce(&str) -> Value<P>,
) -> Value<P> {
    match deep_fetch(root, path) {
        Ok(found) => found.clone(),
        Err(err) => fallback(&err.segment),
    }
}

fn step<'a, P: KeyPolicy>(node: &'a Value<P>, segment: &str) -> Option<&'a Value<P>> {
    match node {
        Value::Map(map) => map.get_ref(segment),
        Value::Seq(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

impl<P: KeyPolicy> DynMap<P> {
    /// [`deep_fetch`] rooted at this map. The path must be non-empty.
    pub fn deep_fetch(&self, path: &[&str]) -> Result<&Value<P>, UndefinedPathError> {
        let Some((first, rest)) = path.split_first() else {
            return Err(UndefinedPathError::at(path, ""));
        };
        let start = self
            .get_ref(*first)
            .ok_or_else(|| UndefinedPathError::at(path, first))?;
        deep_fetch(start, rest).map_err(|err| UndefinedPathError {
            path: path.join("."),
            segment: err.segment,
        })
    }

    /// [`deep_fetch_or`] rooted at this map.
    pub fn deep_fetch_or(
        &self,
        path: &[&str],
        fallback: impl FnOnce(&str) -> Value<P>,
    ) -> Value<P> {
        match self.deep_fetch(path) {
            Ok(found) => found.clone(),
            Err(err) => fallback(&err.segment),
        }
    }
}
