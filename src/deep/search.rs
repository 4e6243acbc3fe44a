//! Key, predicate, and regex search over nested values.

use regex::Regex;

use crate::map::key::{Key, KeyPolicy};
use crate::map::value::Value;
use crate::map::DynMap;

/// Pre-order depth-first search collecting every node with a matching direct
/// entry.
///
/// The predicate receives `(key, value, containing_node)`; sequence elements
/// pass `None` for the key. A node is collected once per match opportunity at
/// most, and recursion continues into every child whether or not the node
/// matched, so legitimately repeated nested structures can appear repeatedly.
pub fn deep_locate<'a, P, F>(root: &'a Value<P>, predicate: F) -> Vec<&'a Value<P>>
where
    P: KeyPolicy,
    F: Fn(Option<&Key>, &Value<P>, &Value<P>) -> bool,
{
    let mut hits = Vec::new();
    locate_walk(root, &predicate, &mut hits);
    hits
}

/// Key-equality shorthand for [`deep_locate`] (indifferent comparison).
pub fn deep_locate_key<'a, P: KeyPolicy>(
    root: &'a Value<P>,
    key: impl Into<Key>,
) -> Vec<&'a Value<P>> {
    let key = key.into();
    deep_locate(root, move |k, _, _| k.is_some_and(|k| *k == key))
}

fn locate_walk<'a, P, F>(node: &'a Value<P>, predicate: &F, hits: &mut Vec<&'a Value<P>>)
where
    P: KeyPolicy,
    F: Fn(Option<&Key>, &Value<P>, &Value<P>) -> bool,
{
    match node {
        Value::Map(map) => {
            if map.iter().any(|(k, v)| predicate(Some(k), v, node)) {
                hits.push(node);
            }
            for (_, child) in map.iter() {
                locate_walk(child, predicate, hits);
            }
        }
        Value::Seq(items) => {
            if items.iter().any(|v| predicate(None, v, node)) {
                hits.push(node);
            }
            for child in items {
                locate_walk(child, predicate, hits);
            }
        }
        _ => {}
    }
}

/// First value stored under `key` anywhere in the tree, traversal order.
pub fn deep_find<'a, P: KeyPolicy>(
    root: &'a Value<P>,
    key: impl Into<Key>,
) -> Option<&'a Value<P>> {
    let key = key.into();
    let mut hits = Vec::new();
    find_walk(root, &key, &mut hits, true);
    hits.into_iter().next()
}

/// Every value stored under `key` anywhere in the tree, traversal order.
///
/// `None` when nothing matched, distinguishing "no results" from an empty
/// matched value.
pub fn deep_find_all<'a, P: KeyPolicy>(
    root: &'a Value<P>,
    key: impl Into<Key>,
) -> Option<Vec<&'a Value<P>>> {
    let key = key.into();
    let mut hits = Vec::new();
    find_walk(root, &key, &mut hits, false);
    if hits.is_empty() { None } else { Some(hits) }
}

fn find_walk<'a, P: KeyPolicy>(
    node: &'a Value<P>,
    key: &Key,
    hits: &mut Vec<&'a Value<P>>,
    first_only: bool,
) {
    if first_only && !hits.is_empty() {
        return;
    }
    match node {
        Value::Map(map) => {
            if let Some(found) = map.get_ref(key.clone()) {
                hits.push(found);
            }
            for (_, child) in map.iter() {
                find_walk(child, key, hits, first_only);
            }
        }
        Value::Seq(items) => {
            for child in items {
                find_walk(child, key, hits, first_only);
            }
        }
        _ => {}
    }
}

/// Nodes with a direct key or string/symbol value matching `pattern`.
///
/// `None` when nothing matched.
pub fn deep_grep<'a, P: KeyPolicy>(
    root: &'a Value<P>,
    pattern: &Regex,
) -> Option<Vec<&'a Value<P>>> {
    let hits = deep_locate(root, |key, value, _| {
        key.is_some_and(|k| pattern.is_match(k.as_str()))
            || value.as_text().is_some_and(|text| pattern.is_match(text))
    });
    if hits.is_empty() { None } else { Some(hits) }
}

impl<P: KeyPolicy> DynMap<P> {
    /// [`deep_find`] rooted at this map.
    pub fn deep_find(&self, key: impl Into<Key>) -> Option<&Value<P>> {
        let key = key.into();
        let mut hits = Vec::new();
        self.find_in_entries(&key, &mut hits, true);
        hits.into_iter().next()
    }

    /// [`deep_find_all`] rooted at this map.
    pub fn deep_find_all(&self, key: impl Into<Key>) -> Option<Vec<&Value<P>>> {
        let key = key.into();
        let mut hits = Vec::new();
        self.find_in_entries(&key, &mut hits, false);
        if hits.is_empty() { None } else { Some(hits) }
    }

    fn find_in_entries<'a>(&'a self, key: &Key, hits: &mut Vec<&'a Value<P>>, first_only: bool) {
        if let Some(found) = self.get_ref(key.clone()) {
            hits.push(found);
        }
        for (_, child) in self.iter() {
            if first_only && !hits.is_empty() {
                return;
            }
            find_walk(child, key, hits, first_only);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::key::Preserve;
    use serde_json::json;

    fn fixture() -> Value<Preserve> {
        Value::from(json!({
            "users": [
                { "location": { "address": "A" } },
                { "location": { "address": "B" } }
            ]
        }))
    }

    #[test]
    fn test_deep_find_all_in_traversal_order() {
        let root = fixture();
        let hits = deep_find_all(&root, "address").unwrap();
        let texts: Vec<_> = hits.iter().filter_map(|v| v.as_text()).collect();
        assert_eq!(texts, ["A", "B"]);
    }

    #[test]
    fn test_deep_find_returns_first() {
        let root = fixture();
        assert_eq!(deep_find(&root, "address").unwrap().as_text(), Some("A"));
    }

    #[test]
    fn test_deep_find_all_none_when_absent() {
        let root = fixture();
        assert!(deep_find_all(&root, "country").is_none());
    }

    #[test]
    fn test_deep_find_is_indifferent() {
        let root = fixture();
        assert!(deep_find(&root, Key::sym("address")).is_some());
    }

    #[test]
    fn test_map_rooted_find() {
        let map: DynMap = DynMap::from_json(json!({
            "location": { "address": "A" }
        }))
        .unwrap();
        assert_eq!(map.deep_find("address").unwrap().as_text(), Some("A"));
        assert_eq!(map.deep_find_all("address").unwrap().len(), 1);
        assert!(map.deep_find_all("missing").is_none());
    }

    #[test]
    fn test_deep_locate_returns_containing_nodes() {
        let root = fixture();
        let nodes = deep_locate_key(&root, "address");
        assert_eq!(nodes.len(), 2);
        for node in nodes {
            assert!(node.as_map().unwrap().contains_key("address"));
        }
    }

    #[test]
    fn test_deep_locate_predicate_sees_sequence_elements() {
        let root = fixture();
        // Matches the one sequence node whose direct elements are maps.
        let nodes = deep_locate(&root, |key, value, _| key.is_none() && value.is_map());
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].is_seq());
    }

    #[test]
    fn test_deep_grep_matches_keys_and_values() {
        let root = fixture();
        let by_value = deep_grep(&root, &Regex::new("^[AB]$").unwrap()).unwrap();
        assert_eq!(by_value.len(), 2);

        let by_key = deep_grep(&root, &Regex::new("^addr").unwrap()).unwrap();
        assert_eq!(by_key.len(), 2);

        assert!(deep_grep(&root, &Regex::new("zzz").unwrap()).is_none());
    }
}
