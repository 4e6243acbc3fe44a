//! Merge rules: deep merge, shallow merge, conflict callbacks.

use super::key::{Key, KeyPolicy};
use super::value::Value;
use super::DynMap;

/// Conflict callback: `(key, old, new)` for a key both sides define
/// non-recursively; the returned value is installed.
pub type ConflictFn<P> = dyn Fn(&Key, &Value<P>, &Value<P>) -> Value<P>;

impl<P: KeyPolicy> DynMap<P> {
    /// Recursive, right-biased merge into a copy of the receiver.
    ///
    /// Where both sides hold maps at a key the merge recurses; any other
    /// conflict installs `other`'s value.
    pub fn deep_merge(&self, other: &DynMap<P>) -> DynMap<P> {
        let mut merged = self.clone();
        merged.deep_merge_into(other);
        merged
    }

    /// In-place form of [`DynMap::deep_merge`].
    pub fn deep_merge_into(&mut self, other: &DynMap<P>) {
        self.deep_merge_impl(other, None);
    }

    /// Like [`DynMap::deep_merge`], resolving non-recursive conflicts through
    /// `resolve`.
    pub fn deep_merge_with(&self, other: &DynMap<P>, resolve: &ConflictFn<P>) -> DynMap<P> {
        let mut merged = self.clone();
        merged.deep_merge_into_with(other, resolve);
        merged
    }

    /// In-place form of [`DynMap::deep_merge_with`].
    pub fn deep_merge_into_with(&mut self, other: &DynMap<P>, resolve: &ConflictFn<P>) {
        self.deep_merge_impl(other, Some(resolve));
    }

    fn deep_merge_impl(&mut self, other: &DynMap<P>, resolve: Option<&ConflictFn<P>>) {
        for (key, incoming) in other.iter() {
            // Position first: the absent-key arm appends, which would clash
            // with a live `get_mut` borrow.
            match self.entries.iter().position(|(k, _)| k == key) {
                Some(i) => {
                    let existing = &mut self.entries[i].1;
                    if let (Value::Map(existing_map), Value::Map(incoming_map)) =
                        (&mut *existing, incoming)
                    {
                        existing_map.deep_merge_impl(incoming_map, resolve);
                    } else {
                        let resolved = match resolve {
                            Some(f) => f(key, existing, incoming),
                            None => incoming.clone(),
                        };
                        *existing = resolved;
                    }
                }
                None => self.set(key.clone(), incoming.clone()),
            }
        }
    }

    /// One-level merge into a copy: every key of `other` fully overwrites.
    pub fn shallow_merge(&self, other: &DynMap<P>) -> DynMap<P> {
        let mut merged = self.clone();
        merged.shallow_merge_into(other);
        merged
    }

    /// In-place form of [`DynMap::shallow_merge`].
    pub fn shallow_merge_into(&mut self, other: &DynMap<P>) {
        for (key, value) in other.iter() {
            self.set(key.clone(), value.clone());
        }
    }
}
