//! The dynamic mapping container family.
//!
//! [`DynMap`] is an insertion-ordered map from [`Key`] to [`Value`] with
//! indifferent key lookup, an optional per-map default, a dynamic accessor
//! entry point ([`DynMap::call`]), deep and shallow merge, and conversion
//! from/to plain `serde_json` structures.
//!
//! Storage is a vector of entries scanned linearly: these are small
//! convenience containers whose contract is insertion order, not asymptotics.

pub mod access;
pub mod convert;
pub mod key;
pub mod merge;
pub mod value;

pub use access::{AccessError, Accessor, AccessorKind};
pub use convert::ConvertError;
pub use key::{Key, KeyPolicy, Preserve, Stringify};
pub use value::Value;

use std::fmt;
use std::rc::Rc;

/// Where a missing-key read gets its result from.
#[derive(Clone)]
pub enum DefaultSource<P: KeyPolicy> {
    /// A literal value, cloned per read.
    Value(Value<P>),
    /// A zero-argument generator, invoked fresh per read.
    Generator(Rc<dyn Fn() -> Value<P>>),
}

impl<P: KeyPolicy> DefaultSource<P> {
    fn produce(&self) -> Value<P> {
        match self {
            DefaultSource::Value(v) => v.clone(),
            DefaultSource::Generator(f) => f(),
        }
    }
}

impl<P: KeyPolicy> fmt::Debug for DefaultSource<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultSource::Value(v) => f.debug_tuple("Value").field(v).finish(),
            DefaultSource::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

/// Insertion-ordered map with indifferent key access.
///
/// The policy parameter selects the key-normalization rule for the whole
/// nested family: [`Preserve`] keeps the written form, [`Stringify`]
/// canonicalizes keys to string form on insert. Lookup is indifferent under
/// either policy because [`Key`] equality ignores the form.
pub struct DynMap<P: KeyPolicy = Preserve> {
    entries: Vec<(Key, Value<P>)>,
    default: Option<Box<DefaultSource<P>>>,
}

impl<P: KeyPolicy> DynMap<P> {
    /// An empty map with no default.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            default: None,
        }
    }

    /// An empty map whose missing-key reads return a clone of `value`.
    pub fn with_default(value: Value<P>) -> Self {
        Self {
            entries: Vec::new(),
            default: Some(Box::new(DefaultSource::Value(value))),
        }
    }

    /// An empty map whose missing-key reads invoke `f` fresh each time.
    pub fn with_default_fn(f: impl Fn() -> Value<P> + 'static) -> Self {
        Self {
            entries: Vec::new(),
            default: Some(Box::new(DefaultSource::Generator(Rc::new(f)))),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &Key) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    /// The value for `key`, or the configured default, or `Null`.
    ///
    /// Never fails; the default is produced per call and is not installed
    /// into the map (use the `!`-ensure form to install on miss).
    pub fn get(&self, key: impl Into<Key>) -> Value<P> {
        let key = key.into();
        match self.get_ref(key) {
            Some(v) => v.clone(),
            None => match &self.default {
                Some(source) => source.produce(),
                None => Value::Null,
            },
        }
    }

    /// Presence-aware borrow: `None` when the key is absent.
    pub fn get_ref(&self, key: impl Into<Key>) -> Option<&Value<P>> {
        let key = key.into();
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: impl Into<Key>) -> Option<&mut Value<P>> {
        let key = key.into();
        self.entries
            .iter_mut()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Store `value` under `key`.
    ///
    /// The key is canonicalized per policy. Overwriting keeps the entry's
    /// position (and its originally stored key form); a new key appends.
    pub fn set(&mut self, key: impl Into<Key>, value: impl Into<Value<P>>) {
        let key = P::canonical(key.into());
        let value = value.into();
        match self.position(&key) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Remove `key`, returning its value if it was present.
    pub fn remove(&mut self, key: impl Into<Key>) -> Option<Value<P>> {
        let key = key.into();
        self.position(&key).map(|i| self.entries.remove(i).1)
    }

    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        let key = key.into();
        self.position(&key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value<P>)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Key, &mut Value<P>)> {
        self.entries.iter_mut().map(|(k, v)| (&*k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value<P>> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Truthiness of the value at `key` (missing keys read as the default).
    pub fn truthy(&self, key: impl Into<Key>) -> bool {
        self.get(key).truthy()
    }

    /// The `!`-ensure operation: install an empty map of the same policy if
    /// `key` is absent, then hand back the (now guaranteed) slot.
    pub fn ensure(&mut self, key: impl Into<Key>) -> &mut Value<P> {
        let key = P::canonical(key.into());
        let i = match self.position(&key) {
            Some(i) => i,
            None => {
                self.entries.push((key, Value::Map(DynMap::new())));
                self.entries.len() - 1
            }
        };
        &mut self.entries[i].1
    }

    /// The `_`-probe operation: the value if present, otherwise a fresh empty
    /// map of the same policy, without touching the receiver.
    pub fn probe(&self, key: impl Into<Key>) -> Value<P> {
        match self.get_ref(key) {
            Some(v) => v.clone(),
            None => Value::Map(DynMap::new()),
        }
    }

    /// The receiver becomes exactly `other`'s contents; the default source is
    /// kept.
    pub fn replace_contents(&mut self, other: &DynMap<P>) {
        self.entries.clear();
        for (k, v) in other.iter() {
            self.set(k.clone(), v.clone());
        }
    }

    pub(crate) fn default_source(&self) -> Option<&DefaultSource<P>> {
        self.default.as_deref()
    }
}

impl<P: KeyPolicy> Default for DynMap<P> {
    fn default() -> Self {
        Self::new()
    }
}

// Deep copy; the default source is shared structurally (generators by Rc).
impl<P: KeyPolicy> Clone for DynMap<P> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            default: self.default.clone(),
        }
    }
}

// Entries only, order-sensitive; the default source never affects equality.
impl<P: KeyPolicy + PartialEq> PartialEq for DynMap<P> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<P: KeyPolicy> fmt::Debug for DynMap<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k.to_string(), v)))
            .finish()
    }
}

impl<P: KeyPolicy, K: Into<Key>, V: Into<Value<P>>> FromIterator<(K, V)> for DynMap<P> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = DynMap::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}

impl<P: KeyPolicy> IntoIterator for DynMap<P> {
    type Item = (Key, Value<P>);
    type IntoIter = std::vec::IntoIter<(Key, Value<P>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
