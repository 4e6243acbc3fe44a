//! Map keys and key-normalization policies.
//!
//! A [`Key`] carries its text plus the form it was written in: string or
//! symbol. Equality and hashing look at the text only, so a map entry stored
//! under `Key::str("x")` is found by `Key::sym("x")` and vice versa; this is
//! the indifferent-access guarantee. The form survives as metadata for
//! display, plain-structure conversion, and bulk form rewrites.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A map key: the text plus its written form.
#[derive(Debug, Clone, Eq)]
pub enum Key {
    /// String-formed key (`"name"`).
    Str(String),
    /// Symbol-formed key (`:name`).
    Sym(String),
}

impl Key {
    /// Build a string-formed key.
    pub fn str(text: impl Into<String>) -> Self {
        Key::Str(text.into())
    }

    /// Build a symbol-formed key.
    pub fn sym(text: impl Into<String>) -> Self {
        Key::Sym(text.into())
    }

    /// The key text, regardless of form.
    pub fn as_str(&self) -> &str {
        match self {
            Key::Str(s) | Key::Sym(s) => s,
        }
    }

    pub fn is_str(&self) -> bool {
        matches!(self, Key::Str(_))
    }

    pub fn is_sym(&self) -> bool {
        matches!(self, Key::Sym(_))
    }

    /// The same text in string form.
    pub fn into_str_form(self) -> Self {
        match self {
            Key::Sym(s) => Key::Str(s),
            other => other,
        }
    }

    /// The same text in symbol form.
    pub fn into_sym_form(self) -> Self {
        match self {
            Key::Str(s) => Key::Sym(s),
            other => other,
        }
    }
}

// Indifferent access: two keys are the same entry when their text matches,
// whatever form either was written in.
impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => write!(f, "{}", s),
            Key::Sym(s) => write!(f, ":{}", s),
        }
    }
}

impl From<&str> for Key {
    fn from(text: &str) -> Self {
        Key::Str(text.to_string())
    }
}

impl From<String> for Key {
    fn from(text: String) -> Self {
        Key::Str(text)
    }
}

/// Key-normalization policy for a container family.
///
/// The policy is the container's "self-type" capability: every nested map
/// constructed by conversion or merge carries the same policy parameter, so
/// subtype preservation holds by construction.
pub trait KeyPolicy: Clone + Default + fmt::Debug + 'static {
    /// Canonical stored form for an incoming key.
    fn canonical(key: Key) -> Key;
}

/// Keeps whichever form the key was written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preserve;

impl KeyPolicy for Preserve {
    fn canonical(key: Key) -> Key {
        key
    }
}

/// Canonicalizes every key to string form on insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stringify;

impl KeyPolicy for Stringify {
    fn canonical(key: Key) -> Key {
        key.into_str_form()
    }
}
