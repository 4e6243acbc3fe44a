//! Dynamic accessor dispatch.
//!
//! The source-language habit of intercepting unknown method names becomes an
//! explicit entry point here: [`DynMap::call`] parses an accessor string
//! against the suffix grammar and dispatches to the matching map operation.
//!
//! Grammar:
//! - `name`: read; surplus arguments are tolerated and ignored
//! - `name=`: write; exactly one argument
//! - `name?`: truthiness of the read; no arguments
//! - `name!`: ensure a value exists (installing an empty map on miss); no
//!   arguments
//! - `name_`: probe: the value if present, else a fresh empty map without
//!   mutating the receiver; no arguments
//!
//! A leading `:` selects the symbol form of the key (`:name=`); otherwise the
//! string form is used.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::key::{Key, KeyPolicy};
use super::value::Value;
use super::DynMap;

static ACCESSOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:?[A-Za-z][A-Za-z0-9_]*[=?!_]?$").unwrap());

/// Error from the dynamic accessor entry point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("accessor '{accessor}' takes {expected} argument(s), got {got}")]
    ArgumentCount {
        accessor: String,
        expected: usize,
        got: usize,
    },

    #[error("invalid accessor: '{0}'")]
    InvalidAccessor(String),
}

/// The operation encoded by an accessor suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    Get,
    Set,
    Query,
    Ensure,
    Probe,
}

/// A parsed accessor: target key plus operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    pub key: Key,
    pub kind: AccessorKind,
}

impl Accessor {
    /// Parse an accessor string against the suffix grammar.
    pub fn parse(raw: &str) -> Result<Accessor, AccessError> {
        if !ACCESSOR_RE.is_match(raw) {
            return Err(AccessError::InvalidAccessor(raw.to_string()));
        }

        let (symbol, body) = match raw.strip_prefix(':') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let (name, kind) = match body.chars().last() {
            Some('=') => (&body[..body.len() - 1], AccessorKind::Set),
            Some('?') => (&body[..body.len() - 1], AccessorKind::Query),
            Some('!') => (&body[..body.len() - 1], AccessorKind::Ensure),
            Some('_') => (&body[..body.len() - 1], AccessorKind::Probe),
            _ => (body, AccessorKind::Get),
        };

        let key = if symbol { Key::sym(name) } else { Key::str(name) };
        Ok(Accessor { key, kind })
    }

    fn check_arity(&self, accessor: &str, got: usize) -> Result<(), AccessError> {
        let expected = match self.kind {
            // Bare reads tolerate surplus arguments.
            AccessorKind::Get => return Ok(()),
            AccessorKind::Set => 1,
            AccessorKind::Query | AccessorKind::Ensure | AccessorKind::Probe => 0,
        };
        if got != expected {
            return Err(AccessError::ArgumentCount {
                accessor: accessor.to_string(),
                expected,
                got,
            });
        }
        Ok(())
    }
}

impl<P: KeyPolicy> DynMap<P> {
    /// Interpret `accessor` per the suffix grammar and run it against this
    /// map.
    ///
    /// Returns the read value for reads, the assigned value for writes, the
    /// truthiness for `?`, the guaranteed value for `!`, and the probed value
    /// for `_`.
    pub fn call(&mut self, accessor: &str, args: &[Value<P>]) -> Result<Value<P>, AccessError> {
        let parsed = Accessor::parse(accessor)?;
        parsed.check_arity(accessor, args.len())?;

        let value = match parsed.kind {
            AccessorKind::Get => self.get(parsed.key),
            AccessorKind::Set => {
                let value = args[0].clone();
                self.set(parsed.key, value.clone());
                value
            }
            AccessorKind::Query => Value::Bool(self.get(parsed.key).truthy()),
            AccessorKind::Ensure => self.ensure(parsed.key).clone(),
            AccessorKind::Probe => self.probe(parsed.key),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::key::Preserve;

    type V = Value<Preserve>;

    #[test]
    fn test_parse_suffixes() {
        assert_eq!(Accessor::parse("name").unwrap().kind, AccessorKind::Get);
        assert_eq!(Accessor::parse("name=").unwrap().kind, AccessorKind::Set);
        assert_eq!(Accessor::parse("name?").unwrap().kind, AccessorKind::Query);
        assert_eq!(Accessor::parse("name!").unwrap().kind, AccessorKind::Ensure);
        assert_eq!(Accessor::parse("name_").unwrap().kind, AccessorKind::Probe);
    }

    #[test]
    fn test_parse_symbol_form() {
        let acc = Accessor::parse(":city=").unwrap();
        assert!(acc.key.is_sym());
        assert_eq!(acc.key.as_str(), "city");
    }

    #[test]
    fn test_inner_underscores_stay_getters() {
        let acc = Accessor::parse("first_name").unwrap();
        assert_eq!(acc.kind, AccessorKind::Get);
        assert_eq!(acc.key.as_str(), "first_name");

        let acc = Accessor::parse("first_name_").unwrap();
        assert_eq!(acc.kind, AccessorKind::Probe);
        assert_eq!(acc.key.as_str(), "first_name");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for raw in ["", ":", "1name", "na me", "name==", "a-b"] {
            assert!(
                matches!(Accessor::parse(raw), Err(AccessError::InvalidAccessor(_))),
                "accepted {raw:?}"
            );
        }
    }

    #[test]
    fn test_call_get_and_set() {
        let mut map: DynMap = DynMap::new();
        map.call("name=", &[V::from("Alice")]).unwrap();
        assert_eq!(map.call("name", &[]).unwrap(), V::from("Alice"));
        // Symbol-shaped call resolves the same entry.
        assert_eq!(map.call(":name", &[]).unwrap(), V::from("Alice"));
    }

    #[test]
    fn test_call_get_ignores_surplus_args() {
        let mut map: DynMap = DynMap::new();
        map.set("n", 1);
        assert_eq!(map.call("n", &[V::Int(9)]).unwrap(), V::Int(1));
    }

    #[test]
    fn test_call_set_arity() {
        let mut map: DynMap = DynMap::new();
        let err = map.call("name=", &[]).unwrap_err();
        assert_eq!(
            err,
            AccessError::ArgumentCount {
                accessor: "name=".into(),
                expected: 1,
                got: 0
            }
        );
    }

    #[test]
    fn test_call_query() {
        let mut map: DynMap = DynMap::new();
        assert_eq!(map.call("seen?", &[]).unwrap(), V::Bool(false));
        map.set("seen", false);
        assert_eq!(map.call("seen?", &[]).unwrap(), V::Bool(false));
        map.set("seen", 0);
        assert_eq!(map.call("seen?", &[]).unwrap(), V::Bool(true));
    }

    #[test]
    fn test_call_bang_and_underbang_arity_is_strict() {
        let mut map: DynMap = DynMap::new();
        assert!(map.call("a!", &[V::Int(1)]).is_err());
        assert!(map.call("a_", &[V::Int(1)]).is_err());
        assert!(map.call("a?", &[V::Int(1)]).is_err());
    }

    #[test]
    fn test_call_ensure_installs() {
        let mut map: DynMap = DynMap::new();
        let v = map.call("nested!", &[]).unwrap();
        assert!(v.is_map());
        assert!(map.contains_key("nested"));
    }

    #[test]
    fn test_call_probe_does_not_install() {
        let mut map: DynMap = DynMap::new();
        let v = map.call("nested_", &[]).unwrap();
        assert!(v.is_map());
        assert!(!map.contains_key("nested"));
    }
}
