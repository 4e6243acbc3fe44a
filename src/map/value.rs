//! The value model shared by every container in the crate.

use super::key::{KeyPolicy, Preserve};
use super::DynMap;

/// A value stored in a [`DynMap`]: a scalar, a sequence, or a nested map of
/// the same policy.
///
/// The policy parameter rides along so that every map reachable from a value
/// is a `DynMap<P>` of the same concrete family.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<P: KeyPolicy = Preserve> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Symbol scalar, the symbol-formed sibling of `Str`.
    Sym(String),
    Seq(Vec<Value<P>>),
    Map(DynMap<P>),
}

impl<P: KeyPolicy> Value<P> {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn is_seq(&self) -> bool {
        matches!(self, Value::Seq(_))
    }

    pub fn as_map(&self) -> Option<&DynMap<P>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut DynMap<P>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value<P>]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_seq_mut(&mut self) -> Option<&mut Vec<Value<P>>> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String or symbol text; `None` for every other variant.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Sym(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness: `Null` and `false` are false, everything else is true.
    pub fn truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    /// Human-readable variant name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Sym(_) => "symbol",
            Value::Seq(_) => "sequence",
            Value::Map(_) => "map",
        }
    }
}

impl<P: KeyPolicy> Default for Value<P> {
    fn default() -> Self {
        Value::Null
    }
}

impl<P: KeyPolicy> From<bool> for Value<P> {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<P: KeyPolicy> From<i64> for Value<P> {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl<P: KeyPolicy> From<i32> for Value<P> {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl<P: KeyPolicy> From<f64> for Value<P> {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl<P: KeyPolicy> From<&str> for Value<P> {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl<P: KeyPolicy> From<String> for Value<P> {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<P: KeyPolicy> From<Vec<Value<P>>> for Value<P> {
    fn from(v: Vec<Value<P>>) -> Self {
        Value::Seq(v)
    }
}

impl<P: KeyPolicy> From<DynMap<P>> for Value<P> {
    fn from(v: DynMap<P>) -> Self {
        Value::Map(v)
    }
}
