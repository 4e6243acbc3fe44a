//! Conversion between the container family and plain `serde_json` structures,
//! plus the hand-written serde implementations.
//!
//! The conversion boundary is where recursive container conversion happens:
//! every object inside an incoming plain structure becomes a [`DynMap`] of
//! the receiving policy, and [`DynMap::to_plain`] guarantees that no
//! container of the family remains reachable in its output.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::key::KeyPolicy;
use super::value::Value;
use super::DynMap;

/// Error converting a plain structure into a map container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot build a map from a JSON {actual}: expected an object")]
pub struct ConvertError {
    pub actual: &'static str,
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl<P: KeyPolicy> From<serde_json::Value> for Value<P> {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::Seq(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(object) => {
                let mut map = DynMap::new();
                for (k, v) in object {
                    map.set(k, Value::from(v));
                }
                Value::Map(map)
            }
        }
    }
}

impl<P: KeyPolicy> TryFrom<serde_json::Value> for DynMap<P> {
    type Error = ConvertError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let actual = json_type_name(&value);
        match Value::<P>::from(value) {
            Value::Map(map) => Ok(map),
            _ => Err(ConvertError { actual }),
        }
    }
}

impl<P: KeyPolicy> Value<P> {
    /// Recursive conversion to a plain `serde_json::Value`.
    ///
    /// Symbol scalars flatten to strings; a non-finite float becomes `null`
    /// (JSON has no rendering for it).
    pub fn to_plain(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => serde_json::Value::from(*n),
            Value::Float(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) | Value::Sym(s) => serde_json::Value::String(s.clone()),
            Value::Seq(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_plain).collect())
            }
            Value::Map(map) => map.to_plain(),
        }
    }

    fn rewrite_key_forms(&mut self, to_sym: bool) {
        match self {
            Value::Map(map) => map.rewrite_key_forms(to_sym),
            Value::Seq(items) => {
                for item in items {
                    item.rewrite_key_forms(to_sym);
                }
            }
            _ => {}
        }
    }
}

impl<P: KeyPolicy> DynMap<P> {
    /// Build a map from a plain JSON object, converting recursively.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ConvertError> {
        Self::try_from(value)
    }

    /// Recursive conversion to a plain `serde_json::Value` object. No
    /// [`DynMap`] is reachable from the result.
    pub fn to_plain(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        for (k, v) in self.iter() {
            object.insert(k.as_str().to_string(), v.to_plain());
        }
        serde_json::Value::Object(object)
    }

    /// Recursively rewrite every key to symbol form.
    ///
    /// The policy still applies afterwards, so on a [`Stringify`] map this is
    /// a no-op.
    ///
    /// [`Stringify`]: super::key::Stringify
    pub fn symbolize_keys(&mut self) {
        self.rewrite_key_forms(true);
    }

    /// Recursively rewrite every key to string form.
    pub fn stringify_keys(&mut self) {
        self.rewrite_key_forms(false);
    }

    fn rewrite_key_forms(&mut self, to_sym: bool) {
        for (key, value) in self.entries.iter_mut() {
            let rewritten = if to_sym {
                key.clone().into_sym_form()
            } else {
                key.clone().into_str_form()
            };
            *key = P::canonical(rewritten);
            value.rewrite_key_forms(to_sym);
        }
    }
}

impl<P: KeyPolicy> Serialize for Value<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::Str(s) | Value::Sym(s) => serializer.serialize_str(s),
            Value::Seq(items) => serializer.collect_seq(items),
            Value::Map(map) => map.serialize(serializer),
        }
    }
}

impl<P: KeyPolicy> Serialize for DynMap<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            state.serialize_entry(k.as_str(), v)?;
        }
        state.end()
    }
}

struct ValueVisitor<P>(PhantomData<P>);

impl<'de, P: KeyPolicy> Visitor<'de> for ValueVisitor<P> {
    type Value = Value<P>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar, sequence, or map")
    }

    fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Value::Int(v))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(match i64::try_from(v) {
            Ok(n) => Value::Int(n),
            Err(_) => Value::Float(v as f64),
        })
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Value::Str(v.to_string()))
    }

    fn visit_string<E: serde::de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Value::Str(v))
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Seq(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = DynMap::new();
        while let Some((key, value)) = access.next_entry::<String, Value<P>>()? {
            map.set(key, value);
        }
        Ok(Value::Map(map))
    }
}

impl<'de, P: KeyPolicy> Deserialize<'de> for Value<P> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor(PhantomData))
    }
}

impl<'de, P: KeyPolicy> Deserialize<'de> for DynMap<P> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::<P>::deserialize(deserializer)? {
            Value::Map(map) => Ok(map),
            other => Err(serde::de::Error::invalid_type(
                serde::de::Unexpected::Other(other.type_name()),
                &"a map",
            )),
        }
    }
}
