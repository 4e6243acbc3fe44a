//! Value coercions applied on the record write path.

use std::fmt;
use std::rc::Rc;

use super::{RecordValue, SchemaError};
use crate::map::value::Value;

/// How a declared property reshapes incoming values.
///
/// Coercions run after the property's transform, so a transform can hand a
/// coercion whatever shape it expects. `Null` passes through every coercion
/// untouched; required-value checks deal with it separately.
#[derive(Clone)]
pub enum Coercion {
    /// Integers stay, floats truncate, textual values parse.
    Int,
    /// Floats stay, integers widen, textual values parse.
    Float,
    /// Any scalar renders to its string form.
    String,
    /// Textual values become symbols.
    Symbol,
    /// Custom coercion; `None` from the closure signals failure.
    With(Rc<dyn Fn(&RecordValue) -> Option<RecordValue>>),
}

impl Coercion {
    fn target_name(&self) -> &'static str {
        match self {
            Coercion::Int => "integer",
            Coercion::Float => "float",
            Coercion::String => "string",
            Coercion::Symbol => "symbol",
            Coercion::With(_) => "custom",
        }
    }

    pub(crate) fn apply(
        &self,
        property: &str,
        value: RecordValue,
    ) -> Result<RecordValue, SchemaError> {
        if value.is_null() {
            return Ok(value);
        }
        let fail = |value: &RecordValue| SchemaError::NotCoercable {
            property: property.to_string(),
            from: value.type_name(),
            to: self.target_name(),
        };
        match self {
            Coercion::Int => match &value {
                Value::Int(_) => Ok(value),
                Value::Float(f) => Ok(Value::Int(*f as i64)),
                Value::Str(s) | Value::Sym(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| fail(&value)),
                _ => Err(fail(&value)),
            },
            Coercion::Float => match &value {
                Value::Float(_) => Ok(value),
                Value::Int(i) => Ok(Value::Float(*i as f64)),
                Value::Str(s) | Value::Sym(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| fail(&value)),
                _ => Err(fail(&value)),
            },
            Coercion::String => match &value {
                Value::Str(_) => Ok(value),
                Value::Sym(s) => Ok(Value::Str(s.clone())),
                Value::Bool(b) => Ok(Value::Str(b.to_string())),
                Value::Int(i) => Ok(Value::Str(i.to_string())),
                Value::Float(f) => Ok(Value::Str(f.to_string())),
                _ => Err(fail(&value)),
            },
            Coercion::Symbol => match &value {
                Value::Sym(_) => Ok(value),
                Value::Str(s) => Ok(Value::Sym(s.clone())),
                _ => Err(fail(&value)),
            },
            Coercion::With(f) => f(&value).ok_or_else(|| fail(&value)),
        }
    }
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Coercion::Int => "Coercion::Int",
            Coercion::Float => "Coercion::Float",
            Coercion::String => "Coercion::String",
            Coercion::Symbol => "Coercion::Symbol",
            Coercion::With(_) => "Coercion::With(..)",
        })
    }
}
