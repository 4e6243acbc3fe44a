//! Property-declared records.
//!
//! A [`Schema`] is an explicit registry of [`Property`] declarations built
//! through [`SchemaBuilder`], the redesigned form of class-level property
//! declarations. Deriving a schema takes a snapshot copy of the parent's
//! declarations; later changes to either side never affect the other.
//!
//! [`Record`](record::Record) instances validate against their schema on
//! construction and on every write.

pub mod coerce;
pub mod record;

pub use coerce::Coercion;
pub use record::{Record, ValidationMode};

use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::map::key::Stringify;
use crate::map::value::Value;

/// Values stored by records. Record storage canonicalizes keys to string
/// form, so the [`Stringify`] policy is the natural fit.
pub type RecordValue = Value<Stringify>;

/// A value transform applied on the write path.
pub type Transform = Rc<dyn Fn(RecordValue) -> RecordValue>;

/// Schema violations; all immediate and synchronous.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("property not declared: '{0}'")]
    UndeclaredProperty(String),

    #[error("required property '{0}' is missing its value")]
    RequiredPropertyMissing(String),

    #[error("translation for property '{0}' points at itself")]
    DuplicateTranslation(String),

    #[error("cannot coerce {from} value to {to} for property '{property}'")]
    NotCoercable {
        property: String,
        from: &'static str,
        to: &'static str,
    },
}

/// Where a property's per-instance default comes from.
#[derive(Clone)]
pub enum PropertyDefault {
    /// Deep-copied into each instance.
    Value(RecordValue),
    /// Invoked fresh per instance.
    Generator(Rc<dyn Fn() -> RecordValue>),
}

/// A declared property: name plus the options governing its write path.
#[derive(Clone)]
pub struct Property {
    name: String,
    default: Option<PropertyDefault>,
    required: bool,
    from: Option<String>,
    transform: Option<Transform>,
    coerce: Option<Coercion>,
}

impl Property {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            required: false,
            from: None,
            transform: None,
            coerce: None,
        }
    }

    /// Mark the property required: it must hold a non-null value after
    /// construction and after every write.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Literal default, deep-copied per instance.
    pub fn default_value(mut self, value: impl Into<RecordValue>) -> Self {
        self.default = Some(PropertyDefault::Value(value.into()));
        self
    }

    /// Generated default, invoked fresh per instance.
    pub fn default_fn(mut self, f: impl Fn() -> RecordValue + 'static) -> Self {
        self.default = Some(PropertyDefault::Generator(Rc::new(f)));
        self
    }

    /// Write-only input alias: values arriving under `alias` populate this
    /// property instead. The alias itself is never readable.
    pub fn from(mut self, alias: impl Into<String>) -> Self {
        self.from = Some(alias.into());
        self
    }

    /// Transform applied to incoming values before storage.
    pub fn transform(mut self, f: impl Fn(RecordValue) -> RecordValue + 'static) -> Self {
        self.transform = Some(Rc::new(f));
        self
    }

    /// Coercion resolved now, at declaration time, and applied after the
    /// transform on every write.
    pub fn coerce(mut self, coercion: Coercion) -> Self {
        self.coerce = Some(coercion);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn alias(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub(crate) fn produce_default(&self) -> Option<RecordValue> {
        match &self.default {
            Some(PropertyDefault::Value(v)) => Some(v.clone()),
            Some(PropertyDefault::Generator(f)) => Some(f()),
            None => None,
        }
    }

    pub(crate) fn apply_transform(&self, value: RecordValue) -> RecordValue {
        match &self.transform {
            Some(f) => f(value),
            None => value,
        }
    }

    pub(crate) fn apply_coercion(&self, value: RecordValue) -> Result<RecordValue, SchemaError> {
        match &self.coerce {
            Some(c) => c.apply(&self.name, value),
            None => Ok(value),
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("required", &self.required)
            .field("has_default", &self.default.is_some())
            .field("from", &self.from)
            .field("has_transform", &self.transform.is_some())
            .field("coerce", &self.coerce)
            .finish()
    }
}

/// An ordered registry of property declarations.
#[derive(Debug, Clone)]
pub struct Schema {
    properties: Vec<Property>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder {
            properties: Vec::new(),
        }
    }

    /// A builder seeded with a snapshot copy of this schema's declarations.
    pub fn derive(&self) -> SchemaBuilder {
        SchemaBuilder {
            properties: self.properties.clone(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// The property whose `from` alias is `alias`, if any.
    pub fn translated(&self, alias: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.alias() == Some(alias))
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Builder-style declaration API for [`Schema`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    properties: Vec<Property>,
}

impl SchemaBuilder {
    /// Declare (or re-declare) a property.
    ///
    /// Re-declaring replaces the previous declaration wholesale; in
    /// particular, re-declaring without a default removes a previously
    /// configured one.
    pub fn property(mut self, property: Property) -> Self {
        match self.properties.iter().position(|p| p.name == property.name) {
            Some(i) => self.properties[i] = property,
            None => self.properties.push(property),
        }
        self
    }

    /// Finish, checking declaration-time rules.
    pub fn build(self) -> Result<Schema, SchemaError> {
        for property in &self.properties {
            if property.alias() == Some(property.name()) {
                return Err(SchemaError::DuplicateTranslation(property.name.clone()));
            }
        }
        Ok(Schema {
            properties: self.properties,
        })
    }
}
