//! Schema-validated attribute records.

use std::fmt;
use std::rc::Rc;

use crate::map::key::{Key, Stringify};
use crate::map::DynMap;

use super::{Property, RecordValue, Schema, SchemaError};

/// A lazily evaluated attribute value.
pub type LazyFn = Rc<dyn Fn() -> RecordValue>;

/// How strictly a record enforces required properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Missing required values fail construction; writing `Null` to a
    /// required property is an error.
    #[default]
    Strict,
    /// Required checks are skipped; undeclared-property and coercion errors
    /// still apply.
    Relaxed,
}

/// An instance of a [`Schema`]: named attribute storage where every read and
/// write is checked against the declarations.
///
/// Records share their schema through an [`Rc`]; constructing many records
/// against one schema copies no declarations.
#[derive(Clone)]
pub struct Record {
    schema: Rc<Schema>,
    values: DynMap<Stringify>,
    pending: Vec<(String, LazyFn)>,
    mode: ValidationMode,
}

impl Record {
    /// Build a record in [`ValidationMode::Strict`].
    ///
    /// Defaults are produced fresh for this instance first, then each
    /// attribute is written through the full write path (translation,
    /// transform, coercion), then required properties are checked.
    pub fn construct(schema: Rc<Schema>, attrs: &DynMap<Stringify>) -> Result<Self, SchemaError> {
        Self::construct_with_mode(schema, attrs, ValidationMode::Strict)
    }

    pub fn construct_with_mode(
        schema: Rc<Schema>,
        attrs: &DynMap<Stringify>,
        mode: ValidationMode,
    ) -> Result<Self, SchemaError> {
        let mut record = Self {
            schema,
            values: DynMap::new(),
            pending: Vec::new(),
            mode,
        };
        record.install_defaults();
        for (key, value) in attrs.iter() {
            record.write(key.as_str(), value.clone())?;
        }
        record.validate()?;
        Ok(record)
    }

    pub fn schema(&self) -> &Rc<Schema> {
        &self.schema
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Read an attribute, resolving and memoizing a pending lazy value if
    /// one is installed. Declared-but-unset attributes read as `Null`.
    pub fn read(&mut self, name: &str) -> Result<RecordValue, SchemaError> {
        if !self.schema.is_declared(name) {
            return Err(SchemaError::UndeclaredProperty(name.to_string()));
        }
        if let Some(i) = self.pending.iter().position(|(n, _)| n == name) {
            let (_, f) = self.pending.remove(i);
            let value = f();
            self.values.set(name.to_string(), value.clone());
            return Ok(value);
        }
        Ok(self.values.get(name))
    }

    /// Read without resolving lazies. A pending lazy attribute reads as
    /// `None` here even though validation counts it as present.
    pub fn get(&self, name: &str) -> Result<Option<&RecordValue>, SchemaError> {
        if !self.schema.is_declared(name) {
            return Err(SchemaError::UndeclaredProperty(name.to_string()));
        }
        Ok(self.values.get_ref(name))
    }

    /// Write an attribute through translation, transform, and coercion.
    ///
    /// `name` may be a declared property or a `from` alias; the alias wins
    /// when both match. A bare transform (declared without `from`) runs only
    /// when the write arrives under the property's own name.
    pub fn write(&mut self, name: &str, value: RecordValue) -> Result<(), SchemaError> {
        let schema = Rc::clone(&self.schema);
        if let Some(property) = schema.translated(name) {
            let value = property.apply_transform(value);
            let value = property.apply_coercion(value)?;
            self.store(property, value)
        } else if let Some(property) = schema.property(name) {
            let value = if property.alias().is_none() {
                property.apply_transform(value)
            } else {
                value
            };
            let value = property.apply_coercion(value)?;
            self.store(property, value)
        } else {
            Err(SchemaError::UndeclaredProperty(name.to_string()))
        }
    }

    /// Install a lazy value, replacing any stored or pending one. The
    /// pending value counts as present for required-property checks.
    pub fn write_lazy(
        &mut self,
        name: &str,
        f: impl Fn() -> RecordValue + 'static,
    ) -> Result<(), SchemaError> {
        if !self.schema.is_declared(name) {
            return Err(SchemaError::UndeclaredProperty(name.to_string()));
        }
        self.values.remove(name);
        self.pending.retain(|(n, _)| n != name);
        self.pending.push((name.to_string(), Rc::new(f)));
        Ok(())
    }

    /// Write every attribute of `attrs` into this record.
    pub fn merge_into(&mut self, attrs: &DynMap<Stringify>) -> Result<(), SchemaError> {
        for (key, value) in attrs.iter() {
            self.write(key.as_str(), value.clone())?;
        }
        self.validate()
    }

    /// Like [`merge_into`](Self::merge_into), but when the incoming key
    /// would overwrite a stored value, `resolve` picks the value to write.
    pub fn merge_into_with(
        &mut self,
        attrs: &DynMap<Stringify>,
        resolve: impl Fn(&Key, &RecordValue, &RecordValue) -> RecordValue,
    ) -> Result<(), SchemaError> {
        let schema = Rc::clone(&self.schema);
        for (key, value) in attrs.iter() {
            let target = schema
                .translated(key.as_str())
                .or_else(|| schema.property(key.as_str()))
                .map(Property::name);
            let value = match target.and_then(|t| self.values.get_ref(t)) {
                Some(existing) => resolve(key, existing, value),
                None => value.clone(),
            };
            self.write(key.as_str(), value)?;
        }
        self.validate()
    }

    /// A copy of this record with `attrs` merged in.
    pub fn merge(&self, attrs: &DynMap<Stringify>) -> Result<Self, SchemaError> {
        let mut merged = self.clone();
        merged.merge_into(attrs)?;
        Ok(merged)
    }

    /// Discard all attributes, reinstall fresh defaults, and write `attrs`.
    pub fn replace_contents(&mut self, attrs: &DynMap<Stringify>) -> Result<(), SchemaError> {
        self.values.clear();
        self.pending.clear();
        self.install_defaults();
        for (key, value) in attrs.iter() {
            self.write(key.as_str(), value.clone())?;
        }
        self.validate()
    }

    /// Resolve every pending lazy value into storage.
    pub fn resolve_all(&mut self) {
        for (name, f) in std::mem::take(&mut self.pending) {
            self.values.set(name, f());
        }
    }

    /// The stored attributes. Pending lazies are not visible here; call
    /// [`resolve_all`](Self::resolve_all) first if they should be.
    pub fn to_map(&self) -> &DynMap<Stringify> {
        &self.values
    }

    pub fn to_plain(&self) -> serde_json::Value {
        self.values.to_plain()
    }

    fn install_defaults(&mut self) {
        let schema = Rc::clone(&self.schema);
        for property in schema.properties() {
            if let Some(value) = property.produce_default() {
                self.values.set(property.name().to_string(), value);
            }
        }
    }

    fn store(&mut self, property: &Property, value: RecordValue) -> Result<(), SchemaError> {
        if property.is_required() && value.is_null() {
            return match self.mode {
                ValidationMode::Strict => Err(SchemaError::RequiredPropertyMissing(
                    property.name().to_string(),
                )),
                ValidationMode::Relaxed => Ok(()),
            };
        }
        self.pending.retain(|(n, _)| n != property.name());
        self.values.set(property.name().to_string(), value);
        Ok(())
    }

    fn validate(&self) -> Result<(), SchemaError> {
        if self.mode == ValidationMode::Relaxed {
            return Ok(());
        }
        for property in self.schema.properties() {
            if !property.is_required() {
                continue;
            }
            let stored = self
                .values
                .get_ref(property.name())
                .is_some_and(|v| !v.is_null());
            let pending = self.pending.iter().any(|(n, _)| n == property.name());
            if !stored && !pending {
                return Err(SchemaError::RequiredPropertyMissing(
                    property.name().to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending: Vec<_> = self.pending.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("Record")
            .field("values", &self.values)
            .field("pending", &pending)
            .field("mode", &self.mode)
            .finish()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}
