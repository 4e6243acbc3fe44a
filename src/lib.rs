//! mapkit - Dynamic maps with indifferent keys, declared schemas, and
//! deep-structure utilities
//!
//! Provides:
//! - [`DynMap`]: an insertion-ordered map where string and symbol forms of a
//!   key address the same entry, with optional per-map defaults and an
//!   explicit dynamic accessor surface ([`map::access`])
//! - [`Schema`]/[`Record`]: declared-property records with defaults,
//!   required checks, write-path translation, and coercions
//! - [`deep`]: recursive search, collection, and path fetch over nested maps
//! - [`persist`]: YAML round-tripping of maps bound to their source file

pub mod deep;
pub mod map;
pub mod persist;
pub mod schema;

// Re-export commonly used types
pub use map::{
    AccessError, Accessor, AccessorKind, ConvertError, DynMap, Key, KeyPolicy, Preserve,
    Stringify, Value,
};

pub use deep::{
    deep_fetch, deep_fetch_or, deep_find, deep_find_all, deep_grep, deep_locate,
    deep_locate_key, UndefinedPathError,
};

pub use schema::{
    Coercion, Property, Record, RecordValue, Schema, SchemaBuilder, SchemaError, ValidationMode,
};

pub use persist::{load, PersistError, Persisted};
