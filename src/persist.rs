//! File-backed maps.
//!
//! [`Persisted`] wraps a [`DynMap`] together with the path it was loaded
//! from, so [`save`](Persisted::save) without arguments writes back to the
//! source file. The on-disk format is YAML; any YAML mapping loads, and
//! symbol-form keys round-trip as plain strings.

use std::fs;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::map::key::{KeyPolicy, Preserve};
use crate::map::DynMap;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("no target path: map was not loaded from a file and no path was given")]
    NoPath,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A map bound to the file it round-trips through.
#[derive(Debug, Clone, PartialEq)]
pub struct Persisted<P: KeyPolicy = Preserve> {
    map: DynMap<P>,
    source: Option<PathBuf>,
}

/// Load a map from a YAML file at `path`.
pub fn load<P: KeyPolicy>(path: impl AsRef<Path>) -> Result<Persisted<P>, PersistError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let map: DynMap<P> = serde_yaml::from_str(&text)?;
    info!(path = %path.display(), entries = map.len(), "loaded map");
    Ok(Persisted {
        map,
        source: Some(path.to_path_buf()),
    })
}

impl<P: KeyPolicy> Persisted<P> {
    /// Wrap an in-memory map with no source path yet. The first
    /// [`save`](Self::save) must name a path.
    pub fn create(map: DynMap<P>) -> Self {
        Self { map, source: None }
    }

    /// The file this map was loaded from or last saved to.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn into_map(self) -> DynMap<P> {
        self.map
    }

    /// Write the map as YAML. With `path` given, writes there and remembers
    /// it as the new source; otherwise writes back to the current source.
    pub fn save(&mut self, path: Option<&Path>) -> Result<PathBuf, PersistError> {
        let target = match path {
            Some(p) => p.to_path_buf(),
            None => self.source.clone().ok_or(PersistError::NoPath)?,
        };
        let text = serde_yaml::to_string(&self.map)?;
        fs::write(&target, text)?;
        info!(path = %target.display(), entries = self.map.len(), "saved map");
        self.source = Some(target.clone());
        Ok(target)
    }
}

impl<P: KeyPolicy> Deref for Persisted<P> {
    type Target = DynMap<P>;

    fn deref(&self) -> &Self::Target {
        &self.map
    }
}

impl<P: KeyPolicy> DerefMut for Persisted<P> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::value::Value;

    #[test]
    fn test_save_requires_a_path_once() {
        let mut persisted: Persisted = Persisted::create(DynMap::new());
        assert!(matches!(persisted.save(None), Err(PersistError::NoPath)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.yml");
        persisted.set("name", "ada");
        persisted.save(Some(&path)).unwrap();

        // The path is remembered so later saves can omit it.
        persisted.set("age", 36i64);
        let written = persisted.save(None).unwrap();
        assert_eq!(written, path);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.yml");

        let mut map: DynMap = DynMap::new();
        map.set("name", "ada");
        let mut address: DynMap = DynMap::new();
        address.set("city", "london");
        map.set("address", address);

        let mut persisted = Persisted::create(map.clone());
        persisted.save(Some(&path)).unwrap();

        let loaded: Persisted = load(&path).unwrap();
        assert_eq!(*loaded, map);
        assert_eq!(loaded.source(), Some(path.as_path()));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result: Result<Persisted, _> = load(dir.path().join("absent.yml"));
        assert!(matches!(result, Err(PersistError::Io(_))));
    }

    #[test]
    fn test_load_non_mapping_is_yaml_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.yml");
        fs::write(&path, "- 1\n- 2\n").unwrap();
        let result: Result<Persisted, _> = load(&path);
        assert!(matches!(result, Err(PersistError::Yaml(_))));
    }

    #[test]
    fn test_symbol_keys_flatten_to_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.yml");

        let mut map: DynMap = DynMap::new();
        map.set(crate::map::key::Key::Sym("kind".into()), Value::Sym("admin".into()));
        Persisted::create(map).save(Some(&path)).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("kind: admin"));
    }
}
