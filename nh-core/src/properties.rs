//! Runtime property stores.
//!
//! A property store is a flat string key/value lookup consulted by the
//! configuration resolver. Missing keys and empty values are equivalent.

use std::collections::HashMap;

/// Minimal key/value lookup used by [`crate::resolve::ResolvedConfig::resolve`].
pub trait PropertyStore {
    /// Look up a property. `None` and `Some("")` mean the same thing.
    fn get_property(&self, key: &str) -> Option<String>;
}

impl PropertyStore for HashMap<String, String> {
    fn get_property(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<T: PropertyStore + ?Sized> PropertyStore for &T {
    fn get_property(&self, key: &str) -> Option<String> {
        (**self).get_property(key)
    }
}

/// Reads properties from the process environment, optionally prefixed.
///
/// With prefix `NOTEHUB_`, the key `SLACK_BOT_TOKEN` is read from
/// `NOTEHUB_SLACK_BOT_TOKEN`.
#[derive(Debug, Clone, Default)]
pub struct EnvProperties {
    prefix: String,
}

impl EnvProperties {
    /// Create a store reading `<prefix><KEY>` variables.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl PropertyStore for EnvProperties {
    fn get_property(&self, key: &str) -> Option<String> {
        std::env::var(format!("{}{key}", self.prefix)).ok()
    }
}

/// Consults several stores in order; the first non-empty value wins.
#[derive(Default)]
pub struct LayeredProperties<'a> {
    layers: Vec<&'a dyn PropertyStore>,
}

impl<'a> LayeredProperties<'a> {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Add a lower-priority layer.
    pub fn with(mut self, store: &'a dyn PropertyStore) -> Self {
        self.layers.push(store);
        self
    }
}

impl PropertyStore for LayeredProperties<'_> {
    fn get_property(&self, key: &str) -> Option<String> {
        self.layers
            .iter()
            .filter_map(|store| store.get_property(key))
            .find(|value| !value.is_empty())
    }
}

/// Parse `KEY=VALUE` pairs (as given on the command line) into a map.
/// Entries without `=` are ignored.
pub fn parse_overrides<I, S>(pairs: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pairs
        .into_iter()
        .filter_map(|pair| {
            let (key, value) = pair.as_ref().split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}
