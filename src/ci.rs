// src/ci.rs

//! Case-insensitive collections used throughout the sync controller.
//!
//! Member names are compared, hashed, and looked up case-insensitively
//! everywhere in this crate, but the original spelling is worth keeping
//! around for diagnostics and for emitting the `synchronous_standby_names`
//! string back out. These wrappers fold the key for storage/lookup while
//! retaining the spelling the caller inserted.

use std::collections::HashMap;
use std::fmt;

fn fold(name: &str) -> String {
    name.to_lowercase()
}

/// A set of names compared case-insensitively, preserving original spelling.
#[derive(Clone, Default)]
pub struct CiSet {
    entries: HashMap<String, String>,
}

impl CiSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        self.entries.insert(fold(&name), name).is_none()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&fold(name))
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.remove(&fold(name)).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    pub fn is_subset(&self, other: &CiSet) -> bool {
        self.entries.keys().all(|k| other.entries.contains_key(k))
    }
}

impl PartialEq for CiSet {
    fn eq(&self, other: &Self) -> bool {
        let a: std::collections::HashSet<&String> = self.entries.keys().collect();
        let b: std::collections::HashSet<&String> = other.entries.keys().collect();
        a == b
    }
}

impl Eq for CiSet {}

impl fmt::Debug for CiSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.values()).finish()
    }
}

impl FromIterator<String> for CiSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        let mut set = CiSet::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

impl<'a> FromIterator<&'a str> for CiSet {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut set = CiSet::new();
        for name in iter {
            set.insert(name.to_string());
        }
        set
    }
}

impl IntoIterator for CiSet {
    type Item = String;
    type IntoIter = std::collections::hash_map::IntoValues<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

/// A map keyed by name, compared case-insensitively, preserving original spelling of the key.
#[derive(Clone, Default)]
pub struct CiMap<V> {
    entries: HashMap<String, (String, V)>,
}

impl<V> CiMap<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        let name = name.into();
        self.entries
            .insert(fold(&name), (name, value))
            .map(|(_, v)| v)
    }

    pub fn get<Q>(&self, name: &Q) -> Option<&V>
    where
        Q: AsRef<str> + ?Sized,
    {
        self.entries.get(&fold(name.as_ref())).map(|(_, v)| v)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(&fold(name))
    }

    pub fn remove(&mut self, name: &str) -> Option<V> {
        self.entries.remove(&fold(name)).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|(k, _)| k.as_str())
    }

    pub fn retain(&mut self, mut f: impl FnMut(&str, &mut V) -> bool) {
        self.entries.retain(|_, (k, v)| f(k, v));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: fmt::Debug> fmt::Debug for CiMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.values().map(|(k, v)| (k, v)))
            .finish()
    }
}
