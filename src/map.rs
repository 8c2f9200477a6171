//! Ordered map type for object properties.
//!
//! [`PropertyMap`] is a thin wrapper around [`IndexMap`] that keeps
//! properties in insertion order. Property order matters in STON: canonical
//! serialization walks the effective property map in declaration order, and
//! unknown properties are re-emitted in the order they appeared in the input,
//! so an unordered hash map would break round-tripping.

use indexmap::IndexMap;

/// An insertion-ordered map of property names to [`Value`](crate::Value)s.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyMap(IndexMap<String, crate::Value>);

impl PropertyMap {
    pub fn new() -> Self {
        PropertyMap(IndexMap::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        PropertyMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a name/value pair, returning the previous value if any.
    pub fn insert(&mut self, name: String, value: crate::Value) -> Option<crate::Value> {
        self.0.insert(name, value)
    }

    pub fn get(&self, name: &str) -> Option<&crate::Value> {
        self.0.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut crate::Value> {
        self.0.get_mut(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates names in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, crate::Value> {
        self.0.keys()
    }

    /// Iterates values in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, crate::Value> {
        self.0.values()
    }

    /// Iterates name/value pairs in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, crate::Value> {
        self.0.iter()
    }
}

impl IntoIterator for PropertyMap {
    type Item = (String, crate::Value);
    type IntoIter = indexmap::map::IntoIter<String, crate::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PropertyMap {
    type Item = (&'a String, &'a crate::Value);
    type IntoIter = indexmap::map::Iter<'a, String, crate::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, crate::Value)> for PropertyMap {
    fn from_iter<T: IntoIterator<Item = (String, crate::Value)>>(iter: T) -> Self {
        PropertyMap(IndexMap::from_iter(iter))
    }
}
