//! # Property Maps
//!
//! Insertion ordered property name -> type maps.

use crate::model::DataTypeId;
use indexmap::map::{IndexMap, Iter, Keys};

/// Ordered mapping from property name to its resolved type.
///
/// Iteration order is the order in which names were first inserted; it drives
/// the field order of generated types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap(IndexMap<String, DataTypeId>);

impl PropertyMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a property. An existing name keeps its position and takes the new type.
    pub fn insert(&mut self, name: impl Into<String>, id: DataTypeId) -> Option<DataTypeId> {
        self.0.insert(name.into(), id)
    }

    /// Appends every property of `other` after the current ones.
    ///
    /// A name already present keeps its first position but takes the value from
    /// `other`: first occurrence position, last occurrence value.
    pub fn append(&mut self, other: &PropertyMap) {
        for (name, id) in &other.0 {
            self.0.insert(name.clone(), *id);
        }
    }

    /// Returns the type of a property.
    pub fn get(&self, name: &str) -> Option<DataTypeId> {
        self.0.get(name).copied()
    }

    /// Whether a property exists.
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Property names in order.
    pub fn keys(&self) -> Keys<'_, String, DataTypeId> {
        self.0.keys()
    }

    /// `(name, type)` pairs in order.
    pub fn iter(&self) -> Iter<'_, String, DataTypeId> {
        self.0.iter()
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no properties.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, DataTypeId)> for PropertyMap {
    fn from_iter<T: IntoIterator<Item = (String, DataTypeId)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PropertyMap {
    type Item = (&'a String, &'a DataTypeId);
    type IntoIter = Iter<'a, String, DataTypeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
