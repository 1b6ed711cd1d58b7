use std::slice;

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use super::ManifestError;

/// Anything listed under `components:` is identified by its name.
pub trait Named {
    fn name(&self) -> &str;
}

/// Ordered component list with name lookup.
///
/// Serializes as a plain sequence. Deserializing rejects duplicate names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Components<T> {
    items: Vec<T>,
}

impl<T> Default for Components<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Named> Components<T> {
    pub fn new(items: Vec<T>) -> Result<Self, ManifestError> {
        for (idx, item) in items.iter().enumerate() {
            if items[..idx].iter().any(|seen| seen.name() == item.name()) {
                return Err(ManifestError::Invalid(format!(
                    "duplicate component name '{}'",
                    item.name()
                )));
            }
        }
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(Named::name).collect()
    }

    pub fn find(&self, name: &str) -> Option<&T> {
        self.items.iter().find(|c| c.name() == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut T> {
        self.items.iter_mut().find(|c| c.name() == name)
    }

    /// Lookup that fails when the name is not listed.
    pub fn get(&self, name: &str) -> Result<&T, ManifestError> {
        self.find(name)
            .ok_or_else(|| ManifestError::ComponentNotFound(name.to_string()))
    }

    /// Replace the entry with the same name in place, or append.
    pub fn upsert(&mut self, component: T) {
        match self.items.iter().position(|c| c.name() == component.name()) {
            Some(idx) => self.items[idx] = component,
            None => self.items.push(component),
        }
    }
}

impl<'a, T> IntoIterator for &'a Components<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Serialize> Serialize for Components<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de> + Named> Deserialize<'de> for Components<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        Components::new(items).map_err(de::Error::custom)
    }
}
