//! Host attribute cache.
//!
//! The bridge never talks to Zigbee controllers itself; it writes attribute
//! values into a cache owned by the host gateway, which handles its own
//! subscribers and persistence.

use crate::clusters::{AttributeValue, ClusterKind};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Location of an attribute in the host's data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributePath {
    pub endpoint_id: u8,
    pub cluster: ClusterKind,
    pub attribute_id: u16,
}

impl AttributePath {
    pub fn new(endpoint_id: u8, cluster: ClusterKind, attribute_id: u16) -> Self {
        Self {
            endpoint_id,
            cluster,
            attribute_id,
        }
    }
}

/// Outbound interface to the host's attribute storage.
pub trait AttributeCache: Send + Sync {
    /// Store a new attribute value. Called on every accepted update.
    fn update_attribute(&self, path: AttributePath, value: AttributeValue);
}

/// In-process attribute cache used by the binaries and tests.
#[derive(Default)]
pub struct MemoryAttributeCache {
    values: RwLock<BTreeMap<AttributePath, AttributeValue>>,
}

impl MemoryAttributeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read back a cached attribute.
    pub fn get(&self, path: AttributePath) -> Option<AttributeValue> {
        self.values.read().get(&path).cloned()
    }

    /// Number of attributes currently cached.
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// Copy of all cached attributes, ordered by path.
    pub fn entries(&self) -> Vec<(AttributePath, AttributeValue)> {
        self.values
            .read()
            .iter()
            .map(|(path, value)| (*path, value.clone()))
            .collect()
    }
}

impl AttributeCache for MemoryAttributeCache {
    fn update_attribute(&self, path: AttributePath, value: AttributeValue) {
        self.values.write().insert(path, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_overwrites() {
        let cache = MemoryAttributeCache::new();
        let path = AttributePath::new(1, ClusterKind::TemperatureMeasurement, 0);
        assert!(cache.is_empty());

        cache.update_attribute(path, AttributeValue::Number(2150.0));
        cache.update_attribute(path, AttributeValue::Number(2200.0));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(path), Some(AttributeValue::Number(2200.0)));
    }

    #[test]
    fn test_paths_are_distinct_per_endpoint() {
        let cache = MemoryAttributeCache::new();
        let ep1 = AttributePath::new(1, ClusterKind::TemperatureMeasurement, 0);
        let ep3 = AttributePath::new(3, ClusterKind::TemperatureMeasurement, 0);

        cache.update_attribute(ep1, AttributeValue::Number(1.0));

        assert_eq!(cache.get(ep3), None);
        assert_eq!(cache.entries().len(), 1);
    }
}
