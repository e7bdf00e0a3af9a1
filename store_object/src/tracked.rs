//! Tracked hstore attributes
//!
//! A ready-made `HstoreRecord` for hosts that want dirty tracking without
//! writing their own. Embed it in a model struct and delegate to it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::traits::record::{HstoreMap, HstoreRecord};

/// Hstore columns of one record together with their last persisted state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HstoreAttributes {
    values: BTreeMap<String, HstoreMap>,
    originals: BTreeMap<String, Option<HstoreMap>>,
}

impl HstoreAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create attributes holding a persisted mapping
    pub fn with_persisted(attribute: &str, value: HstoreMap) -> Self {
        let mut attributes = Self::new();
        attributes.load(attribute, Some(value));
        attributes
    }

    /// Replace an attribute with persisted state, discarding its pending changes
    pub fn load(&mut self, attribute: &str, value: Option<HstoreMap>) {
        self.originals.remove(attribute);
        match value {
            Some(map) => {
                self.values.insert(attribute.to_string(), map);
            }
            None => {
                self.values.remove(attribute);
            }
        }
    }

    /// Whether the attribute differs from its persisted state
    pub fn is_changed(&self, attribute: &str) -> bool {
        match self.originals.get(attribute) {
            Some(original) => original.as_ref() != self.values.get(attribute),
            None => false,
        }
    }

    /// Attributes whose mapping differs from the persisted state
    pub fn changed_attributes(&self) -> Vec<&str> {
        self.originals
            .keys()
            .filter(|attribute| self.is_changed(attribute))
            .map(String::as_str)
            .collect()
    }

    /// Accept the current mappings as persisted, e.g. after a successful save
    pub fn changes_applied(&mut self) {
        self.originals.clear();
    }

    /// Revert an attribute to its persisted mapping
    pub fn restore_attribute(&mut self, attribute: &str) {
        if let Some(original) = self.originals.remove(attribute) {
            match original {
                Some(map) => {
                    self.values.insert(attribute.to_string(), map);
                }
                None => {
                    self.values.remove(attribute);
                }
            }
        }
    }
}

impl HstoreRecord for HstoreAttributes {
    fn hstore(&self, attribute: &str) -> Option<&HstoreMap> {
        self.values.get(attribute)
    }

    fn set_hstore(&mut self, attribute: &str, value: HstoreMap) {
        self.values.insert(attribute.to_string(), value);
    }

    fn hstore_will_change(&mut self, attribute: &str) {
        if !self.originals.contains_key(attribute) {
            let snapshot = self.values.get(attribute).cloned();
            self.originals.insert(attribute.to_string(), snapshot);
        }
    }

    fn hstore_was(&self, attribute: &str) -> Option<&HstoreMap> {
        match self.originals.get(attribute) {
            Some(original) => original.as_ref(),
            None => self.hstore(attribute),
        }
    }
}
