//! Trait definitions
//!
//! This module defines the seam between field tables and the host record that
//! owns the hstore columns.

use std::collections::BTreeMap;

/// Contents of one hstore column: store key to canonical string (or hstore NULL)
pub type HstoreMap = BTreeMap<String, Option<String>>;

/// A host record holding one or more hstore columns
///
/// The host keeps attribute storage and dirty state; field tables only read
/// and replace whole mappings through this trait.
pub trait HstoreRecord {
    /// Current mapping of an hstore attribute, `None` before the first write
    fn hstore(&self, attribute: &str) -> Option<&HstoreMap>;

    /// Replace the mapping of an hstore attribute
    fn set_hstore(&mut self, attribute: &str, value: HstoreMap);

    /// Mark an hstore attribute as about to change
    fn hstore_will_change(&mut self, attribute: &str);

    /// Mapping as it was before unsaved changes
    ///
    /// Hosts without dirty tracking report the current mapping.
    fn hstore_was(&self, attribute: &str) -> Option<&HstoreMap> {
        self.hstore(attribute)
    }
}
