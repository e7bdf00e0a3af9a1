//! Typed accessors
//!
//! Generic getters and setters that read and write declared fields through
//! any `HstoreRecord`.

use type_mapping::{DataType, HstoreValue, ValueTypeMismatch};

use crate::errors::HstoreError;
use crate::field::{FieldDeclaration, FieldTable};
use crate::traits::record::{HstoreMap, HstoreRecord};

fn stored<'a>(mapping: Option<&'a HstoreMap>, declaration: &FieldDeclaration) -> Option<&'a str> {
    mapping
        .and_then(|map| map.get(declaration.store_key()))
        .and_then(|value| value.as_deref())
}

impl FieldTable {
    /// Read a field as a typed value
    pub fn get<R>(&self, record: &R, field: &str) -> Result<Option<HstoreValue>, HstoreError>
    where
        R: HstoreRecord + ?Sized,
    {
        let declaration = self.field(field)?;
        let raw = stored(record.hstore(self.attribute()), declaration);
        Ok(declaration.deserialize(raw))
    }

    /// Read a field converted to a concrete Rust type
    pub fn read<T, R>(&self, record: &R, field: &str) -> Result<Option<T>, HstoreError>
    where
        T: TryFrom<HstoreValue, Error = ValueTypeMismatch>,
        R: HstoreRecord + ?Sized,
    {
        match self.get(record, field)? {
            Some(value) => T::try_from(value)
                .map(Some)
                .map_err(|source| HstoreError::TypeMismatch {
                    field: field.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Boolean alias: `true` only when the field holds `true`
    pub fn is<R>(&self, record: &R, field: &str) -> Result<bool, HstoreError>
    where
        R: HstoreRecord + ?Sized,
    {
        let declaration = self.field(field)?;
        if declaration.data_type() != DataType::Boolean {
            return Err(HstoreError::UnsupportedPredicate {
                field: field.to_string(),
                data_type: declaration.data_type(),
                predicate: "?",
            });
        }
        Ok(self
            .get(record, field)?
            .and_then(|value| value.as_bool())
            .unwrap_or(false))
    }

    /// Write a field, or store hstore NULL under its key when `value` is `None`
    ///
    /// The value is cast to the declared type and serialized, the attribute is
    /// marked as changing, then the mapping is replaced with the merged copy.
    pub fn write<R>(&self, record: &mut R, field: &str, value: Option<HstoreValue>) -> Result<(), HstoreError>
    where
        R: HstoreRecord + ?Sized,
    {
        let declaration = self.field(field)?;
        let cast = value.and_then(|value| self.caster.cast(declaration.data_type(), value));
        let serialized = declaration.serialize(cast.as_ref());

        #[cfg(feature = "debug-logging")]
        tracing::trace!(
            attribute = self.attribute(),
            field,
            store_key = declaration.store_key(),
            value = ?serialized,
            "writing hstore field"
        );

        let attribute = self.attribute();
        let mut mapping = record.hstore(attribute).cloned().unwrap_or_default();
        mapping.insert(declaration.store_key().to_string(), serialized);

        record.hstore_will_change(attribute);
        record.set_hstore(attribute, mapping);
        Ok(())
    }

    /// Write a field from anything convertible into a typed value
    pub fn set<R, V>(&self, record: &mut R, field: &str, value: V) -> Result<(), HstoreError>
    where
        R: HstoreRecord + ?Sized,
        V: Into<HstoreValue>,
    {
        self.write(record, field, Some(value.into()))
    }

    /// Store hstore NULL for a field
    pub fn clear<R>(&self, record: &mut R, field: &str) -> Result<(), HstoreError>
    where
        R: HstoreRecord + ?Sized,
    {
        self.write(record, field, None)
    }

    /// Value of a field before unsaved changes
    pub fn was<R>(&self, record: &R, field: &str) -> Result<Option<HstoreValue>, HstoreError>
    where
        R: HstoreRecord + ?Sized,
    {
        let declaration = self.field(field)?;
        let raw = stored(record.hstore_was(self.attribute()), declaration);
        Ok(declaration.deserialize(raw))
    }

    /// Whether the stored string of a field differs from before unsaved changes
    pub fn changed<R>(&self, record: &R, field: &str) -> Result<bool, HstoreError>
    where
        R: HstoreRecord + ?Sized,
    {
        let declaration = self.field(field)?;
        let attribute = self.attribute();
        Ok(stored(record.hstore(attribute), declaration)
            != stored(record.hstore_was(attribute), declaration))
    }

    /// `(before, after)` for a changed field, `None` when unchanged
    #[allow(clippy::type_complexity)]
    pub fn change<R>(
        &self,
        record: &R,
        field: &str,
    ) -> Result<Option<(Option<HstoreValue>, Option<HstoreValue>)>, HstoreError>
    where
        R: HstoreRecord + ?Sized,
    {
        if !self.changed(record, field)? {
            return Ok(None);
        }
        Ok(Some((self.was(record, field)?, self.get(record, field)?)))
    }

    /// Fields whose stored strings differ from before unsaved changes
    pub fn changed_fields<R>(&self, record: &R) -> Vec<&str>
    where
        R: HstoreRecord + ?Sized,
    {
        let attribute = self.attribute();
        let current = record.hstore(attribute);
        let was = record.hstore_was(attribute);
        self.fields
            .iter()
            .filter(|declaration| stored(current, declaration) != stored(was, declaration))
            .map(FieldDeclaration::name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{hstore_accessor, FieldSpec};
    use crate::tracked::HstoreAttributes;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn product_fields() -> FieldTable {
        hstore_accessor(
            "options",
            [
                ("color", FieldSpec::new("string")),
                ("price", FieldSpec::new("integer").store_key("price_in_cents")),
                ("weight", FieldSpec::new("float")),
                ("popular", FieldSpec::new("boolean")),
                ("build_timestamp", FieldSpec::new("time")),
                ("released_at", FieldSpec::new("date")),
                ("tags", FieldSpec::new("array")),
                ("reviews", FieldSpec::new("hash")),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_unset_fields_read_as_none() {
        let fields = product_fields();
        let record = HstoreAttributes::new();
        for declaration in fields.metadata() {
            assert_eq!(fields.get(&record, declaration.name()).unwrap(), None);
        }
        assert!(!fields.is(&record, "popular").unwrap());
    }

    #[test]
    fn test_setters_store_canonical_strings() {
        let fields = product_fields();
        let mut record = HstoreAttributes::new();

        fields.set(&mut record, "color", "green").unwrap();
        fields.set(&mut record, "price", "1299").unwrap();
        fields.set(&mut record, "weight", 2.5).unwrap();
        fields.set(&mut record, "popular", "t").unwrap();
        fields
            .set(&mut record, "build_timestamp", "2024-01-15T10:00:00+02:00")
            .unwrap();
        fields.set(&mut record, "released_at", "2024-01-15").unwrap();
        fields.set(&mut record, "tags", vec!["new", "sale"]).unwrap();

        let mapping = record.hstore("options").unwrap();
        let raw = |key: &str| mapping.get(key).cloned().flatten();
        assert_eq!(raw("color").as_deref(), Some("green"));
        assert_eq!(raw("price_in_cents").as_deref(), Some("1299"));
        assert_eq!(raw("price"), None);
        assert_eq!(raw("weight").as_deref(), Some("2.5"));
        assert_eq!(raw("popular").as_deref(), Some("true"));
        assert_eq!(raw("build_timestamp").as_deref(), Some("1705305600"));
        assert_eq!(raw("released_at").as_deref(), Some("2024-01-15"));
        assert_eq!(raw("tags").as_deref(), Some("new||;||sale"));
    }

    #[test]
    fn test_getters_return_typed_values() {
        let fields = product_fields();
        let mut record = HstoreAttributes::new();

        fields.set(&mut record, "price", 1299).unwrap();
        fields.set(&mut record, "popular", true).unwrap();
        fields
            .set(&mut record, "build_timestamp", Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap())
            .unwrap();
        fields.set(&mut record, "released_at", "15 Jan 2024").unwrap();

        assert_eq!(fields.read::<i64, _>(&record, "price").unwrap(), Some(1299));
        assert!(fields.is(&record, "popular").unwrap());
        assert_eq!(
            fields.read::<NaiveDate, _>(&record, "released_at").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            fields
                .read::<chrono::DateTime<Utc>, _>(&record, "build_timestamp")
                .unwrap()
                .map(|t| t.timestamp()),
            Some(1705305600)
        );
        assert!(matches!(
            fields.read::<String, _>(&record, "price"),
            Err(HstoreError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_setting_none_stores_null() {
        let fields = product_fields();
        let mut record = HstoreAttributes::new();
        fields.set(&mut record, "color", "red").unwrap();
        fields.clear(&mut record, "color").unwrap();

        let mapping = record.hstore("options").unwrap();
        assert_eq!(mapping.get("color"), Some(&None));
        assert_eq!(fields.get(&record, "color").unwrap(), None);
    }

    #[test]
    fn test_setter_preserves_other_keys() {
        let fields = product_fields();
        let mut persisted = HstoreMap::new();
        persisted.insert("legacy".to_string(), Some("kept".to_string()));
        let mut record = HstoreAttributes::with_persisted("options", persisted);

        fields.set(&mut record, "color", "blue").unwrap();
        let mapping = record.hstore("options").unwrap();
        assert_eq!(mapping.get("legacy"), Some(&Some("kept".to_string())));
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn test_boolean_alias_rejects_other_types() {
        let fields = product_fields();
        let record = HstoreAttributes::new();
        assert!(matches!(
            fields.is(&record, "color"),
            Err(HstoreError::UnsupportedPredicate { .. })
        ));
    }

    #[test]
    fn test_change_tracking() {
        let fields = product_fields();
        let mut persisted = HstoreMap::new();
        persisted.insert("color".to_string(), Some("red".to_string()));
        let mut record = HstoreAttributes::with_persisted("options", persisted);

        assert!(!fields.changed(&record, "color").unwrap());
        fields.set(&mut record, "color", "blue").unwrap();
        fields.set(&mut record, "price", 10).unwrap();

        assert!(fields.changed(&record, "color").unwrap());
        assert_eq!(fields.was(&record, "color").unwrap(), Some(HstoreValue::from("red")));
        assert_eq!(
            fields.change(&record, "color").unwrap(),
            Some((Some(HstoreValue::from("red")), Some(HstoreValue::from("blue"))))
        );
        assert_eq!(fields.change(&record, "weight").unwrap(), None);
        assert_eq!(fields.changed_fields(&record), vec!["color", "price"]);
        assert!(record.is_changed("options"));

        record.changes_applied();
        assert!(fields.changed_fields(&record).is_empty());
    }

    #[test]
    fn test_unknown_field_errors() {
        let fields = product_fields();
        let mut record = HstoreAttributes::new();
        assert!(matches!(
            fields.set(&mut record, "missing", 1),
            Err(HstoreError::UnknownField { .. })
        ));
        assert_eq!(record.hstore("options"), None);
    }
}
