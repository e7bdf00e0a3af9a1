//! Field declarations
//!
//! A `FieldTable` is the static registration of every typed field stored in
//! one hstore column. It replaces per-field generated methods: getters,
//! setters and predicate builders are generic functions that look fields up
//! in the table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use type_mapping::{
    deserialize, serialize, DataType, Deserializer, HstoreValue, Serializer, StandardTypeCast,
    TypeCast,
};

use crate::errors::HstoreError;
use crate::validation::ValidatedFieldName;

/// Declaration input for one field: a type name plus optional settings
#[derive(Clone)]
pub struct FieldSpec {
    data_type: String,
    store_key: Option<String>,
    serializer: Option<Serializer>,
    deserializer: Option<Deserializer>,
}

impl FieldSpec {
    pub fn new(data_type: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            store_key: None,
            serializer: None,
            deserializer: None,
        }
    }

    /// Store the field under a different hstore key than its name
    pub fn store_key(mut self, store_key: impl Into<String>) -> Self {
        self.store_key = Some(store_key.into());
        self
    }

    /// Replace the default serialization rule for this field
    pub fn serializer<F>(mut self, serializer: F) -> Self
    where
        F: Fn(&HstoreValue) -> String + Send + Sync + 'static,
    {
        self.serializer = Some(Arc::new(serializer));
        self
    }

    /// Replace the default deserialization rule for this field
    pub fn deserializer<F>(mut self, deserializer: F) -> Self
    where
        F: Fn(&str) -> Option<HstoreValue> + Send + Sync + 'static,
    {
        self.deserializer = Some(Arc::new(deserializer));
        self
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("data_type", &self.data_type)
            .field("store_key", &self.store_key)
            .field("has_serializer", &self.serializer.is_some())
            .field("has_deserializer", &self.deserializer.is_some())
            .finish()
    }
}

impl From<&str> for FieldSpec {
    fn from(data_type: &str) -> Self {
        FieldSpec::new(data_type)
    }
}

impl From<String> for FieldSpec {
    fn from(data_type: String) -> Self {
        FieldSpec::new(data_type)
    }
}

impl From<DataType> for FieldSpec {
    fn from(data_type: DataType) -> Self {
        FieldSpec::new(data_type.as_str())
    }
}

/// One declared field, immutable once registered
#[derive(Clone)]
pub struct FieldDeclaration {
    name: String,
    data_type: DataType,
    store_key: String,
    serializer: Option<Serializer>,
    deserializer: Option<Deserializer>,
}

impl FieldDeclaration {
    fn from_spec(name: String, spec: FieldSpec) -> Result<Self, HstoreError> {
        let data_type = spec.data_type.parse::<DataType>()?;
        let store_key = spec.store_key.unwrap_or_else(|| name.clone());
        Ok(Self {
            name,
            data_type,
            store_key,
            serializer: spec.serializer,
            deserializer: spec.deserializer,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn store_key(&self) -> &str {
        &self.store_key
    }

    pub fn has_custom_serializer(&self) -> bool {
        self.serializer.is_some()
    }

    pub fn has_custom_deserializer(&self) -> bool {
        self.deserializer.is_some()
    }

    /// Stored string for an already cast value
    pub fn serialize(&self, value: Option<&HstoreValue>) -> Option<String> {
        serialize(self.data_type, value, self.serializer.as_ref())
    }

    /// Typed value for a stored string
    pub fn deserialize(&self, value: Option<&str>) -> Option<HstoreValue> {
        deserialize(self.data_type, value, self.deserializer.as_ref())
    }
}

impl fmt::Debug for FieldDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDeclaration")
            .field("name", &self.name)
            .field("data_type", &self.data_type)
            .field("store_key", &self.store_key)
            .field("has_serializer", &self.serializer.is_some())
            .field("has_deserializer", &self.deserializer.is_some())
            .finish()
    }
}

/// Every field declared on one hstore attribute
#[derive(Clone)]
pub struct FieldTable {
    pub(crate) attribute: ValidatedFieldName,
    pub(crate) fields: Vec<FieldDeclaration>,
    index: HashMap<String, usize>,
    pub(crate) caster: Arc<dyn TypeCast>,
}

impl FieldTable {
    /// Declare the fields of an hstore attribute
    ///
    /// Every spec is checked before anything is registered, so an invalid type
    /// anywhere in `fields` yields an error and no table.
    pub fn declare<I, K, S>(attribute: &str, fields: I) -> Result<Self, HstoreError>
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<FieldSpec>,
    {
        let attribute = ValidatedFieldName::new(attribute)?;
        let mut declarations = Vec::new();
        let mut index = HashMap::new();

        for (name, spec) in fields {
            let name = name.into();
            if index.contains_key(&name) {
                return Err(HstoreError::DuplicateField {
                    attribute: attribute.to_string(),
                    field: name,
                });
            }
            let declaration = FieldDeclaration::from_spec(name.clone(), spec.into())?;
            index.insert(name, declarations.len());
            declarations.push(declaration);
        }

        #[cfg(feature = "debug-logging")]
        tracing::debug!(
            attribute = attribute.as_str(),
            fields = declarations.len(),
            "declared hstore fields"
        );

        Ok(Self {
            attribute,
            fields: declarations,
            index,
            caster: Arc::new(StandardTypeCast::default()),
        })
    }

    /// Use a different coercion implementation for setters and predicates
    pub fn with_type_cast(mut self, caster: Arc<dyn TypeCast>) -> Self {
        self.caster = caster;
        self
    }

    /// Name of the hstore column these fields live in
    pub fn attribute(&self) -> &str {
        self.attribute.as_str()
    }

    /// All declarations, in declaration order
    pub fn metadata(&self) -> &[FieldDeclaration] {
        &self.fields
    }

    pub fn contains(&self, field: &str) -> bool {
        self.index.contains_key(field)
    }

    /// Look up a declared field by its logical name
    pub fn field(&self, field: &str) -> Result<&FieldDeclaration, HstoreError> {
        self.index
            .get(field)
            .map(|&position| &self.fields[position])
            .ok_or_else(|| HstoreError::unknown_field(self.attribute(), field))
    }

    /// Coerce a raw value into the declared type of `field`
    pub fn type_cast(&self, field: &str, value: Option<HstoreValue>) -> Result<Option<HstoreValue>, HstoreError> {
        let declaration = self.field(field)?;
        Ok(value.and_then(|value| self.caster.cast(declaration.data_type(), value)))
    }
}

impl fmt::Debug for FieldTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldTable")
            .field("attribute", &self.attribute)
            .field("fields", &self.fields)
            .field("caster", &self.caster)
            .finish()
    }
}

/// Declare typed fields on an hstore attribute
pub fn hstore_accessor<I, K, S>(attribute: &str, fields: I) -> Result<FieldTable, HstoreError>
where
    I: IntoIterator<Item = (K, S)>,
    K: Into<String>,
    S: Into<FieldSpec>,
{
    FieldTable::declare(attribute, fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_defaults_store_key_to_name() {
        let table = hstore_accessor("options", [("color", "string"), ("age", "integer")]).unwrap();
        assert_eq!(table.attribute(), "options");
        assert_eq!(table.metadata().len(), 2);

        let age = table.field("age").unwrap();
        assert_eq!(age.data_type(), DataType::Integer);
        assert_eq!(age.store_key(), "age");
    }

    #[test]
    fn test_declare_with_options() {
        let table = hstore_accessor(
            "options",
            [(
                "popular",
                FieldSpec::new("boolean")
                    .store_key("p")
                    .serializer(|value| value.to_string()),
            )],
        )
        .unwrap();

        let popular = table.field("popular").unwrap();
        assert_eq!(popular.store_key(), "p");
        assert!(popular.has_custom_serializer());
        assert!(!popular.has_custom_deserializer());
    }

    #[test]
    fn test_invalid_type_registers_nothing() {
        let result = hstore_accessor(
            "options",
            [("color", "string"), ("kind", "symbol"), ("age", "integer")],
        );
        match result {
            Err(HstoreError::InvalidDataType(err)) => assert_eq!(err.0, "symbol"),
            other => panic!("expected InvalidDataType, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_and_unknown_fields() {
        let duplicate = hstore_accessor("options", [("color", "string"), ("color", "integer")]);
        assert!(matches!(duplicate, Err(HstoreError::DuplicateField { .. })));

        let table = hstore_accessor("options", [("color", "string")]).unwrap();
        assert!(matches!(
            table.field("size"),
            Err(HstoreError::UnknownField { .. })
        ));
        assert!(!table.contains("size"));
    }

    #[test]
    fn test_attribute_must_be_identifier() {
        let result = hstore_accessor("options; drop table", [("color", "string")]);
        assert!(matches!(result, Err(HstoreError::InvalidIdentifier(_))));
    }

    #[test]
    fn test_type_cast_uses_declared_type() {
        let table = hstore_accessor("options", [("age", DataType::Integer)]).unwrap();
        assert_eq!(
            table.type_cast("age", Some(HstoreValue::from("31 years"))).unwrap(),
            Some(HstoreValue::Integer(31))
        );
    }
}
