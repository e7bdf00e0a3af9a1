//! Hstore predicates
//!
//! Translates comparisons on declared fields into SQL fragments over
//! `column -> 'store_key'`, with the compared value always bound as a
//! parameter. The same predicate can be evaluated against a loaded mapping.

use std::cmp::Ordering;

use serde_json::{Number, Value};
use type_mapping::{hstore_extract, hstore_extract_cast, DataType, HstoreValue, SEPARATOR};

use crate::errors::HstoreError;
use crate::field::{FieldDeclaration, FieldTable};
use crate::traits::record::HstoreMap;

/// Comparison a field exposes, named after the scope it generates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateKind {
    With,
    Lt,
    Lte,
    Eq,
    Gte,
    Gt,
    Before,
    After,
    Is,
    Not,
    Contains,
}

const NUMERIC_KINDS: &[PredicateKind] = &[
    PredicateKind::Lt,
    PredicateKind::Lte,
    PredicateKind::Eq,
    PredicateKind::Gte,
    PredicateKind::Gt,
];
const TEMPORAL_KINDS: &[PredicateKind] =
    &[PredicateKind::Before, PredicateKind::Eq, PredicateKind::After];

impl PredicateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredicateKind::With => "with",
            PredicateKind::Lt => "lt",
            PredicateKind::Lte => "lte",
            PredicateKind::Eq => "eq",
            PredicateKind::Gte => "gte",
            PredicateKind::Gt => "gt",
            PredicateKind::Before => "before",
            PredicateKind::After => "after",
            PredicateKind::Is => "is",
            PredicateKind::Not => "not",
            PredicateKind::Contains => "contains",
        }
    }

    /// Predicates generated for fields of a type, in scope order
    pub fn for_type(data_type: DataType) -> &'static [PredicateKind] {
        match data_type {
            DataType::String => &[PredicateKind::With],
            DataType::Integer | DataType::Float => NUMERIC_KINDS,
            DataType::Time | DataType::Date => TEMPORAL_KINDS,
            DataType::Boolean => &[PredicateKind::Is, PredicateKind::Not],
            DataType::Array => &[PredicateKind::Eq, PredicateKind::Contains],
            DataType::Hash => &[],
        }
    }

    pub fn available_for(&self, data_type: DataType) -> bool {
        Self::for_type(data_type).contains(self)
    }

    /// Scope name for a field, e.g. `with_color`, `age_gt`, `is_popular`
    pub fn scope_name(&self, field: &str) -> String {
        match self {
            PredicateKind::With | PredicateKind::Is | PredicateKind::Not => {
                format!("{}_{}", self.as_str(), field)
            }
            _ => format!("{}_{}", field, self.as_str()),
        }
    }

    fn operator(&self) -> &'static str {
        match self {
            PredicateKind::Lt | PredicateKind::Before => "<",
            PredicateKind::Lte => "<=",
            PredicateKind::Gte => ">=",
            PredicateKind::Gt | PredicateKind::After => ">",
            PredicateKind::With
            | PredicateKind::Eq
            | PredicateKind::Is
            | PredicateKind::Not
            | PredicateKind::Contains => "=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum PredicateTest {
    /// Extracted text compared as text
    Text { op: &'static str, value: String },
    /// Extracted text cast to bigint
    Integer { op: &'static str, value: i64 },
    /// Extracted text cast to double precision
    Float { op: &'static str, value: f64 },
    /// Extracted text equal to a fixed literal
    Literal(&'static str),
    /// Split array contains every element of the encoded needle
    Contains(String),
    /// The compared value did not cast; matches nothing
    Never,
}

/// SQL fragment testing one hstore field
#[derive(Debug, Clone, PartialEq)]
pub struct HstorePredicate {
    column: String,
    store_key: String,
    test: PredicateTest,
}

impl HstorePredicate {
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn store_key(&self) -> &str {
        &self.store_key
    }

    /// Render the fragment, pushing bound values and advancing the placeholder counter
    pub fn to_sql(&self, values: &mut Vec<Value>, param_counter: &mut i32) -> String {
        let mut bind = |value: Value| {
            values.push(value);
            let param = format!("${}", param_counter);
            *param_counter += 1;
            param
        };

        match &self.test {
            PredicateTest::Text { op, value } => {
                let param = bind(Value::String(value.clone()));
                format!("{} {} {}", hstore_extract(&self.column, &self.store_key), op, param)
            }
            PredicateTest::Integer { op, value } => {
                let param = bind(Value::Number(Number::from(*value)));
                format!(
                    "{} {} {}",
                    hstore_extract_cast(&self.column, &self.store_key, DataType::Integer),
                    op,
                    param
                )
            }
            PredicateTest::Float { op, value } => match Number::from_f64(*value) {
                Some(number) => {
                    let param = bind(Value::Number(number));
                    format!(
                        "{} {} {}",
                        hstore_extract_cast(&self.column, &self.store_key, DataType::Float),
                        op,
                        param
                    )
                }
                None => "1=0".to_string(),
            },
            PredicateTest::Literal(literal) => format!(
                "{} = '{}'",
                hstore_extract(&self.column, &self.store_key),
                literal
            ),
            PredicateTest::Contains(needle) => {
                let param = bind(Value::String(needle.clone()));
                format!(
                    "string_to_array({}, '{sep}') @> string_to_array({}, '{sep}')",
                    hstore_extract(&self.column, &self.store_key),
                    param,
                    sep = SEPARATOR
                )
            }
            PredicateTest::Never => "1=0".to_string(),
        }
    }

    /// Render the fragment on its own, numbering placeholders from `$1`
    pub fn build(&self) -> (String, Vec<Value>) {
        let mut values = Vec::new();
        let mut param_counter = 1;
        let sql = self.to_sql(&mut values, &mut param_counter);
        (sql, values)
    }

    /// Evaluate the predicate against a loaded mapping
    ///
    /// A missing key or hstore NULL never matches. Stored text that does not
    /// parse under a numeric cast is treated as no match here, whereas
    /// PostgreSQL rejects the whole query when the `::bigint` or
    /// `::double precision` cast fails. Text comparisons use byte order, which
    /// can differ from a database collation for non-ASCII text.
    pub fn matches(&self, mapping: &HstoreMap) -> bool {
        let stored = match mapping.get(&self.store_key) {
            Some(Some(stored)) => stored.as_str(),
            _ => return false,
        };

        match &self.test {
            PredicateTest::Text { op, value } => compare(op, stored.cmp(value.as_str())),
            PredicateTest::Integer { op, value } => stored
                .trim()
                .parse::<i64>()
                .map(|number| compare(op, number.cmp(value)))
                .unwrap_or(false),
            PredicateTest::Float { op, value } => stored
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(|number| number.partial_cmp(value))
                .map(|ordering| compare(op, ordering))
                .unwrap_or(false),
            PredicateTest::Literal(literal) => stored == *literal,
            PredicateTest::Contains(needle) => {
                let haystack = split_encoded(stored);
                split_encoded(needle)
                    .iter()
                    .all(|element| haystack.contains(element))
            }
            PredicateTest::Never => false,
        }
    }
}

fn compare(op: &str, ordering: Ordering) -> bool {
    match op {
        "<" => ordering == Ordering::Less,
        "<=" => ordering != Ordering::Greater,
        ">" => ordering == Ordering::Greater,
        ">=" => ordering != Ordering::Less,
        _ => ordering == Ordering::Equal,
    }
}

// Same split as string_to_array: no unescaping, empty text is an empty array
fn split_encoded(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(SEPARATOR).collect()
}

/// Predicate builders for one declared field
#[derive(Debug, Clone, Copy)]
pub struct FieldPredicates<'a> {
    table: &'a FieldTable,
    declaration: &'a FieldDeclaration,
}

impl<'a> FieldPredicates<'a> {
    pub(crate) fn new(table: &'a FieldTable, declaration: &'a FieldDeclaration) -> Self {
        Self { table, declaration }
    }

    pub fn declaration(&self) -> &FieldDeclaration {
        self.declaration
    }

    /// Build a predicate of the given kind
    ///
    /// The value goes through the field's type cast and serializer first, so
    /// the comparison sees the same text a setter would have stored.
    pub fn build(&self, kind: PredicateKind, value: Option<HstoreValue>) -> Result<HstorePredicate, HstoreError> {
        let data_type = self.declaration.data_type();
        if !kind.available_for(data_type) {
            return Err(HstoreError::UnsupportedPredicate {
                field: self.declaration.name().to_string(),
                data_type,
                predicate: kind.as_str(),
            });
        }

        let test = match kind {
            PredicateKind::Is => PredicateTest::Literal("true"),
            PredicateKind::Not => PredicateTest::Literal("false"),
            PredicateKind::Contains => self.contains_test(value),
            _ => self.comparison_test(kind.operator(), value),
        };

        #[cfg(feature = "debug-logging")]
        tracing::debug!(
            attribute = self.table.attribute(),
            field = self.declaration.name(),
            predicate = kind.as_str(),
            "built hstore predicate"
        );

        Ok(HstorePredicate {
            column: self.table.attribute().to_string(),
            store_key: self.declaration.store_key().to_string(),
            test,
        })
    }

    fn comparison_test(&self, op: &'static str, value: Option<HstoreValue>) -> PredicateTest {
        let data_type = self.declaration.data_type();
        let cast = value.and_then(|value| self.table.caster.cast(data_type, value));

        let test = match data_type {
            DataType::Integer => cast
                .and_then(|value| value.as_integer())
                .map(|value| PredicateTest::Integer { op, value }),
            DataType::Float => cast
                .and_then(|value| value.as_float())
                .map(|value| PredicateTest::Float { op, value }),
            DataType::Time => cast
                .and_then(|value| value.as_time())
                .map(|time| PredicateTest::Integer {
                    op,
                    value: time.timestamp(),
                }),
            _ => self
                .declaration
                .serialize(cast.as_ref())
                .map(|value| PredicateTest::Text { op, value }),
        };
        test.unwrap_or(PredicateTest::Never)
    }

    fn contains_test(&self, value: Option<HstoreValue>) -> PredicateTest {
        let items = match value {
            Some(HstoreValue::Array(items)) => items,
            Some(HstoreValue::String(item)) => vec![item],
            Some(other) => vec![other.to_string()],
            None => return PredicateTest::Never,
        };
        let needle = self
            .declaration
            .serialize(Some(&HstoreValue::Array(items)))
            .unwrap_or_default();
        PredicateTest::Contains(needle)
    }

    /// `with_<field>` on string fields
    pub fn with_value(&self, value: impl Into<HstoreValue>) -> Result<HstorePredicate, HstoreError> {
        self.build(PredicateKind::With, Some(value.into()))
    }

    pub fn lt(&self, value: impl Into<HstoreValue>) -> Result<HstorePredicate, HstoreError> {
        self.build(PredicateKind::Lt, Some(value.into()))
    }

    pub fn lte(&self, value: impl Into<HstoreValue>) -> Result<HstorePredicate, HstoreError> {
        self.build(PredicateKind::Lte, Some(value.into()))
    }

    pub fn eq(&self, value: impl Into<HstoreValue>) -> Result<HstorePredicate, HstoreError> {
        self.build(PredicateKind::Eq, Some(value.into()))
    }

    pub fn gte(&self, value: impl Into<HstoreValue>) -> Result<HstorePredicate, HstoreError> {
        self.build(PredicateKind::Gte, Some(value.into()))
    }

    pub fn gt(&self, value: impl Into<HstoreValue>) -> Result<HstorePredicate, HstoreError> {
        self.build(PredicateKind::Gt, Some(value.into()))
    }

    pub fn before(&self, value: impl Into<HstoreValue>) -> Result<HstorePredicate, HstoreError> {
        self.build(PredicateKind::Before, Some(value.into()))
    }

    pub fn after(&self, value: impl Into<HstoreValue>) -> Result<HstorePredicate, HstoreError> {
        self.build(PredicateKind::After, Some(value.into()))
    }

    /// `is_<field>` on boolean fields
    pub fn is_true(&self) -> Result<HstorePredicate, HstoreError> {
        self.build(PredicateKind::Is, None)
    }

    /// `not_<field>` on boolean fields
    pub fn is_false(&self) -> Result<HstorePredicate, HstoreError> {
        self.build(PredicateKind::Not, None)
    }

    /// `<field>_contains` on array fields, for one element or several
    pub fn contains(&self, value: impl Into<HstoreValue>) -> Result<HstorePredicate, HstoreError> {
        self.build(PredicateKind::Contains, Some(value.into()))
    }
}

impl FieldTable {
    /// Predicate builders for a declared field
    pub fn predicates(&self, field: &str) -> Result<FieldPredicates<'_>, HstoreError> {
        let declaration = self.field(field)?;
        Ok(FieldPredicates::new(self, declaration))
    }

    /// Every scope name generated for the declared fields
    pub fn scope_names(&self) -> Vec<String> {
        self.fields
            .iter()
            .flat_map(|declaration| {
                PredicateKind::for_type(declaration.data_type())
                    .iter()
                    .map(move |kind| kind.scope_name(declaration.name()))
            })
            .collect()
    }

    /// Build a predicate from its scope name, e.g. `("age_gt", Some(7.into()))`
    pub fn scope(&self, name: &str, value: Option<HstoreValue>) -> Result<HstorePredicate, HstoreError> {
        for declaration in &self.fields {
            for kind in PredicateKind::for_type(declaration.data_type()) {
                if kind.scope_name(declaration.name()) == name {
                    return FieldPredicates::new(self, declaration).build(*kind, value);
                }
            }
        }
        Err(HstoreError::UnknownScope(name.to_string()))
    }

    /// Expression ordering rows by a field's value
    pub fn sort_expression(&self, field: &str) -> Result<String, HstoreError> {
        let declaration = self.field(field)?;
        Ok(hstore_extract_cast(
            self.attribute(),
            declaration.store_key(),
            declaration.data_type(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{hstore_accessor, FieldSpec};
    use chrono::{TimeZone, Utc};

    fn fields() -> FieldTable {
        hstore_accessor(
            "options",
            [
                ("color", FieldSpec::new("string")),
                ("age", FieldSpec::new("integer")),
                ("price", FieldSpec::new("float").store_key("price_usd")),
                ("popular", FieldSpec::new("boolean")),
                ("built_at", FieldSpec::new("time")),
                ("released_on", FieldSpec::new("date")),
                ("tags", FieldSpec::new("array")),
                ("reviews", FieldSpec::new("hash")),
            ],
        )
        .unwrap()
    }

    fn mapping(pairs: &[(&str, &str)]) -> HstoreMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Some(v.to_string())))
            .collect()
    }

    #[test]
    fn test_integer_predicate_casts_column() {
        let table = fields();
        let predicate = table.predicates("age").unwrap().gt(7).unwrap();
        let (sql, values) = predicate.build();

        assert_eq!(sql, "(options -> 'age')::bigint > $1");
        assert_eq!(values, vec![Value::from(7)]);

        assert!(predicate.matches(&mapping(&[("age", "10")])));
        assert!(!predicate.matches(&mapping(&[("age", "5")])));
    }

    #[test]
    fn test_numeric_comparison_is_not_textual() {
        let table = fields();
        let predicate = table.predicates("age").unwrap().lt("9").unwrap();
        // "10" < "9" as text, but not as a number
        assert!(!predicate.matches(&mapping(&[("age", "10")])));
        assert!(predicate.matches(&mapping(&[("age", "8")])));
    }

    #[test]
    fn test_float_predicate_uses_store_key() {
        let table = fields();
        let predicate = table.predicates("price").unwrap().lte(2.5).unwrap();
        let (sql, values) = predicate.build();

        assert_eq!(sql, "(options -> 'price_usd')::double precision <= $1");
        assert_eq!(values, vec![Value::from(2.5)]);
        assert!(predicate.matches(&mapping(&[("price_usd", "2.5")])));
        assert!(!predicate.matches(&mapping(&[("price", "1.0")])));
    }

    #[test]
    fn test_time_predicate_binds_epoch_seconds() {
        let table = fields();
        let moment = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
        let predicate = table.predicates("built_at").unwrap().before(moment).unwrap();
        let (sql, values) = predicate.build();

        assert_eq!(sql, "(options -> 'built_at')::bigint < $1");
        assert_eq!(values, vec![Value::from(1705305600_i64)]);
        assert!(predicate.matches(&mapping(&[("built_at", "1705300000")])));
        assert!(!predicate.matches(&mapping(&[("built_at", "1705305600")])));
    }

    #[test]
    fn test_date_predicate_compares_iso_text() {
        let table = fields();
        let predicate = table
            .predicates("released_on")
            .unwrap()
            .after("15/01/2024")
            .unwrap();
        let (sql, values) = predicate.build();

        assert_eq!(sql, "options -> 'released_on' > $1");
        assert_eq!(values, vec![Value::from("2024-01-15")]);
        assert!(predicate.matches(&mapping(&[("released_on", "2024-02-01")])));
        assert!(!predicate.matches(&mapping(&[("released_on", "2023-12-31")])));
    }

    #[test]
    fn test_string_and_boolean_predicates() {
        let table = fields();
        let with_color = table.predicates("color").unwrap().with_value("red").unwrap();
        assert_eq!(
            with_color.build(),
            ("options -> 'color' = $1".to_string(), vec![Value::from("red")])
        );

        let popular = table.predicates("popular").unwrap();
        let (sql, values) = popular.is_true().unwrap().build();
        assert_eq!(sql, "options -> 'popular' = 'true'");
        assert!(values.is_empty());
        assert_eq!(popular.is_false().unwrap().build().0, "options -> 'popular' = 'false'");

        assert!(popular.is_true().unwrap().matches(&mapping(&[("popular", "true")])));
        assert!(!popular.is_false().unwrap().matches(&mapping(&[("popular", "true")])));
    }

    #[test]
    fn test_array_contains() {
        let table = fields();
        let tags = table.predicates("tags").unwrap();
        let stored = mapping(&[("tags", "a||;||b||;||c")]);

        let has_b = tags.contains("b").unwrap();
        let (sql, values) = has_b.build();
        assert_eq!(
            sql,
            "string_to_array(options -> 'tags', '||;||') @> string_to_array($1, '||;||')"
        );
        assert_eq!(values, vec![Value::from("b")]);
        assert!(has_b.matches(&stored));
        assert!(!tags.contains("z").unwrap().matches(&stored));
        assert!(tags.contains(vec!["a", "c"]).unwrap().matches(&stored));
        assert!(!tags.contains(vec!["a", "z"]).unwrap().matches(&stored));
    }

    #[test]
    fn test_array_eq_compares_encoded_text() {
        let table = fields();
        let predicate = table.predicates("tags").unwrap().eq(vec!["a", "b"]).unwrap();
        assert_eq!(predicate.build().1, vec![Value::from("a||;||b")]);
        assert!(predicate.matches(&mapping(&[("tags", "a||;||b")])));
        assert!(!predicate.matches(&mapping(&[("tags", "b||;||a")])));
    }

    #[test]
    fn test_uncastable_value_matches_nothing() {
        let table = fields();
        let predicate = table.predicates("age").unwrap().gt("").unwrap();
        assert_eq!(predicate.build(), ("1=0".to_string(), Vec::new()));
        assert!(!predicate.matches(&mapping(&[("age", "10")])));
    }

    #[test]
    fn test_missing_and_null_values_never_match() {
        let table = fields();
        let predicate = table.predicates("color").unwrap().with_value("red").unwrap();
        let mut nulled = HstoreMap::new();
        nulled.insert("color".to_string(), None);

        assert!(!predicate.matches(&HstoreMap::new()));
        assert!(!predicate.matches(&nulled));
    }

    #[test]
    fn test_unsupported_predicates() {
        let table = fields();
        assert!(matches!(
            table.predicates("color").unwrap().gt(1),
            Err(HstoreError::UnsupportedPredicate { predicate: "gt", .. })
        ));
        assert!(matches!(
            table.predicates("reviews").unwrap().eq("x"),
            Err(HstoreError::UnsupportedPredicate { .. })
        ));
        assert!(matches!(
            table.predicates("age").unwrap().before(1),
            Err(HstoreError::UnsupportedPredicate { .. })
        ));
    }

    #[test]
    fn test_scope_names_and_lookup() {
        let table = fields();
        let names = table.scope_names();
        for expected in [
            "with_color",
            "age_lt",
            "age_gte",
            "price_gt",
            "is_popular",
            "not_popular",
            "built_at_before",
            "released_on_after",
            "tags_eq",
            "tags_contains",
        ] {
            assert!(names.contains(&expected.to_string()), "missing {}", expected);
        }
        assert!(!names.iter().any(|name| name.contains("reviews")));

        let scoped = table.scope("age_gt", Some(HstoreValue::from(7))).unwrap();
        assert_eq!(scoped, table.predicates("age").unwrap().gt(7).unwrap());
        assert!(matches!(
            table.scope("age_between", None),
            Err(HstoreError::UnknownScope(_))
        ));
    }

    #[test]
    fn test_sort_expression_uses_cast() {
        let table = fields();
        assert_eq!(table.sort_expression("age").unwrap(), "(options -> 'age')::bigint");
        assert_eq!(table.sort_expression("color").unwrap(), "options -> 'color'");
    }

    #[test]
    fn test_placeholders_continue_from_counter() {
        let table = fields();
        let predicate = table.predicates("age").unwrap().eq(3).unwrap();
        let mut values = vec![Value::from("earlier")];
        let mut counter = 2;
        let sql = predicate.to_sql(&mut values, &mut counter);

        assert_eq!(sql, "(options -> 'age')::bigint = $2");
        assert_eq!(counter, 3);
        assert_eq!(values.len(), 2);
    }
}
