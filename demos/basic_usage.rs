//! Declaring typed hstore fields and building queries without a database
//!
//! Run with: cargo run --example basic_usage

use hstore_accessor::prelude::*;

fn main() -> anyhow::Result<()> {
    let mut accessor = HstoreAccessor::new();
    let fields = accessor.hstore_accessor(
        "Product",
        "options",
        [
            ("color", FieldSpec::new("string")),
            ("price", FieldSpec::new("integer").store_key("price_in_cents")),
            ("weight", FieldSpec::new("float")),
            ("popular", FieldSpec::new("boolean")),
            ("released_on", FieldSpec::new("date")),
            ("tags", FieldSpec::new("array")),
            ("specs", FieldSpec::new("hash")),
        ],
    )?;

    let mut record = HstoreAttributes::new();
    fields.set(&mut record, "color", "green")?;
    fields.set(&mut record, "price", "1299")?;
    fields.set(&mut record, "weight", 2.5)?;
    fields.set(&mut record, "popular", "1")?;
    fields.set(&mut record, "released_on", "15/01/2024")?;
    fields.set(&mut record, "tags", vec!["new", "sale"])?;

    println!("stored mapping: {:?}", record.hstore("options"));
    println!("price: {:?}", fields.read::<i64, _>(&record, "price")?);
    println!("popular? {}", fields.is(&record, "popular")?);
    println!("released_on: {:?}", fields.get(&record, "released_on")?);
    println!("changed fields: {:?}", fields.changed_fields(&record));

    record.changes_applied();
    fields.set(&mut record, "price", 999)?;
    println!("price change: {:?}", fields.change(&record, "price")?);

    println!("scopes: {:?}", fields.scope_names());

    let query = QueryBuilder::new()
        .where_hstore(fields.predicates("price")?.gt(1000)?)
        .where_hstore(fields.predicates("tags")?.contains("sale")?)
        .where_hstore(fields.scope("is_popular", None)?)
        .order_by_field(&fields, "weight", SortOrder::Desc)?
        .limit(10);

    let (where_clause, order_clause, limit_clause, params) = query.build();
    println!("{} {} {}", where_clause, order_clause, limit_clause);
    println!("params: {:?}", params);
    println!("matches current record: {}", query.matches(record.hstore("options").unwrap_or(&HstoreMap::new())));

    Ok(())
}
