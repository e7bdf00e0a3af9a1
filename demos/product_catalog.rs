//! Product catalog backed by a PostgreSQL hstore column
//!
//! Needs DATABASE_URL pointing at a database where the hstore extension can
//! be created.
//!
//! Run with: DATABASE_URL=postgres://... cargo run --example product_catalog

use hstore_accessor::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let database_url = std::env::var("DATABASE_URL")?;
    let pool = PgPool::connect(&database_url).await?;

    sqlx::query("CREATE EXTENSION IF NOT EXISTS hstore")
        .execute(&pool)
        .await?;
    sqlx::query("DROP TABLE IF EXISTS catalog_products")
        .execute(&pool)
        .await?;
    sqlx::query(
        "CREATE TABLE catalog_products (id BIGSERIAL PRIMARY KEY, name TEXT NOT NULL, options HSTORE)",
    )
    .execute(&pool)
    .await?;

    let mut accessor = HstoreAccessor::new().with_pool(pool.clone());
    accessor.health_check().await?;
    let fields = accessor.hstore_accessor(
        "Product",
        "options",
        [
            ("color", FieldSpec::new("string")),
            ("price", FieldSpec::new("integer").store_key("price_in_cents")),
            ("popular", FieldSpec::new("boolean")),
            ("tags", FieldSpec::new("array")),
        ],
    )?;
    let store = accessor.store::<i64>("Product", "options", "catalog_products", "id")?;

    let catalog = [
        ("Lamp", "green", 1299, true, vec!["home", "sale"]),
        ("Chair", "black", 4500, false, vec!["home"]),
        ("Mug", "white", 800, true, vec!["kitchen", "sale"]),
    ];

    for (name, color, price, popular, tags) in catalog {
        let id: i64 = sqlx::query_scalar("INSERT INTO catalog_products (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(&pool)
            .await?;

        let mut record = HstoreAttributes::new();
        fields.set(&mut record, "color", color)?;
        fields.set(&mut record, "price", price)?;
        fields.set(&mut record, "popular", popular)?;
        fields.set(&mut record, "tags", tags)?;
        store.save_changes(&id, &mut record).await?;
    }

    let on_sale = QueryBuilder::new()
        .where_hstore(fields.predicates("tags")?.contains("sale")?)
        .where_hstore(fields.predicates("price")?.gte(1000)?)
        .order_by_field(&fields, "price", SortOrder::Asc)?;
    for (id, mapping) in store.find(on_sale).await? {
        println!("on sale over $10: {} {:?}", id, mapping);
    }

    let popular = QueryBuilder::new().where_hstore(fields.scope("is_popular", None)?);
    println!("popular products: {}", store.count_where(popular).await?);

    if let Some((id, _)) = store.find_one(QueryBuilder::new().where_hstore(fields.predicates("color")?.with_value("black")?)).await? {
        if let Some(mut record) = store.load_record(&id).await? {
            fields.set(&mut record, "price", "39.99")?;
            println!("price change: {:?}", fields.change(&record, "price")?);
            store.save_changes(&id, &mut record).await?;
        }
    }

    sqlx::query("DROP TABLE catalog_products").execute(&pool).await?;
    Ok(())
}
