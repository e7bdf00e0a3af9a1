use crate::errors::HstoreError;
use crate::field::FieldTable;
use crate::validation::{ValidatedFieldName, ValidatedTableName};
use crate::DbPool;
use sqlx::Postgres;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

/// Key column types a store can read and bind
pub trait HstoreId:
    for<'r> sqlx::Decode<'r, Postgres>
    + for<'q> sqlx::Encode<'q, Postgres>
    + sqlx::Type<Postgres>
    + Clone
    + Debug
    + Send
    + Sync
    + Unpin
    + 'static
{
}

impl<T> HstoreId for T where
    T: for<'r> sqlx::Decode<'r, Postgres>
        + for<'q> sqlx::Encode<'q, Postgres>
        + sqlx::Type<Postgres>
        + Clone
        + Debug
        + Send
        + Sync
        + Unpin
        + 'static
{
}

/// Database store for the hstore column described by a field table
#[derive(Clone)]
pub struct HstoreStore<I: HstoreId = i64> {
    pub(crate) db_pool: DbPool,
    pub(crate) table: ValidatedTableName,
    pub(crate) id_column: ValidatedFieldName,
    pub(crate) fields: Arc<FieldTable>,
    pub(crate) _phantom: PhantomData<I>,
}

impl<I: HstoreId> Debug for HstoreStore<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HstoreStore")
            .field("table", &self.table)
            .field("id_column", &self.id_column)
            .field("column", &self.fields.attribute())
            .finish()
    }
}

impl<I: HstoreId> HstoreStore<I> {
    pub fn new(
        db_pool: DbPool,
        table: &str,
        id_column: &str,
        fields: Arc<FieldTable>,
    ) -> Result<Self, HstoreError> {
        Ok(Self {
            db_pool,
            table: ValidatedTableName::new(table)?,
            id_column: ValidatedFieldName::new(id_column)?,
            fields,
            _phantom: PhantomData,
        })
    }

    pub fn table_name(&self) -> &str {
        self.table.as_str()
    }

    /// Name of the hstore column
    pub fn column(&self) -> &str {
        self.fields.attribute()
    }

    pub fn fields(&self) -> &FieldTable {
        &self.fields
    }

    pub fn pool(&self) -> &DbPool {
        &self.db_pool
    }
}
