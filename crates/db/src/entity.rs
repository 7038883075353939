//! Queries shared by every table with a numeric surrogate key.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, QueryBuilder, Sqlite, SqlitePool, sqlite::SqliteRow};
use ts_rs::TS;

use crate::pagination::{Page, PageRequest};

/// A row type stored in its own table under an `INTEGER PRIMARY KEY`.
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {
    /// Name used in alert headers and error payloads, e.g. `"job"`.
    const NAME: &'static str;
    const TABLE: &'static str;
    /// Column list selected for this entity, in struct order.
    const COLUMNS: &'static str;
    /// JSON property to column mapping accepted by `sort=`.
    const SORTABLE: &'static [(&'static str, &'static str)];

    /// Surrogate key; `0` means not yet persisted.
    fn id(&self) -> i64;
}

/// Reference to another entity by key, as sent in request payloads: `{"id": 3}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct EntityRef {
    pub id: i64,
}

/// Identity equality: only persisted entities with the same key are equal.
pub fn same_identity(a: i64, b: i64) -> bool {
    a != 0 && b != 0 && a == b
}

pub async fn find_by_id<T: Entity>(pool: &SqlitePool, id: i64) -> Result<Option<T>, sqlx::Error> {
    let sql = format!("SELECT {} FROM {} WHERE id = $1", T::COLUMNS, T::TABLE);
    sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(pool).await
}

pub async fn find_by_ids<T: Entity>(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<T>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {} FROM {} WHERE id IN (", T::COLUMNS, T::TABLE));
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY id");
    builder.build_query_as::<T>().fetch_all(pool).await
}

pub async fn exists<'e, E, T>(executor: E, id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
    T: Entity,
{
    let sql = format!("SELECT COUNT(*) FROM {} WHERE id = $1", T::TABLE);
    let count: i64 = sqlx::query_scalar(&sql).bind(id).fetch_one(executor).await?;
    Ok(count > 0)
}

pub async fn count<T: Entity>(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM {}", T::TABLE);
    sqlx::query_scalar(&sql).fetch_one(pool).await
}

pub async fn find_page<T: Entity>(
    pool: &SqlitePool,
    request: &PageRequest,
) -> Result<Page<T>, sqlx::Error> {
    let total_elements = count::<T>(pool).await?;
    // order_by_clause only emits whitelisted column names
    let sql = format!(
        "SELECT {} FROM {} ORDER BY {} LIMIT $1 OFFSET $2",
        T::COLUMNS,
        T::TABLE,
        request.order_by_clause()
    );
    let content = sqlx::query_as::<_, T>(&sql)
        .bind(i64::from(request.size))
        .bind(request.offset())
        .fetch_all(pool)
        .await?;
    Ok(Page {
        content,
        total_elements,
        page: request.page,
        size: request.size,
    })
}

pub async fn delete<'e, E, T>(executor: E, id: i64) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
    T: Entity,
{
    let sql = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
    let result = sqlx::query(&sql).bind(id).execute(executor).await?;
    Ok(result.rows_affected())
}

/// Load the given keys into a map, ignoring duplicates and keys with no row.
pub async fn find_map_by_ids<T: Entity>(
    pool: &SqlitePool,
    ids: &[i64],
) -> Result<HashMap<i64, T>, sqlx::Error> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    Ok(find_by_ids::<T>(pool, &ids)
        .await?
        .into_iter()
        .map(|e| (e.id(), e))
        .collect())
}

/// Payload identity: `0` and a missing id both mean "not persisted yet".
pub fn payload_identity(id: Option<i64>) -> Option<i64> {
    id.filter(|id| *id != 0)
}
