//! Client catalog (registry linkage) database operations

use shared::models::{CatalogEntry, SortOrderItem};
use shared::reward::status;
use sqlx::PgPool;

use super::BoxError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogEntryRow {
    pub id: i64,
    pub client_id: String,
    pub item_id: i64,
    pub cpid: String,
    pub exact_cpid: String,
    pub brand_name: String,
    pub is_active: i16,
    pub is_deleted: i16,
    pub reward_status: Option<String>,
    pub sort_order: i32,
    pub created_at: i64,
}

impl From<CatalogEntryRow> for CatalogEntry {
    fn from(row: CatalogEntryRow) -> Self {
        CatalogEntry {
            status: status::from_db_columns(
                row.is_active,
                row.reward_status.as_deref(),
                row.is_deleted,
            ),
            id: row.id,
            client_id: row.client_id,
            item_id: row.item_id,
            cpid: row.cpid,
            exact_cpid: row.exact_cpid,
            brand_name: row.brand_name,
            sort_order: row.sort_order,
            created_at: row.created_at,
        }
    }
}

/// Outcome of a reorder request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    Applied,
    /// Item not linked to the catalog; nothing was written
    Missing(i64),
}

/// Outcome of an assign request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    /// Number of new links
    Assigned(u64),
    /// No position left after the current last entry; nothing was written
    OrderExhausted,
}

/// Position of the entry appended after `last`
pub fn append_position(last: i32) -> Option<i32> {
    last.checked_add(1)
}

pub async fn list_entries(pool: &PgPool, client_id: &str) -> Result<Vec<CatalogEntry>, BoxError> {
    let rows: Vec<CatalogEntryRow> = sqlx::query_as(
        r#"
        SELECT cr.id, cr.client_id, cr.item_id, ri.cpid, ri.exact_cpid, ri.brand_name,
               ri.is_active, ri.is_deleted, ri.reward_status, cr.sort_order, cr.created_at
        FROM catalog_rewards cr
        JOIN reward_items ri ON ri.id = cr.item_id
        WHERE cr.client_id = $1 AND ri.is_deleted = 0
        ORDER BY cr.sort_order, cr.id
        "#,
    )
    .bind(client_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(CatalogEntry::from).collect())
}

/// Subset of `item_ids` that refer to live items
pub async fn live_item_ids(pool: &PgPool, item_ids: &[i64]) -> Result<Vec<i64>, BoxError> {
    let rows: Vec<(i64,)> =
        sqlx::query_as("SELECT id FROM reward_items WHERE id = ANY($1) AND is_deleted = 0")
            .bind(item_ids)
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Link items to a catalog after its current last entry.
/// Already linked items are skipped.
pub async fn assign(
    pool: &PgPool,
    client_id: &str,
    item_ids: &[i64],
) -> Result<AssignOutcome, BoxError> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let (mut last,): (i32,) = sqlx::query_as(
        "SELECT COALESCE(MAX(sort_order), -1) FROM catalog_rewards WHERE client_id = $1",
    )
    .bind(client_id)
    .fetch_one(&mut *tx)
    .await?;

    let mut inserted = 0;
    for &item_id in item_ids {
        let Some(position) = append_position(last) else {
            return Ok(AssignOutcome::OrderExhausted);
        };
        let result = sqlx::query(
            r#"
            INSERT INTO catalog_rewards (id, client_id, item_id, sort_order, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (client_id, item_id) DO NOTHING
            "#,
        )
        .bind(shared::util::snowflake_id())
        .bind(client_id)
        .bind(item_id)
        .bind(position)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 1 {
            last = position;
            inserted += 1;
        }
    }

    tx.commit().await?;
    Ok(AssignOutcome::Assigned(inserted))
}

/// Remove one linkage. Returns `false` when it did not exist.
pub async fn remove(pool: &PgPool, client_id: &str, item_id: i64) -> Result<bool, BoxError> {
    let result = sqlx::query("DELETE FROM catalog_rewards WHERE client_id = $1 AND item_id = $2")
        .bind(client_id)
        .bind(item_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Persist a new order atomically; any unknown item aborts the whole batch.
pub async fn reorder(
    pool: &PgPool,
    client_id: &str,
    items: &[SortOrderItem],
) -> Result<ReorderOutcome, BoxError> {
    let mut tx = pool.begin().await?;

    for item in items {
        let result = sqlx::query(
            "UPDATE catalog_rewards SET sort_order = $1 WHERE client_id = $2 AND item_id = $3",
        )
        .bind(item.sort_order)
        .bind(client_id)
        .bind(item.item_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(ReorderOutcome::Missing(item.item_id));
        }
    }

    tx.commit().await?;
    Ok(ReorderOutcome::Applied)
}
