//! Reward item database operations

use rust_decimal::Decimal;
use shared::reward::{
    PersistedStatus, RewardItem, RewardKind, StatusPatch, StatusTarget, cpid, status,
};
use sqlx::PgPool;

use super::BoxError;

/// Columns of a live item plus its registry linkage.
///
/// `$1` is an optional client id: linkage is looked up in that client's
/// catalog, or in any catalog when NULL.
const ITEM_SELECT: &str = r#"
    SELECT ri.id, ri.cpid, ri.exact_cpid, ri.kind, ri.brand_name, ri.language,
           ri.value, ri.source_name, ri.rebate_percentage, ri.inventory,
           ri.reward_availability, ri.is_active, ri.is_deleted, ri.reward_status,
           (SELECT MIN(cr.id) FROM catalog_rewards cr
             WHERE cr.item_id = ri.id AND ($1::TEXT IS NULL OR cr.client_id = $1)) AS registry_id,
           ri.created_at, ri.updated_at
    FROM reward_items ri
"#;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RewardItemRow {
    pub id: i64,
    pub cpid: String,
    pub exact_cpid: String,
    pub kind: String,
    pub brand_name: String,
    pub language: String,
    pub value: Decimal,
    pub source_name: String,
    pub rebate_percentage: Decimal,
    pub inventory: Option<i32>,
    pub reward_availability: String,
    pub is_active: i16,
    pub is_deleted: i16,
    pub reward_status: Option<String>,
    pub registry_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl RewardItemRow {
    pub fn into_item(self) -> RewardItem {
        let status =
            status::from_db_columns(self.is_active, self.reward_status.as_deref(), self.is_deleted);
        let kind = self.kind.parse().unwrap_or_else(|e| {
            tracing::warn!(item_id = self.id, "{e}, treating as offer");
            RewardKind::Offer
        });
        RewardItem {
            id: self.id,
            cpid: self.cpid,
            kind,
            brand_name: self.brand_name,
            language: self.language,
            value: self.value,
            source_name: self.source_name,
            rebate_percentage: self.rebate_percentage,
            inventory: self.inventory,
            reward_availability: self.reward_availability,
            status,
            registry_id: self.registry_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Insert payload; status columns are filled through [`StatusTarget`].
#[derive(Debug, Clone)]
pub struct NewRewardItem {
    pub id: i64,
    pub cpid: String,
    pub exact_cpid: String,
    pub kind: RewardKind,
    pub brand_name: String,
    pub language: String,
    pub value: Decimal,
    pub source_name: String,
    pub rebate_percentage: Decimal,
    pub inventory: Option<i32>,
    pub reward_availability: String,
    pub is_active: i16,
    pub is_deleted: i16,
    pub reward_status: PersistedStatus,
}

impl StatusTarget for NewRewardItem {
    fn set_is_deleted(&mut self, value: i16) {
        self.is_deleted = value;
    }

    fn set_is_active(&mut self, value: i16) {
        self.is_active = value;
    }

    fn set_reward_status(&mut self, value: PersistedStatus) {
        self.reward_status = value;
    }
}

/// Partial update of item columns; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ItemUpdate {
    pub rebate_percentage: Option<Decimal>,
    pub inventory: Option<i32>,
    pub reward_availability: Option<String>,
    pub status: StatusPatch,
}

impl StatusTarget for ItemUpdate {
    fn set_is_deleted(&mut self, value: i16) {
        self.status.set_is_deleted(value);
    }

    fn set_is_active(&mut self, value: i16) {
        self.status.set_is_active(value);
    }

    fn set_reward_status(&mut self, value: PersistedStatus) {
        self.status.set_reward_status(value);
    }
}

/// `LIKE` pattern matching `<exact>-...`
fn family_pattern(exact_cpid: &str) -> String {
    let mut pattern = String::with_capacity(exact_cpid.len() + 2);
    for c in exact_cpid.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push_str("-%");
    pattern
}

pub async fn list_items(
    pool: &PgPool,
    client_id: Option<&str>,
) -> Result<Vec<RewardItemRow>, BoxError> {
    let sql = format!("{ITEM_SELECT} WHERE ri.is_deleted = 0 ORDER BY ri.created_at, ri.id");
    let rows: Vec<RewardItemRow> = sqlx::query_as(&sql)
        .bind(client_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Live items of one family. `exact_cpid` must already be validated.
pub async fn find_family(
    pool: &PgPool,
    exact_cpid: &str,
    client_id: Option<&str>,
) -> Result<Vec<RewardItemRow>, BoxError> {
    let sql = format!(
        r#"{ITEM_SELECT}
        WHERE ri.is_deleted = 0 AND (ri.cpid = $2 OR ri.cpid LIKE $3 ESCAPE '\')
        ORDER BY ri.created_at, ri.id"#
    );
    let rows: Vec<RewardItemRow> = sqlx::query_as(&sql)
        .bind(client_id)
        .bind(exact_cpid)
        .bind(family_pattern(exact_cpid))
        .fetch_all(pool)
        .await?;
    Ok(rows
        .into_iter()
        .filter(|row| cpid::matches_family(&row.cpid, exact_cpid))
        .collect())
}

/// Every CPID ever issued in a family, soft-deleted rows included
pub async fn family_cpids(pool: &PgPool, exact_cpid: &str) -> Result<Vec<String>, BoxError> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"SELECT cpid FROM reward_items WHERE cpid = $1 OR cpid LIKE $2 ESCAPE '\'"#,
    )
    .bind(exact_cpid)
    .bind(family_pattern(exact_cpid))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(c,)| c).collect())
}

/// Insert an item. Returns `false` when the CPID is already taken.
pub async fn insert_item(pool: &PgPool, item: &NewRewardItem) -> Result<bool, BoxError> {
    let now = shared::util::now_millis();
    let result = sqlx::query(
        r#"
        INSERT INTO reward_items (
            id, cpid, exact_cpid, kind, brand_name, language, value, source_name,
            rebate_percentage, inventory, reward_availability,
            is_active, is_deleted, reward_status, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $15)
        ON CONFLICT (cpid) DO NOTHING
        "#,
    )
    .bind(item.id)
    .bind(&item.cpid)
    .bind(&item.exact_cpid)
    .bind(item.kind.as_str())
    .bind(&item.brand_name)
    .bind(&item.language)
    .bind(item.value)
    .bind(&item.source_name)
    .bind(item.rebate_percentage)
    .bind(item.inventory)
    .bind(&item.reward_availability)
    .bind(item.is_active)
    .bind(item.is_deleted)
    .bind(item.reward_status.as_str())
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Apply `update` to the given live items. Returns the number of rows changed.
pub async fn update_items(
    pool: &PgPool,
    item_ids: &[i64],
    update: &ItemUpdate,
) -> Result<u64, BoxError> {
    let now = shared::util::now_millis();
    let result = sqlx::query(
        r#"
        UPDATE reward_items SET
            rebate_percentage = COALESCE($1, rebate_percentage),
            inventory = COALESCE($2, inventory),
            reward_availability = COALESCE($3, reward_availability),
            is_deleted = COALESCE($4, is_deleted),
            is_active = COALESCE($5, is_active),
            reward_status = COALESCE($6, reward_status),
            updated_at = $7
        WHERE id = ANY($8) AND is_deleted = 0
        "#,
    )
    .bind(update.rebate_percentage)
    .bind(update.inventory)
    .bind(update.reward_availability.as_deref())
    .bind(update.status.is_deleted)
    .bind(update.status.is_active)
    .bind(update.status.reward_status.map(|s| s.as_str()))
    .bind(now)
    .bind(item_ids)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Soft-delete one item and drop its catalog linkage.
/// Returns `false` when the item was not live.
pub async fn soft_delete_item(pool: &PgPool, item_id: i64) -> Result<bool, BoxError> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "UPDATE reward_items SET is_deleted = 1, updated_at = $1 WHERE id = $2 AND is_deleted = 0",
    )
    .bind(now)
    .bind(item_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }

    sqlx::query("DELETE FROM catalog_rewards WHERE item_id = $1")
        .bind(item_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::reward::RewardStatus;

    fn row(is_active: i16, reward_status: Option<&str>) -> RewardItemRow {
        RewardItemRow {
            id: 1,
            cpid: "OC-ACMEHEALTH-EN-10-K3Q9ZB".into(),
            exact_cpid: "OC-ACMEHEALTH-EN-10".into(),
            kind: "offer".into(),
            brand_name: "Acme Health".into(),
            language: "EN".into(),
            value: Decimal::new(10, 0),
            source_name: "Tango".into(),
            rebate_percentage: Decimal::new(25, 1),
            inventory: Some(40),
            reward_availability: "AVAILABLE".into(),
            is_active,
            is_deleted: 0,
            reward_status: reward_status.map(str::to_string),
            registry_id: None,
            created_at: 1,
            updated_at: 2,
        }
    }

    #[test]
    fn test_family_pattern_escapes_wildcards() {
        assert_eq!(family_pattern("OC-ACMEHEALTH-EN-10"), "OC-ACMEHEALTH-EN-10-%");
        assert_eq!(family_pattern("GC-A_B%C-EN-5"), r"GC-A\_B\%C-EN-5-%");
    }

    #[test]
    fn test_row_status_mapping() {
        assert_eq!(row(1, Some("active")).into_item().status, RewardStatus::Active);
        assert_eq!(row(1, Some("suspended")).into_item().status, RewardStatus::Suspended);
        assert_eq!(row(1, Some("archived")).into_item().status, RewardStatus::Inactive);
        assert_eq!(row(1, None).into_item().status, RewardStatus::Inactive);
    }

    #[test]
    fn test_unknown_kind_falls_back_to_offer() {
        let mut r = row(1, Some("active"));
        r.kind = "voucher".into();
        assert_eq!(r.into_item().kind, RewardKind::Offer);
    }

    #[test]
    fn test_new_item_takes_status_mapping() {
        let mut item = NewRewardItem {
            id: 1,
            cpid: "OC-ACMEHEALTH-EN-10-K3Q9ZB".into(),
            exact_cpid: "OC-ACMEHEALTH-EN-10".into(),
            kind: RewardKind::Offer,
            brand_name: "Acme Health".into(),
            language: "EN".into(),
            value: Decimal::new(10, 0),
            source_name: "Tango".into(),
            rebate_percentage: Decimal::ZERO,
            inventory: None,
            reward_availability: "AVAILABLE".into(),
            is_active: 0,
            is_deleted: 0,
            reward_status: PersistedStatus::Inactive,
        };
        status::apply_mapping(RewardStatus::Active, &mut item);
        assert_eq!(item.is_active, 1);
        assert_eq!(item.reward_status, PersistedStatus::Active);
    }

    #[test]
    fn test_item_update_keeps_is_deleted_unset() {
        let mut update = ItemUpdate {
            inventory: Some(5),
            ..ItemUpdate::default()
        };
        status::apply_mapping(RewardStatus::Suspended, &mut update);
        assert_eq!(update.status.is_deleted, None);
        assert_eq!(update.status.is_active, Some(0));
        assert_eq!(update.status.reward_status, Some(PersistedStatus::Suspended));
        assert_eq!(update.inventory, Some(5));
    }
}
