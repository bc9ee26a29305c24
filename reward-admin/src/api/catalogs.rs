//! Client catalog handlers (registry linkage)

use axum::extract::{Path, State};
use axum::{Extension, Json};
use shared::error::{AppError, ErrorCode};
use shared::models::{AssignRequest, CatalogEntry, ReorderRequest};

use super::ApiResult;
use crate::auth::AdminIdentity;
use crate::auth::permissions::{CATALOGS_MANAGE, REWARDS_VIEW};
use crate::db::catalogs::{self as catalog_db, AssignOutcome, ReorderOutcome};
use crate::flags::Feature;
use crate::state::AppState;
use crate::validation::{
    MAX_SHORT_TEXT_LEN, validate_batch, validate_required_text, validate_sort_order,
};

fn entry_not_found(client_id: &str, item_id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::CatalogEntryNotFound,
        format!("Item {item_id} is not in catalog {client_id}"),
    )
    .with_detail("item_id", item_id)
}

/// GET /api/catalogs/{client_id}/rewards
pub async fn list_catalog(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path(client_id): Path<String>,
) -> ApiResult<Vec<CatalogEntry>> {
    identity.require(REWARDS_VIEW)?;
    validate_required_text(&client_id, "client_id", MAX_SHORT_TEXT_LEN)?;
    let entries = catalog_db::list_entries(&state.pool, &client_id).await?;
    Ok(Json(entries))
}

/// POST /api/catalogs/{client_id}/rewards
pub async fn assign_rewards(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path(client_id): Path<String>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<Vec<CatalogEntry>> {
    identity.require(CATALOGS_MANAGE)?;
    validate_required_text(&client_id, "client_id", MAX_SHORT_TEXT_LEN)?;
    validate_batch(&req.item_ids, "item_ids")?;

    let live = catalog_db::live_item_ids(&state.pool, &req.item_ids).await?;
    if let Some(missing) = req.item_ids.iter().find(|id| !live.contains(*id)) {
        return Err(AppError::with_message(
            ErrorCode::RewardItemNotFound,
            format!("Item {missing} not found"),
        )
        .with_detail("item_id", *missing)
        .into());
    }

    let inserted = match catalog_db::assign(&state.pool, &client_id, &req.item_ids).await? {
        AssignOutcome::Assigned(inserted) => inserted,
        AssignOutcome::OrderExhausted => {
            return Err(AppError::validation(format!(
                "Catalog {client_id} has no position left, reorder it first"
            ))
            .with_detail("field", "item_ids")
            .into());
        }
    };
    tracing::info!(
        client_id = %client_id,
        inserted,
        admin_id = %identity.admin_id,
        "Catalog entries assigned"
    );

    let entries = catalog_db::list_entries(&state.pool, &client_id).await?;
    Ok(Json(entries))
}

/// DELETE /api/catalogs/{client_id}/rewards/{item_id}
pub async fn remove_reward(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path((client_id, item_id)): Path<(String, i64)>,
) -> ApiResult<Vec<CatalogEntry>> {
    identity.require(CATALOGS_MANAGE)?;
    validate_required_text(&client_id, "client_id", MAX_SHORT_TEXT_LEN)?;

    if !catalog_db::remove(&state.pool, &client_id, item_id).await? {
        return Err(entry_not_found(&client_id, item_id).into());
    }
    tracing::info!(client_id = %client_id, item_id, "Catalog entry removed");

    let entries = catalog_db::list_entries(&state.pool, &client_id).await?;
    Ok(Json(entries))
}

/// PUT /api/catalogs/{client_id}/rewards/order
pub async fn reorder_catalog(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path(client_id): Path<String>,
    Json(req): Json<ReorderRequest>,
) -> ApiResult<Vec<CatalogEntry>> {
    identity.require(CATALOGS_MANAGE)?;
    state.flags.ensure(Feature::CatalogReordering)?;
    validate_required_text(&client_id, "client_id", MAX_SHORT_TEXT_LEN)?;
    let ids: Vec<i64> = req.items.iter().map(|i| i.item_id).collect();
    validate_batch(&ids, "items")?;
    for item in &req.items {
        validate_sort_order(item.sort_order, "sort_order")?;
    }

    match catalog_db::reorder(&state.pool, &client_id, &req.items).await? {
        ReorderOutcome::Applied => {
            tracing::info!(client_id = %client_id, count = ids.len(), "Catalog reordered");
        }
        ReorderOutcome::Missing(item_id) => {
            return Err(entry_not_found(&client_id, item_id).into());
        }
    }

    let entries = catalog_db::list_entries(&state.pool, &client_id).await?;
    Ok(Json(entries))
}
