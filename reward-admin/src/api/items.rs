//! Source item handlers (CPIDx rows inside one reward family)

use axum::extract::{Path, State};
use axum::{Extension, Json};
use shared::error::{AppError, ErrorCode};
use shared::models::{ItemStatusUpdate, SourceItemCreate};
use shared::reward::{GroupedReward, PersistedStatus, RewardStatus, cpid, status};

use super::ApiResult;
use super::rewards::{DEFAULT_AVAILABILITY, load_family, lookup_exact};
use crate::auth::AdminIdentity;
use crate::auth::permissions::REWARDS_MANAGE;
use crate::db::rewards::{self as reward_db, ItemUpdate, NewRewardItem};
use crate::flags::Feature;
use crate::state::AppState;
use crate::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_inventory, validate_optional_text,
    validate_percentage, validate_required_text,
};

fn item_not_found(exact_cpid: &str, item_id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::RewardItemNotFound,
        format!("Item {item_id} not found in {exact_cpid}"),
    )
    .with_detail("item_id", item_id)
}

fn ensure_member(family: &GroupedReward, item_id: i64) -> Result<(), AppError> {
    if family.items.iter().any(|i| i.id == item_id) {
        Ok(())
    } else {
        Err(item_not_found(&family.exact_cpid, item_id))
    }
}

/// CPIDx for the next source of a family.
///
/// `issued` holds every CPID ever written for the family, soft-deleted rows
/// included, so their letters are never handed out again.
pub(crate) fn next_source_cpid<S: AsRef<str>>(exact_cpid: &str, issued: &[S]) -> Result<String, AppError> {
    let letter = cpid::next_source_letter(issued).ok_or_else(|| {
        AppError::new(ErrorCode::SourceLettersExhausted).with_detail("cpid", exact_cpid)
    })?;
    Ok(cpid::with_source_suffix(exact_cpid, letter))
}

/// POST /api/rewards/{cpid}/items
pub async fn add_item(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path(raw_cpid): Path<String>,
    Json(req): Json<SourceItemCreate>,
) -> ApiResult<GroupedReward> {
    identity.require(REWARDS_MANAGE)?;
    state.flags.ensure(Feature::MultiSource)?;
    validate_required_text(&req.source_name, "source_name", MAX_NAME_LEN)?;
    validate_percentage(req.rebate_percentage, "rebate_percentage")?;
    validate_inventory(req.inventory)?;
    validate_optional_text(&req.reward_availability, "reward_availability", MAX_SHORT_TEXT_LEN)?;

    let new_status = req.status.unwrap_or(RewardStatus::Active);
    status::validate_transition(new_status, true)?;

    let exact = lookup_exact(&raw_cpid)?;
    let family = load_family(&state, &exact, None).await?;

    let issued = reward_db::family_cpids(&state.pool, &exact).await?;

    let mut item = NewRewardItem {
        id: shared::util::snowflake_id(),
        cpid: next_source_cpid(&exact, &issued)?,
        exact_cpid: exact.clone(),
        kind: family.kind,
        brand_name: family.brand_name,
        language: family.language,
        value: family.value,
        source_name: req.source_name.trim().to_string(),
        rebate_percentage: req.rebate_percentage,
        inventory: req.inventory,
        reward_availability: req
            .reward_availability
            .unwrap_or_else(|| DEFAULT_AVAILABILITY.to_string()),
        is_active: 0,
        is_deleted: 0,
        reward_status: PersistedStatus::Inactive,
    };
    status::apply_mapping(new_status, &mut item);

    if !reward_db::insert_item(&state.pool, &item).await? {
        return Err(AppError::new(ErrorCode::CpidAlreadyExists)
            .with_detail("cpid", item.cpid)
            .into());
    }

    tracing::info!(
        cpid = %item.cpid,
        source = %item.source_name,
        admin_id = %identity.admin_id,
        "Source item added"
    );

    let reward = load_family(&state, &exact, None).await?;
    Ok(Json(reward))
}

/// PUT /api/rewards/{cpid}/items/{item_id}/status
pub async fn update_item_status(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path((raw_cpid, item_id)): Path<(String, i64)>,
    Json(req): Json<ItemStatusUpdate>,
) -> ApiResult<GroupedReward> {
    identity.require(REWARDS_MANAGE)?;
    status::validate_transition(req.status, false)?;

    let exact = lookup_exact(&raw_cpid)?;
    let family = load_family(&state, &exact, None).await?;
    ensure_member(&family, item_id)?;

    let mut update = ItemUpdate::default();
    status::apply_mapping(req.status, &mut update);
    reward_db::update_items(&state.pool, &[item_id], &update).await?;

    tracing::info!(
        cpid = %exact,
        item_id,
        status = %req.status,
        admin_id = %identity.admin_id,
        "Item status changed"
    );

    let reward = load_family(&state, &exact, None).await?;
    Ok(Json(reward))
}

/// DELETE /api/rewards/{cpid}/items/{item_id}
///
/// Answers 404 once the last item of the family is gone.
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path((raw_cpid, item_id)): Path<(String, i64)>,
) -> ApiResult<GroupedReward> {
    identity.require(REWARDS_MANAGE)?;

    let exact = lookup_exact(&raw_cpid)?;
    let family = load_family(&state, &exact, None).await?;
    ensure_member(&family, item_id)?;

    if !reward_db::soft_delete_item(&state.pool, item_id).await? {
        return Err(item_not_found(&exact, item_id).into());
    }

    tracing::info!(
        cpid = %exact,
        item_id,
        admin_id = %identity.admin_id,
        "Item deleted"
    );

    let reward = load_family(&state, &exact, None).await?;
    Ok(Json(reward))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXACT: &str = "OC-ACMEHEALTH-EN-10";

    #[test]
    fn test_first_extra_source_is_a() {
        let issued = ["OC-ACMEHEALTH-EN-10-K3Q9ZB"];
        assert_eq!(next_source_cpid(EXACT, &issued).unwrap(), "OC-ACMEHEALTH-EN-10-A");
    }

    #[test]
    fn test_deleted_letters_stay_reserved() {
        // `-A` was soft-deleted but is still issued
        let issued = [
            "OC-ACMEHEALTH-EN-10-K3Q9ZB",
            "OC-ACMEHEALTH-EN-10-A",
            "OC-ACMEHEALTH-EN-10-B",
        ];
        assert_eq!(next_source_cpid(EXACT, &issued).unwrap(), "OC-ACMEHEALTH-EN-10-C");
    }

    #[test]
    fn test_letters_exhausted() {
        let issued: Vec<String> = ('A'..='Z')
            .map(|c| cpid::with_source_suffix(EXACT, c))
            .collect();
        let err = next_source_cpid(EXACT, &issued).unwrap_err();
        assert_eq!(err.code, ErrorCode::SourceLettersExhausted);
        assert_eq!(err.details.unwrap().get("cpid").unwrap(), EXACT);
    }
}
