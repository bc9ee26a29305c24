//! Reward (family) handlers
//!
//! Every response carries a Grouped Reward re-derived from the live items
//! after the write, never a cached aggregate.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use shared::error::{AppError, ErrorCode};
use shared::models::{OfferCreate, RewardListQuery, RewardUpdate};
use shared::reward::grouping::group_items;
use shared::reward::{GroupedReward, PersistedStatus, RewardKind, RewardStatus, cpid, status};

use super::ApiResult;
use crate::auth::AdminIdentity;
use crate::auth::permissions::{REWARDS_MANAGE, REWARDS_VIEW};
use crate::db::rewards::{self as reward_db, ItemUpdate, NewRewardItem, RewardItemRow};
use crate::BoxError;
use crate::error::ServiceResult;
use crate::flags::Feature;
use crate::state::AppState;
use crate::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_inventory, validate_language,
    validate_optional_text, validate_percentage, validate_required_text, validate_value,
};

/// Availability of new items when none is given
pub(crate) const DEFAULT_AVAILABILITY: &str = "AVAILABLE";

/// Attempts at finding an unused random suffix
const CPID_ATTEMPTS: usize = 3;

/// Exact CPID addressed by a path segment. Malformed CPIDs match nothing.
pub(crate) fn lookup_exact(raw: &str) -> Result<String, AppError> {
    cpid::parse_exact(raw).map_err(|e| {
        tracing::debug!(cpid = raw, "Rejected lookup: {e}");
        AppError::reward_not_found(raw)
    })
}

/// Fold the live rows of one family; an empty family does not exist.
pub(crate) fn fold_family(
    exact_cpid: &str,
    rows: Vec<RewardItemRow>,
) -> Result<GroupedReward, AppError> {
    let items = rows.into_iter().map(RewardItemRow::into_item).collect();
    GroupedReward::from_items(exact_cpid, items)
        .ok_or_else(|| AppError::reward_not_found(exact_cpid))
}

/// Load and fold the live items of one family
pub(crate) async fn load_family(
    state: &AppState,
    exact_cpid: &str,
    client_id: Option<&str>,
) -> ServiceResult<GroupedReward> {
    let rows = reward_db::find_family(&state.pool, exact_cpid, client_id).await?;
    Ok(fold_family(exact_cpid, rows)?)
}

/// Insert `item`, drawing a fresh random suffix whenever its CPID is taken.
///
/// `insert` reports `false` on a CPID conflict. Gives up with
/// `CpidAlreadyExists` after [`CPID_ATTEMPTS`] tries.
async fn insert_with_fresh_suffix<I, Fut>(
    mut item: NewRewardItem,
    brand_name: &str,
    value: &str,
    mut insert: I,
) -> ServiceResult<NewRewardItem>
where
    I: FnMut(NewRewardItem) -> Fut,
    Fut: Future<Output = Result<bool, BoxError>>,
{
    for attempt in 1..=CPID_ATTEMPTS {
        if insert(item.clone()).await? {
            return Ok(item);
        }
        if attempt < CPID_ATTEMPTS {
            tracing::warn!(cpid = %item.cpid, attempt, "CPID collision, regenerating suffix");
            item.cpid = cpid::try_generate(brand_name, &item.language, value)?;
        }
    }
    Err(AppError::new(ErrorCode::CpidAlreadyExists)
        .with_detail("cpid", item.cpid)
        .into())
}

/// GET /api/rewards
pub async fn list_rewards(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Query(query): Query<RewardListQuery>,
) -> ApiResult<Vec<GroupedReward>> {
    identity.require(REWARDS_VIEW)?;
    validate_optional_text(&query.client_id, "client_id", MAX_SHORT_TEXT_LEN)?;

    let rows = reward_db::list_items(&state.pool, query.client_id.as_deref()).await?;
    let items = rows.into_iter().map(RewardItemRow::into_item).collect();
    Ok(Json(group_items(items)))
}

/// GET /api/rewards/{cpid}
pub async fn get_reward(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path(raw_cpid): Path<String>,
    Query(query): Query<RewardListQuery>,
) -> ApiResult<GroupedReward> {
    identity.require(REWARDS_VIEW)?;
    let exact = lookup_exact(&raw_cpid)?;
    let reward = load_family(&state, &exact, query.client_id.as_deref()).await?;
    Ok(Json(reward))
}

fn validate_create(req: &OfferCreate) -> Result<(), AppError> {
    validate_required_text(&req.brand_name, "brand_name", MAX_NAME_LEN)?;
    validate_language(&req.language, "language")?;
    validate_value(req.value, "value")?;
    validate_required_text(&req.source_name, "source_name", MAX_NAME_LEN)?;
    validate_percentage(req.rebate_percentage, "rebate_percentage")?;
    validate_inventory(req.inventory)?;
    validate_optional_text(&req.reward_availability, "reward_availability", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}

/// POST /api/rewards/offers
pub async fn create_offer(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Json(req): Json<OfferCreate>,
) -> ApiResult<GroupedReward> {
    identity.require(REWARDS_MANAGE)?;
    state.flags.ensure(Feature::OfferCreation)?;
    validate_create(&req)?;

    let new_status = req.status.unwrap_or(RewardStatus::Active);
    status::validate_transition(new_status, true)?;

    let language = cpid::language_segment(req.language.as_deref().unwrap_or_default());
    let value = req.value.to_string();
    let full = cpid::try_generate(&req.brand_name, &language, &value)?;
    let exact = cpid::truncate(&full);

    if !reward_db::find_family(&state.pool, &exact, None).await?.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::CpidAlreadyExists,
            format!("Reward {exact} already exists, add a source to it instead"),
        )
        .with_detail("cpid", exact)
        .into());
    }

    let mut candidate = NewRewardItem {
        id: shared::util::snowflake_id(),
        cpid: full,
        exact_cpid: exact.clone(),
        kind: RewardKind::Offer,
        brand_name: req.brand_name.trim().to_string(),
        language,
        value: req.value,
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
    status::apply_mapping(new_status, &mut candidate);

    let pool = state.pool.clone();
    let item = insert_with_fresh_suffix(candidate, &req.brand_name, &value, |item| {
        let pool = pool.clone();
        async move { reward_db::insert_item(&pool, &item).await }
    })
    .await?;

    tracing::info!(
        cpid = %item.cpid,
        status = %new_status,
        admin_id = %identity.admin_id,
        "Offer created"
    );

    let reward = load_family(&state, &exact, None).await?;
    Ok(Json(reward))
}

/// PUT /api/rewards/{cpid}
pub async fn update_reward(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path(raw_cpid): Path<String>,
    Json(req): Json<RewardUpdate>,
) -> ApiResult<GroupedReward> {
    identity.require(REWARDS_MANAGE)?;
    if let Some(rebate) = req.rebate_percentage {
        validate_percentage(rebate, "rebate_percentage")?;
    }
    validate_inventory(req.inventory)?;
    validate_optional_text(&req.reward_availability, "reward_availability", MAX_SHORT_TEXT_LEN)?;
    if let Some(new_status) = req.status {
        status::validate_transition(new_status, false)?;
    }

    let exact = lookup_exact(&raw_cpid)?;
    let family = load_family(&state, &exact, None).await?;

    let mut update = ItemUpdate {
        rebate_percentage: req.rebate_percentage,
        inventory: req.inventory,
        reward_availability: req.reward_availability,
        ..ItemUpdate::default()
    };
    if let Some(new_status) = req.status {
        status::apply_mapping(new_status, &mut update);
    }

    let ids: Vec<i64> = family.items.iter().map(|i| i.id).collect();
    let updated = reward_db::update_items(&state.pool, &ids, &update).await?;
    tracing::info!(
        cpid = %exact,
        updated,
        admin_id = %identity.admin_id,
        "Reward family updated"
    );

    let reward = load_family(&state, &exact, None).await?;
    Ok(Json(reward))
}
