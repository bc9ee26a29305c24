//! CPID preview for the create-offer wizard

use axum::extract::State;
use axum::{Extension, Json};
use shared::models::{CpidPreview, CpidPreviewRequest};
use shared::reward::cpid;

use super::ApiResult;
use crate::auth::AdminIdentity;
use crate::auth::permissions::REWARDS_MANAGE;
use crate::flags::Feature;
use crate::state::AppState;
use crate::validation::{MAX_NAME_LEN, validate_language, validate_required_text};

/// POST /api/cpid/preview
pub async fn preview(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Json(req): Json<CpidPreviewRequest>,
) -> ApiResult<CpidPreview> {
    identity.require(REWARDS_MANAGE)?;
    state.flags.ensure(Feature::OfferCreation)?;
    validate_required_text(&req.brand_name, "brand_name", MAX_NAME_LEN)?;
    validate_language(&req.language, "language")?;

    let language = req.language.as_deref().unwrap_or_default();
    let value = req.value.as_text();
    let full = cpid::try_generate(&req.brand_name, language, &value)?;

    Ok(Json(CpidPreview {
        exact_cpid: cpid::truncate(&full),
        cpid: full,
        brand_slug: cpid::brand_slug(&req.brand_name),
        language: cpid::language_segment(language),
        value: cpid::value_segment(&value),
    }))
}
