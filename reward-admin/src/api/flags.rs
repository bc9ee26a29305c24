//! Feature flag endpoint

use axum::Json;
use axum::extract::State;

use crate::flags::FeatureFlags;
use crate::state::AppState;

/// GET /api/flags
pub async fn get_flags(State(state): State<AppState>) -> Json<FeatureFlags> {
    Json(state.flags)
}
