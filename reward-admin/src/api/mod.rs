//! API routes for the admin service

pub mod catalogs;
pub mod cpid;
pub mod flags;
pub mod health;
pub mod items;
pub mod rewards;

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router, middleware};
use http::{HeaderName, HeaderValue, Method, StatusCode, header};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::admin_auth_middleware;
use crate::error::ServiceError;
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, ServiceError>;

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_BODY_BYTES: usize = 1024 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_IN_FLIGHT: usize = 100;

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        None => CorsLayer::permissive(),
    }
}

/// Admin API (bearer token required)
fn api_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/flags", get(flags::get_flags))
        .route("/api/cpid/preview", post(cpid::preview))
        // Rewards
        .route("/api/rewards", get(rewards::list_rewards))
        .route("/api/rewards/offers", post(rewards::create_offer))
        .route(
            "/api/rewards/{cpid}",
            get(rewards::get_reward).put(rewards::update_reward),
        )
        // Source items
        .route("/api/rewards/{cpid}/items", post(items::add_item))
        .route(
            "/api/rewards/{cpid}/items/{item_id}",
            delete(items::delete_item),
        )
        .route(
            "/api/rewards/{cpid}/items/{item_id}/status",
            put(items::update_item_status),
        )
        // Client catalogs
        .route(
            "/api/catalogs/{client_id}/rewards",
            get(catalogs::list_catalog).post(catalogs::assign_rewards),
        )
        .route(
            "/api/catalogs/{client_id}/rewards/order",
            put(catalogs::reorder_catalog),
        )
        .route(
            "/api/catalogs/{client_id}/rewards/{item_id}",
            delete(catalogs::remove_reward),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ))
}

/// Create the full application router
pub fn build_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        // Public
        .route("/health", get(health::health_check))
        .merge(api_router(&state))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(ConcurrencyLimitLayer::new(MAX_IN_FLIGHT))
        .layer(cors_layer(state.cors_origin.as_deref()))
        // Trace - request spans (INFO)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, XRequestId))
        .with_state(state)
}
