//! Order routes

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use shared::order::{
    ApplyDiscountRequest, ChangeStatusRequest, CreateOrderRequest, DeliveryStatusRequest,
    EditOrderRequest, OrderView,
};

use super::context::parse_id;
use super::{ApiResult, ok};
use crate::core::ServerState;
use crate::orders::RequestContext;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/orders", post(create))
        .route("/api/orders/{id}", get(get_by_id))
        .route("/api/orders/{id}/items", put(edit_items))
        .route("/api/orders/{id}/status", post(change_status))
        .route("/api/orders/{id}/discounts", post(apply_discount))
        .route("/api/orders/{id}/delivery-status", post(update_delivery_status))
}

/// POST /api/orders
pub async fn create(
    State(state): State<ServerState>,
    ctx: RequestContext,
    Json(request): Json<CreateOrderRequest>,
) -> ApiResult<OrderView> {
    ok(state.orders.create_order(&ctx, request).await?)
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> ApiResult<OrderView> {
    ok(state.orders.get_order(&ctx, parse_id(&id)?).await?)
}

/// PUT /api/orders/{id}/items
pub async fn edit_items(
    State(state): State<ServerState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    Json(request): Json<EditOrderRequest>,
) -> ApiResult<OrderView> {
    ok(state.orders.edit_order(&ctx, parse_id(&id)?, request).await?)
}

/// POST /api/orders/{id}/status
pub async fn change_status(
    State(state): State<ServerState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    Json(request): Json<ChangeStatusRequest>,
) -> ApiResult<OrderView> {
    ok(state.orders.change_status(&ctx, parse_id(&id)?, request).await?)
}

/// POST /api/orders/{id}/discounts
pub async fn apply_discount(
    State(state): State<ServerState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    Json(request): Json<ApplyDiscountRequest>,
) -> ApiResult<OrderView> {
    ok(state.orders.apply_discount(&ctx, parse_id(&id)?, request).await?)
}

/// POST /api/orders/{id}/delivery-status
pub async fn update_delivery_status(
    State(state): State<ServerState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    Json(request): Json<DeliveryStatusRequest>,
) -> ApiResult<OrderView> {
    ok(state
        .orders
        .update_delivery_status(&ctx, parse_id(&id)?, request)
        .await?)
}
