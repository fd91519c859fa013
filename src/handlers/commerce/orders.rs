use crate::{
    auth::{AuthRouterExt, AuthUser},
    entities::{DeliveryType, PaymentType},
    errors::ApiError,
    handlers::common::{created_response, map_service_error, success_response, validate_input},
    services::commerce::{ConfirmOrderInput, OrderView},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmOrderRequest {
    pub delivery_type: DeliveryType,
    pub payment_type: PaymentType,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 255))]
    pub address: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub order_id: i32,
}

pub fn orders_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/order/:id", get(get_order).post(confirm_order))
        .with_auth()
}

/// Caller's orders, newest first
#[utoipa::path(
    get,
    path = "/api/orders",
    responses((status = 200, description = "Orders", body = [OrderView])),
    security(("Bearer" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let orders = state
        .services
        .orders
        .list_orders(user.user_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(orders))
}

/// Turn the basket into an order
#[utoipa::path(
    post,
    path = "/api/orders",
    responses(
        (status = 201, description = "Order created", body = OrderCreated),
        (status = 400, description = "Basket is empty", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let order_id = state
        .services
        .orders
        .create_order(user.user_id)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(OrderCreated { order_id }))
}

#[utoipa::path(
    get,
    path = "/api/order/{id}",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = OrderView),
        (status = 404, description = "Not one of the caller's orders", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let order = state
        .services
        .orders
        .get_order(user.user_id, id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(order))
}

/// Confirm delivery and payment details
#[utoipa::path(
    post,
    path = "/api/order/{id}",
    params(("id" = i32, Path, description = "Order id")),
    request_body = ConfirmOrderRequest,
    responses(
        (status = 200, description = "Accepted order", body = OrderView),
        (status = 400, description = "Missing delivery details", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not one of the caller's orders", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Orders"
)]
pub async fn confirm_order(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ConfirmOrderRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let order = state
        .services
        .orders
        .confirm_order(
            user.user_id,
            id,
            ConfirmOrderInput {
                delivery_type: payload.delivery_type,
                payment_type: payload.payment_type,
                city: payload.city,
                address: payload.address,
            },
        )
        .await
        .map_err(map_service_error)?;
    Ok(success_response(order))
}
