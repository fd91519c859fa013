use crate::{
    auth::{AuthRouterExt, AuthUser},
    errors::ApiError,
    handlers::common::{map_service_error, success_response, validate_input},
    services::commerce::ProductShort,
    AppState,
};
use axum::{
    extract::{Json, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Product and quantity to add or take away
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BasketLineRequest {
    /// Product id
    pub id: i32,
    #[validate(range(min = 1))]
    pub count: i32,
}

pub fn basket_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/basket",
            get(get_basket).post(add_to_basket).delete(remove_from_basket),
        )
        .with_auth()
}

/// Basket contents; `count` is the quantity held
#[utoipa::path(
    get,
    path = "/api/basket",
    responses(
        (status = 200, description = "Basket", body = [ProductShort]),
        (status = 401, description = "Not signed in", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Basket"
)]
pub async fn get_basket(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let basket = state
        .services
        .basket
        .get_basket(user.user_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(basket))
}

/// Add a product; an existing line grows instead of duplicating
#[utoipa::path(
    post,
    path = "/api/basket",
    request_body = BasketLineRequest,
    responses(
        (status = 200, description = "Updated basket", body = [ProductShort]),
        (status = 400, description = "Count below 1", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Basket"
)]
pub async fn add_to_basket(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<BasketLineRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let basket = state
        .services
        .basket
        .add_item(user.user_id, payload.id, payload.count)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(basket))
}

/// Take a quantity away; the line goes once nothing would remain
#[utoipa::path(
    delete,
    path = "/api/basket",
    request_body = BasketLineRequest,
    responses(
        (status = 200, description = "Updated basket", body = [ProductShort]),
        (status = 404, description = "Product not in basket", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Basket"
)]
pub async fn remove_from_basket(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<BasketLineRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let basket = state
        .services
        .basket
        .remove_item(user.user_id, payload.id, payload.count)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(basket))
}
