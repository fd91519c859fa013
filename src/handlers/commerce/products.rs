use crate::{
    auth::{AuthRouterExt, AuthUser},
    errors::ApiError,
    handlers::common::{created_response, map_service_error, success_response, validate_input},
    services::commerce::{ProductFull, ReviewInput, ReviewView},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReviewRequest {
    #[validate(length(min = 1, max = 191))]
    pub author: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub text: String,
    /// 1 to 5
    pub rate: i16,
}

pub fn products_routes() -> Router<AppState> {
    let reviews = Router::new()
        .route("/product/:id/reviews", post(post_review))
        .with_auth();

    Router::new()
        .route("/product/:id", get(get_product))
        .merge(reviews)
}

/// Product page
#[utoipa::path(
    get,
    path = "/api/product/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ProductFull),
        (status = 404, description = "Unknown or archived product", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let product = state
        .services
        .products
        .get_product(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(product))
}

/// Review a product
#[utoipa::path(
    post,
    path = "/api/product/{id}/reviews",
    params(("id" = i32, Path, description = "Product id")),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review stored", body = ReviewView),
        (status = 400, description = "Rate outside 1-5 or blank author", body = crate::errors::ErrorResponse),
        (status = 401, description = "Not signed in", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn post_review(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let review = state
        .services
        .products
        .post_review(
            id,
            user.user_id,
            ReviewInput {
                author: payload.author,
                email: payload.email,
                text: payload.text,
                rate: payload.rate,
            },
        )
        .await
        .map_err(map_service_error)?;
    Ok(created_response(review))
}
