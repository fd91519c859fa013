//! Staff-only catalog administration
use crate::{
    auth::AuthRouterExt,
    entities::commerce::{CategoryModel, SaleModel},
    errors::ApiError,
    handlers::common::{
        created_response, map_service_error, no_content_response, success_response,
        validate_input,
    },
    services::commerce::{
        product_service::SpecificationInput, CreateCategoryInput, CreateProductInput,
        CreateSaleInput, ImageView, ProductFull, TagView,
    },
    AppState,
};
use axum::{
    extract::{DefaultBodyLimit, Json, Multipart, Path, State},
    response::Response,
    routing::{delete, post},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

pub const ADMIN_ROLE: &str = "admin";
pub const CATEGORY_IMAGE_FIELD: &str = "image";

fn validate_decimal_min_zero(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("decimal_min_zero"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    /// Parent category id; omitted for a root
    pub parent: Option<i32>,
    #[validate(length(max = 100))]
    pub slug: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub parent: Option<i32>,
}

impl From<CategoryModel> for CategoryResponse {
    fn from(model: CategoryModel) -> Self {
        Self {
            id: model.id,
            title: model.title,
            slug: model.slug,
            parent: model.parent_id,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SpecificationRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 200))]
    pub value: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    pub category: i32,
    #[schema(value_type = String, example = "499.99")]
    #[validate(custom = "validate_decimal_min_zero")]
    #[serde(default)]
    pub price: Decimal,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub count: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub full_description: String,
    #[serde(default)]
    pub free_delivery: bool,
    #[serde(default)]
    pub limited_edition: bool,
    /// Tag ids
    #[serde(default)]
    pub tags: Vec<i32>,
    #[validate]
    #[serde(default)]
    pub specifications: Vec<SpecificationRequest>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTagRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    /// Product id
    pub product: i32,
    #[schema(value_type = String, example = "399.99")]
    #[validate(custom = "validate_decimal_min_zero")]
    pub sale_price: Decimal,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    pub id: i32,
    pub product: i32,
    #[schema(value_type = String)]
    pub sale_price: Decimal,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
}

impl From<SaleModel> for SaleResponse {
    fn from(model: SaleModel) -> Self {
        Self {
            id: model.id,
            product: model.product_id,
            sale_price: model.sale_price,
            date_from: model.date_from,
            date_to: model.date_to,
        }
    }
}

pub fn admin_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/categories", post(create_category))
        .route("/categories/:id", delete(delete_category))
        .route(
            "/categories/:id/image",
            post(upload_category_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/products", post(create_product))
        .route("/products/:id/archive", post(archive_product))
        .route("/tags", post(create_tag))
        .route("/sales", post(create_sale))
        .with_role(ADMIN_ROLE)
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 403, description = "Not staff", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown parent", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Admin"
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let category = state
        .services
        .categories
        .create_category(CreateCategoryInput {
            title: payload.title,
            parent: payload.parent,
            slug: payload.slug,
        })
        .await
        .map_err(map_service_error)?;
    Ok(created_response(CategoryResponse::from(category)))
}

/// Delete a category without subcategories
#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 409, description = "Category still has subcategories", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Admin"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    state
        .services
        .categories
        .delete_category(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

/// Upload a category icon as multipart field `image`
#[utoipa::path(
    post,
    path = "/api/admin/categories/{id}/image",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Stored image", body = ImageView),
        (status = 400, description = "Missing or untyped image", body = crate::errors::ErrorResponse),
        (status = 403, description = "Not staff", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown category", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Admin"
)]
pub async fn upload_category_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed upload: {}", e)))?
    {
        if field.name() != Some(CATEGORY_IMAGE_FIELD) {
            continue;
        }
        if !field
            .content_type()
            .map(|ct| ct.starts_with("image/"))
            .unwrap_or(false)
        {
            return Err(ApiError::BadRequest(
                "category image must be an image".to_string(),
            ));
        }

        let filename = field
            .file_name()
            .unwrap_or(CATEGORY_IMAGE_FIELD)
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("could not read upload: {}", e)))?;
        let image = state
            .services
            .categories
            .set_image(id, &filename, &bytes)
            .await
            .map_err(map_service_error)?;
        return Ok(success_response(image));
    }

    Err(ApiError::BadRequest(format!(
        "multipart field '{}' is required",
        CATEGORY_IMAGE_FIELD
    )))
}

#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductFull),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown category", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Admin"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let product = state
        .services
        .products
        .create_product(CreateProductInput {
            title: payload.title,
            category: payload.category,
            price: payload.price,
            count: payload.count,
            description: payload.description,
            full_description: payload.full_description,
            free_delivery: payload.free_delivery,
            limited_edition: payload.limited_edition,
            tags: payload.tags,
            specifications: payload
                .specifications
                .into_iter()
                .map(|s| SpecificationInput {
                    name: s.name,
                    value: s.value,
                })
                .collect(),
        })
        .await
        .map_err(map_service_error)?;
    Ok(created_response(product))
}

/// Hide a product from the storefront
#[utoipa::path(
    post,
    path = "/api/admin/products/{id}/archive",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 204, description = "Archived"),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Admin"
)]
pub async fn archive_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    state
        .services
        .products
        .archive_product(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

#[utoipa::path(
    post,
    path = "/api/admin/tags",
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created", body = TagView),
        (status = 409, description = "Tag name taken", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Admin"
)]
pub async fn create_tag(
    State(state): State<AppState>,
    Json(payload): Json<CreateTagRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let tag = state
        .services
        .products
        .create_tag(&payload.name)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(TagView {
        id: tag.id,
        name: tag.name,
    }))
}

#[utoipa::path(
    post,
    path = "/api/admin/sales",
    request_body = CreateSaleRequest,
    responses(
        (status = 201, description = "Sale created", body = SaleResponse),
        (status = 400, description = "dateFrom after dateTo", body = crate::errors::ErrorResponse),
        (status = 409, description = "Product already on sale", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Admin"
)]
pub async fn create_sale(
    State(state): State<AppState>,
    Json(payload): Json<CreateSaleRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let sale = state
        .services
        .products
        .create_sale(CreateSaleInput {
            product: payload.product,
            sale_price: payload.sale_price,
            date_from: payload.date_from,
            date_to: payload.date_to,
        })
        .await
        .map_err(map_service_error)?;
    Ok(created_response(SaleResponse::from(sale)))
}
