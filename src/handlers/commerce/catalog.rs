use crate::{
    errors::ApiError,
    handlers::common::{map_service_error, success_response, PageParams},
    services::commerce::{
        CatalogPage, CatalogQuery, CategoryNode, ProductShort, SalesPage, TagView,
    },
    AppState,
};
use axum::{
    extract::{Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct TagsParams {
    /// Restrict to tags used in this category subtree
    pub category: Option<i32>,
}

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/catalog", get(catalog))
        .route("/products/popular", get(popular_products))
        .route("/products/limited", get(limited_products))
        .route("/banners", get(banners))
        .route("/sales", get(sales))
        .route("/tags", get(tags))
}

/// Category tree
#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "Root categories with nested subcategories", body = [CategoryNode])),
    tag = "Catalog"
)]
pub async fn list_categories(State(state): State<AppState>) -> Result<Response, ApiError> {
    let tree = state
        .services
        .categories
        .list_tree()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(tree))
}

/// Filtered, sorted and paginated product listing
#[utoipa::path(
    get,
    path = "/api/catalog",
    params(
        ("filter[name]" = Option<String>, Query, description = "Title substring"),
        ("filter[minPrice]" = Option<String>, Query, description = "Inclusive lower price bound"),
        ("filter[maxPrice]" = Option<String>, Query, description = "Inclusive upper price bound"),
        ("filter[freeDelivery]" = Option<bool>, Query, description = "Only free delivery"),
        ("filter[available]" = Option<bool>, Query, description = "Only products in stock"),
        ("category" = Option<i32>, Query, description = "Category id, subcategories included"),
        ("tags[]" = Option<Vec<i32>>, Query, description = "Tag ids"),
        ("sort" = Option<String>, Query, description = "rating | price | reviews | date"),
        ("sortType" = Option<String>, Query, description = "inc | dec"),
        ("currentPage" = Option<u64>, Query, description = "1-based page"),
        ("limit" = Option<u64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Catalog page", body = CatalogPage),
        (status = 400, description = "Malformed query", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn catalog(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let query = CatalogQuery::from_pairs(&pairs)?;
    let page = state
        .services
        .catalog
        .catalog(query)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(page))
}

/// Most reviewed products
#[utoipa::path(
    get,
    path = "/api/products/popular",
    responses((status = 200, description = "Popular products", body = [ProductShort])),
    tag = "Catalog"
)]
pub async fn popular_products(State(state): State<AppState>) -> Result<Response, ApiError> {
    let products = state
        .services
        .catalog
        .popular()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(products))
}

/// Limited-edition products
#[utoipa::path(
    get,
    path = "/api/products/limited",
    responses((status = 200, description = "Limited products", body = [ProductShort])),
    tag = "Catalog"
)]
pub async fn limited_products(State(state): State<AppState>) -> Result<Response, ApiError> {
    let products = state
        .services
        .catalog
        .limited()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(products))
}

/// Front page banners
#[utoipa::path(
    get,
    path = "/api/banners",
    responses((status = 200, description = "Banner products", body = [ProductShort])),
    tag = "Catalog"
)]
pub async fn banners(State(state): State<AppState>) -> Result<Response, ApiError> {
    let products = state
        .services
        .catalog
        .banners()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(products))
}

/// Running and upcoming sales
#[utoipa::path(
    get,
    path = "/api/sales",
    params(PageParams),
    responses((status = 200, description = "Sales page", body = SalesPage)),
    tag = "Catalog"
)]
pub async fn sales(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Response, ApiError> {
    let page = state
        .services
        .catalog
        .sales(params.current_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(page))
}

/// Tags, optionally limited to a category
#[utoipa::path(
    get,
    path = "/api/tags",
    params(TagsParams),
    responses((status = 200, description = "Tags ordered by name", body = [TagView])),
    tag = "Catalog"
)]
pub async fn tags(
    State(state): State<AppState>,
    Query(params): Query<TagsParams>,
) -> Result<Response, ApiError> {
    let tags = state
        .services
        .catalog
        .tags(params.category)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(tags))
}
