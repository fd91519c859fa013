use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Megano API",
        version = "1.0.0",
        description = r#"
# Megano storefront API

Catalog browsing, product reviews, customer profiles, baskets and orders for
the Megano online shop. Staff endpoints under `/api/admin` manage categories,
products, tags and sales.

## Authentication

Sign in through `/api/sign-in` and pass the returned token either as the
`access_token` cookie or in the Authorization header:

```
Authorization: Bearer <token>
```

## Pagination

Paged listings take a 1-based `currentPage` query parameter and answer with
`currentPage` and `lastPage` next to the items.
        "#
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development")
    ),
    tags(
        (name = "Auth", description = "Sign in, sign up and sign out"),
        (name = "Profile", description = "Customer profile, avatar and password"),
        (name = "Catalog", description = "Categories, listings, banners, sales and tags"),
        (name = "Products", description = "Product details and reviews"),
        (name = "Basket", description = "Customer basket"),
        (name = "Orders", description = "Orders created from the basket"),
        (name = "Admin", description = "Staff-only catalog management")
    ),
    paths(
        crate::handlers::auth::sign_in,
        crate::handlers::auth::sign_up,
        crate::handlers::auth::sign_out,

        crate::handlers::profile::get_profile,
        crate::handlers::profile::update_profile,
        crate::handlers::profile::upload_avatar,
        crate::handlers::profile::change_password,

        crate::handlers::commerce::catalog::list_categories,
        crate::handlers::commerce::catalog::catalog,
        crate::handlers::commerce::catalog::popular_products,
        crate::handlers::commerce::catalog::limited_products,
        crate::handlers::commerce::catalog::banners,
        crate::handlers::commerce::catalog::sales,
        crate::handlers::commerce::catalog::tags,

        crate::handlers::commerce::products::get_product,
        crate::handlers::commerce::products::post_review,

        crate::handlers::commerce::basket::get_basket,
        crate::handlers::commerce::basket::add_to_basket,
        crate::handlers::commerce::basket::remove_from_basket,

        crate::handlers::commerce::orders::list_orders,
        crate::handlers::commerce::orders::create_order,
        crate::handlers::commerce::orders::get_order,
        crate::handlers::commerce::orders::confirm_order,

        crate::handlers::commerce::admin::create_category,
        crate::handlers::commerce::admin::delete_category,
        crate::handlers::commerce::admin::upload_category_image,
        crate::handlers::commerce::admin::create_product,
        crate::handlers::commerce::admin::archive_product,
        crate::handlers::commerce::admin::create_tag,
        crate::handlers::commerce::admin::create_sale,
    ),
    components(
        schemas(
            crate::auth::TokenPair,
            crate::handlers::auth::SignInRequest,
            crate::handlers::auth::SignUpRequest,

            crate::handlers::profile::UpdateProfileRequest,
            crate::handlers::profile::ChangePasswordRequest,
            crate::services::accounts::ProfileView,

            crate::services::commerce::CategoryNode,
            crate::services::commerce::CatalogPage,
            crate::services::commerce::SalesPage,
            crate::services::commerce::catalog_service::SaleItem,
            crate::services::commerce::ProductShort,
            crate::services::commerce::ProductFull,
            crate::services::commerce::ImageView,
            crate::services::commerce::TagView,
            crate::services::commerce::ReviewView,
            crate::services::commerce::product_cards::SpecificationView,
            crate::handlers::commerce::products::ReviewRequest,

            crate::handlers::commerce::basket::BasketLineRequest,

            crate::services::commerce::OrderView,
            crate::handlers::commerce::orders::ConfirmOrderRequest,
            crate::handlers::commerce::orders::OrderCreated,

            crate::handlers::commerce::admin::CreateCategoryRequest,
            crate::handlers::commerce::admin::CategoryResponse,
            crate::handlers::commerce::admin::SpecificationRequest,
            crate::handlers::commerce::admin::CreateProductRequest,
            crate::handlers::commerce::admin::CreateTagRequest,
            crate::handlers::commerce::admin::CreateSaleRequest,
            crate::handlers::commerce::admin::SaleResponse,

            crate::errors::ErrorResponse
        )
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

/// Registers the `Bearer` scheme referenced by authenticated paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
