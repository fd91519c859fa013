/// Storefront API handlers
pub mod admin;
pub mod basket;
pub mod catalog;
pub mod orders;
pub mod products;

pub use admin::admin_routes;
pub use basket::basket_routes;
pub use catalog::catalog_routes;
pub use orders::orders_routes;
pub use products::products_routes;
