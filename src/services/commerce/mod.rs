//! Storefront services: catalog, products, basket and orders
pub mod basket_service;
pub mod catalog_query;
pub mod catalog_service;
pub mod category_service;
pub mod category_tree;
pub mod import_service;
pub mod order_service;
pub mod product_cards;
pub mod product_service;

pub use basket_service::BasketService;
pub use catalog_query::CatalogQuery;
pub use catalog_service::{CatalogPage, CatalogService, CatalogSettings, SalesPage};
pub use category_service::{CategoryNode, CategoryService, CreateCategoryInput};
pub use category_tree::CategoryTree;
pub use import_service::{ImportOptions, ImportReport, ImportService};
pub use order_service::{ConfirmOrderInput, OrderService, OrderView};
pub use product_cards::{ImageView, ProductFull, ProductShort, ReviewView, TagView};
pub use product_service::{CreateProductInput, CreateSaleInput, ProductService, ReviewInput};
