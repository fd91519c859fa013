pub mod auth;
pub mod common;
pub mod commerce;
pub mod profile;

use crate::events::EventSender;
use crate::services::{
    accounts::{AccountService, ProfileService},
    commerce::{
        BasketService, CatalogService, CatalogSettings, CategoryService, OrderService,
        ProductService,
    },
    media::MediaStorage,
};
use crate::db::DbPool;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub accounts: Arc<AccountService>,
    pub profiles: Arc<ProfileService>,
    pub categories: Arc<CategoryService>,
    pub catalog: Arc<CatalogService>,
    pub products: Arc<ProductService>,
    pub basket: Arc<BasketService>,
    pub orders: Arc<OrderService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        auth_service: Arc<crate::auth::AuthService>,
        media: MediaStorage,
        catalog_settings: CatalogSettings,
    ) -> Self {
        let accounts = Arc::new(AccountService::new(
            db_pool.clone(),
            event_sender.clone(),
            auth_service,
        ));
        let profiles = Arc::new(ProfileService::new(
            db_pool.clone(),
            event_sender.clone(),
            media.clone(),
        ));
        let categories = Arc::new(CategoryService::new(
            db_pool.clone(),
            event_sender.clone(),
            media.clone(),
        ));
        let catalog = Arc::new(CatalogService::new(
            db_pool.clone(),
            media.clone(),
            catalog_settings,
        ));
        let products = Arc::new(ProductService::new(
            db_pool.clone(),
            event_sender.clone(),
            media.clone(),
        ));
        let basket = Arc::new(BasketService::new(
            db_pool.clone(),
            event_sender.clone(),
            media.clone(),
        ));
        let orders = Arc::new(OrderService::new(db_pool, event_sender, media));

        Self {
            accounts,
            profiles,
            categories,
            catalog,
            products,
            basket,
            orders,
        }
    }
}
