use crate::{
    config::AppConfig,
    entities::commerce::{product, product_tag, sale, tag, Product, ProductModel, Sale, Tag},
    errors::ServiceError,
    services::{
        commerce::{
            catalog_query::{
                apply_sort, contains_pattern, has_reviews_expr, rating_expr, review_count_expr,
                CatalogQuery, PageWindow,
            },
            category_service::load_tree,
            product_cards::{short_cards, ImageView, ProductShort, TagView},
        },
        media::MediaStorage,
    },
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr, Query},
    ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, instrument};
use utoipa::ToSchema;

pub const SALE_DATE_FORMAT: &str = "%m-%d";

/// Page sizes and list limits for the storefront listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSettings {
    pub page_size: u64,
    pub max_page_size: u64,
    pub sales_page_size: u64,
    pub popular_limit: u64,
    pub limited_limit: u64,
    pub banner_limit: usize,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            page_size: 20,
            max_page_size: 100,
            sales_page_size: 20,
            popular_limit: 8,
            limited_limit: 16,
            banner_limit: 3,
        }
    }
}

impl From<&AppConfig> for CatalogSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            page_size: cfg.catalog_page_size,
            max_page_size: cfg.catalog_max_page_size,
            sales_page_size: cfg.sales_page_size,
            popular_limit: cfg.popular_limit,
            limited_limit: cfg.limited_limit,
            banner_limit: cfg.banner_limit as usize,
        }
    }
}

/// Read-only storefront listings: catalog, popular, limited, banners, tags, sales
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
    media: MediaStorage,
    settings: CatalogSettings,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>, media: MediaStorage, settings: CatalogSettings) -> Self {
        Self {
            db,
            media,
            settings,
        }
    }

    /// Filtered, sorted and paginated product listing
    #[instrument(skip(self))]
    pub async fn catalog(&self, query: CatalogQuery) -> Result<CatalogPage, ServiceError> {
        let page_size = query.page_size(self.settings.page_size, self.settings.max_page_size);

        let mut select = listed_products();

        if let Some(category_id) = query.category {
            let tree = load_tree(&*self.db).await?;
            let ids = tree.descendants(category_id);
            if ids.is_empty() {
                return Ok(CatalogPage::empty(query.page));
            }
            select = select.filter(product::Column::CategoryId.is_in(ids));
        }

        if let Some(name) = query.name.as_deref() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col((product::Entity, product::Column::Title))))
                    .like(LikeExpr::new(contains_pattern(&name.to_lowercase())).escape('\\')),
            );
        }
        if let Some(min) = query.min_price {
            select = select.filter(product::Column::Price.gte(min));
        }
        if let Some(max) = query.max_price {
            select = select.filter(product::Column::Price.lte(max));
        }
        if query.free_delivery {
            select = select.filter(product::Column::FreeDelivery.eq(true));
        }
        if query.available {
            select = select.filter(product::Column::Count.gt(0));
        }
        if !query.tags.is_empty() {
            select = select.filter(
                product::Column::Id.in_subquery(
                    Query::select()
                        .column(product_tag::Column::ProductId)
                        .from(product_tag::Entity)
                        .and_where(product_tag::Column::TagId.is_in(query.tags.clone()))
                        .to_owned(),
                ),
            );
        }

        let total = select.clone().count(&*self.db).await?;
        let window = PageWindow::new(total, query.page, page_size);
        if window.is_past_end(total) {
            return Ok(CatalogPage {
                items: Vec::new(),
                current_page: window.current_page,
                last_page: window.last_page,
            });
        }

        let products = apply_sort(select, query.sort, query.direction)
            .offset(window.offset)
            .limit(window.size)
            .all(&*self.db)
            .await?;
        debug!(
            page = window.current_page,
            last_page = window.last_page,
            "catalog page with {} of {} items",
            products.len(),
            total
        );

        let items = short_cards(&*self.db, &self.media, products).await?;
        Ok(CatalogPage {
            items,
            current_page: window.current_page,
            last_page: window.last_page,
        })
    }

    /// Most reviewed products, best rated first among equals
    #[instrument(skip(self))]
    pub async fn popular(&self) -> Result<Vec<ProductShort>, ServiceError> {
        let products = listed_products()
            .order_by(review_count_expr(), Order::Desc)
            .order_by(rating_expr(), Order::Desc)
            .order_by_asc(product::Column::Id)
            .limit(self.settings.popular_limit)
            .all(&*self.db)
            .await?;
        short_cards(&*self.db, &self.media, products).await
    }

    /// Limited-edition products, newest first
    #[instrument(skip(self))]
    pub async fn limited(&self) -> Result<Vec<ProductShort>, ServiceError> {
        let products = listed_products()
            .filter(product::Column::LimitedEdition.eq(true))
            .order_by_desc(product::Column::Date)
            .order_by_asc(product::Column::Id)
            .limit(self.settings.limited_limit)
            .all(&*self.db)
            .await?;
        short_cards(&*self.db, &self.media, products).await
    }

    /// Best-rated product of each root category, roots in title order
    #[instrument(skip(self))]
    pub async fn banners(&self) -> Result<Vec<ProductShort>, ServiceError> {
        let tree = load_tree(&*self.db).await?;
        let mut picks = Vec::new();

        for root in tree.roots() {
            if picks.len() >= self.settings.banner_limit {
                break;
            }
            let best = listed_products()
                .filter(product::Column::CategoryId.is_in(tree.descendants(*root)))
                .order_by(has_reviews_expr(), Order::Desc)
                .order_by(rating_expr(), Order::Desc)
                .order_by(review_count_expr(), Order::Desc)
                .order_by_asc(product::Column::Id)
                .one(&*self.db)
                .await?;
            if let Some(best) = best {
                picks.push(best);
            }
        }

        short_cards(&*self.db, &self.media, picks).await
    }

    /// All tags, or only those carried by listed products in a category subtree
    #[instrument(skip(self))]
    pub async fn tags(&self, category: Option<i32>) -> Result<Vec<TagView>, ServiceError> {
        let mut select = Tag::find().order_by_asc(tag::Column::Name);

        if let Some(category_id) = category {
            let ids = load_tree(&*self.db).await?.descendants(category_id);
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            select = select.filter(
                tag::Column::Id.in_subquery(
                    Query::select()
                        .column((product_tag::Entity, product_tag::Column::TagId))
                        .from(product_tag::Entity)
                        .inner_join(
                            product::Entity,
                            Expr::col((product::Entity, product::Column::Id))
                                .equals((product_tag::Entity, product_tag::Column::ProductId)),
                        )
                        .and_where(
                            Expr::col((product::Entity, product::Column::CategoryId)).is_in(ids),
                        )
                        .and_where(Expr::col((product::Entity, product::Column::Archived)).eq(false))
                        .to_owned(),
                ),
            );
        }

        Ok(select
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|t| TagView {
                id: t.id,
                name: t.name,
            })
            .collect())
    }

    /// Sales that have not ended yet, soonest start first
    #[instrument(skip(self))]
    pub async fn sales(&self, page: u64) -> Result<SalesPage, ServiceError> {
        let select = Sale::find()
            .find_also_related(Product)
            .filter(sale::Column::DateTo.gte(Utc::now()))
            .filter(product::Column::Archived.eq(false));

        let total = select.clone().count(&*self.db).await?;
        let window = PageWindow::new(total, page, self.settings.sales_page_size);
        let rows = if window.is_past_end(total) {
            Vec::new()
        } else {
            select
                .order_by_asc(sale::Column::DateFrom)
                .order_by_asc(sale::Column::Id)
                .offset(window.offset)
                .limit(window.size)
                .all(&*self.db)
                .await?
        };

        let products: Vec<ProductModel> = rows.iter().filter_map(|(_, p)| p.clone()).collect();
        let mut cards: HashMap<i32, ProductShort> =
            short_cards(&*self.db, &self.media, products)
                .await?
                .into_iter()
                .map(|card| (card.id, card))
                .collect();

        let items = rows
            .into_iter()
            .filter_map(|(sale, product)| {
                let product = product?;
                let images = cards
                    .remove(&product.id)
                    .map(|c| c.images)
                    .unwrap_or_default();
                Some(SaleItem {
                    id: product.id,
                    price: product.price,
                    sale_price: sale.sale_price,
                    date_from: sale.date_from.format(SALE_DATE_FORMAT).to_string(),
                    date_to: sale.date_to.format(SALE_DATE_FORMAT).to_string(),
                    title: product.title,
                    images,
                })
            })
            .collect();

        Ok(SalesPage {
            items,
            current_page: window.current_page,
            last_page: window.last_page,
        })
    }
}

/// Products visible on the storefront
fn listed_products() -> Select<Product> {
    Product::find().filter(product::Column::Archived.eq(false))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub items: Vec<ProductShort>,
    pub current_page: u64,
    pub last_page: u64,
}

impl CatalogPage {
    fn empty(page: u64) -> Self {
        Self {
            items: Vec::new(),
            current_page: page.max(1),
            last_page: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    /// Product id
    pub id: i32,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = String)]
    pub sale_price: Decimal,
    /// `MM-DD`
    pub date_from: String,
    /// `MM-DD`
    pub date_to: String,
    pub title: String,
    pub images: Vec<ImageView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesPage {
    pub items: Vec<SaleItem>,
    pub current_page: u64,
    pub last_page: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_default_to_storefront_sizes() {
        let settings = CatalogSettings::default();
        assert_eq!(settings.popular_limit, 8);
        assert_eq!(settings.limited_limit, 16);
        assert_eq!(settings.banner_limit, 3);
    }

    #[test]
    fn empty_page_still_reports_a_last_page() {
        let page = CatalogPage::empty(0);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.last_page, 1);
    }
}
