use crate::{
    entities::commerce::{
        product, product_tag,
        review::{self, MAX_RATE, MIN_RATE},
        sale, specification, tag, Category, Product, ProductModel, Sale, SaleModel, Tag, TagModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        commerce::product_cards::{full_card, ProductFull, ReviewView},
        media::MediaStorage,
    },
};
use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Product pages, reviews and product administration
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    media: MediaStorage,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>, media: MediaStorage) -> Self {
        Self {
            db,
            event_sender,
            media,
        }
    }

    /// Product page; archived products are reported as missing
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i32) -> Result<ProductFull, ServiceError> {
        let product = self.find_listed(id).await?;
        full_card(&*self.db, &self.media, product).await
    }

    #[instrument(skip(self, input), fields(rate = input.rate))]
    pub async fn post_review(
        &self,
        product_id: i32,
        user_id: i32,
        input: ReviewInput,
    ) -> Result<ReviewView, ServiceError> {
        if !(MIN_RATE..=MAX_RATE).contains(&input.rate) {
            return Err(ServiceError::ValidationError(format!(
                "rate must be between {} and {}",
                MIN_RATE, MAX_RATE
            )));
        }
        let author = input.author.trim().to_string();
        if author.is_empty() {
            return Err(ServiceError::ValidationError(
                "author cannot be blank".to_string(),
            ));
        }

        self.find_listed(product_id).await?;

        let review = review::ActiveModel {
            user_id: Set(user_id),
            product_id: Set(product_id),
            author: Set(author),
            email: Set(input.email.trim().to_string()),
            text: Set(input.text),
            rate: Set(input.rate),
            date: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        counter!("shop.reviews.posted", 1);
        self.event_sender
            .send_or_log(Event::ReviewPosted {
                product_id,
                review_id: review.id,
                rate: review.rate,
            })
            .await;
        info!(review_id = review.id, "Review posted for product {}", product_id);
        Ok(ReviewView::from(review))
    }

    /// Creates a product together with its tag links and specifications
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<ProductFull, ServiceError> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(ServiceError::ValidationError(
                "product title cannot be blank".to_string(),
            ));
        }
        if input.price < Decimal::ZERO || input.count < 0 {
            return Err(ServiceError::ValidationError(
                "price and count cannot be negative".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        Category::find_by_id(input.category)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("category", input.category))?;

        let mut tag_ids = input.tags.clone();
        tag_ids.sort_unstable();
        tag_ids.dedup();
        if !tag_ids.is_empty() {
            let known = Tag::find()
                .filter(tag::Column::Id.is_in(tag_ids.clone()))
                .count(&txn)
                .await?;
            if known != tag_ids.len() as u64 {
                return Err(ServiceError::ValidationError(
                    "one or more tags do not exist".to_string(),
                ));
            }
        }

        let product = product::ActiveModel {
            title: Set(title),
            price: Set(input.price),
            count: Set(input.count),
            date: Set(Utc::now()),
            description: Set(input.description),
            full_description: Set(input.full_description),
            archived: Set(false),
            free_delivery: Set(input.free_delivery),
            limited_edition: Set(input.limited_edition),
            category_id: Set(input.category),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for tag_id in tag_ids {
            product_tag::ActiveModel {
                product_id: Set(product.id),
                tag_id: Set(tag_id),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        for spec in input.specifications {
            specification::ActiveModel {
                product_id: Set(product.id),
                name: Set(spec.name),
                value: Set(spec.value),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::ProductCreated(product.id))
            .await;
        info!(product_id = product.id, "Created product");
        full_card(&*self.db, &self.media, product).await
    }

    /// Hides a product from every listing; archiving twice is a no-op
    #[instrument(skip(self))]
    pub async fn archive_product(&self, id: i32) -> Result<(), ServiceError> {
        let product = Product::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("product", id))?;

        if product.archived {
            warn!(product_id = id, "Product already archived");
            return Ok(());
        }

        let mut active: product::ActiveModel = product.into();
        active.archived = Set(true);
        active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductArchived(id))
            .await;
        info!(product_id = id, "Archived product");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn create_tag(&self, name: &str) -> Result<TagModel, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "tag name cannot be blank".to_string(),
            ));
        }

        let exists = Tag::find()
            .filter(tag::Column::Name.eq(name))
            .one(&*self.db)
            .await?
            .is_some();
        if exists {
            return Err(ServiceError::Conflict(format!("tag '{}' already exists", name)));
        }

        let tag = tag::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;
        info!(tag_id = tag.id, "Created tag {}", tag.name);
        Ok(tag)
    }

    /// Puts a product on sale; each product carries at most one sale
    #[instrument(skip(self))]
    pub async fn create_sale(&self, input: CreateSaleInput) -> Result<SaleModel, ServiceError> {
        if input.date_from > input.date_to {
            return Err(ServiceError::ValidationError(
                "dateFrom must not be after dateTo".to_string(),
            ));
        }
        if input.sale_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "salePrice cannot be negative".to_string(),
            ));
        }

        Product::find_by_id(input.product)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("product", input.product))?;

        let existing = Sale::find()
            .filter(sale::Column::ProductId.eq(input.product))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "product {} is already on sale",
                input.product
            )));
        }

        let sale = sale::ActiveModel {
            product_id: Set(input.product),
            sale_price: Set(input.sale_price),
            date_from: Set(input.date_from),
            date_to: Set(input.date_to),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        self.event_sender
            .send_or_log(Event::SaleCreated {
                sale_id: sale.id,
                product_id: sale.product_id,
            })
            .await;
        Ok(sale)
    }

    async fn find_listed(&self, id: i32) -> Result<ProductModel, ServiceError> {
        Product::find_by_id(id)
            .filter(product::Column::Archived.eq(false))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("product", id))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    pub author: String,
    pub email: String,
    pub text: String,
    pub rate: i16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpecificationInput {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductInput {
    pub title: String,
    pub category: i32,
    pub price: Decimal,
    pub count: i32,
    pub description: String,
    pub full_description: String,
    pub free_delivery: bool,
    pub limited_edition: bool,
    pub tags: Vec<i32>,
    pub specifications: Vec<SpecificationInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSaleInput {
    pub product: i32,
    pub sale_price: Decimal,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
}
