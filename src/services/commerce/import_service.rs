//! Bulk product import from a scraped JSON dump.

use crate::{
    entities::commerce::{category, product, product_image, specification, Category, Product},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        commerce::category_service::slugify,
        media::{product_image_path, MediaStorage},
    },
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use std::{path::PathBuf, sync::Arc};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedImage {
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportedSpecification {
    pub name: String,
    pub value: String,
}

/// One entry of the import file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedProduct {
    pub title: String,
    pub price: Decimal,
    #[serde(default)]
    pub count: i32,
    /// Unix seconds
    pub date: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub full_description: String,
    #[serde(default)]
    pub free_delivery: bool,
    #[serde(default)]
    pub images: Vec<ImportedImage>,
    #[serde(default)]
    pub specifications: Vec<ImportedSpecification>,
}

pub fn parse_import_file(raw: &str) -> Result<Vec<ImportedProduct>, ServiceError> {
    serde_json::from_str(raw)
        .map_err(|e| ServiceError::ValidationError(format!("malformed import file: {}", e)))
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Title of the target category; created as a root when missing
    pub category: String,
    /// Directory the image `src` paths are relative to
    pub source_dir: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub created: Vec<i32>,
    pub skipped: Vec<String>,
}

#[derive(Clone)]
pub struct ImportService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    media: MediaStorage,
}

impl ImportService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>, media: MediaStorage) -> Self {
        Self {
            db,
            event_sender,
            media,
        }
    }

    /// Imports every item not already present (same title, same category).
    #[instrument(skip(self, items), fields(items = items.len(), category = %options.category))]
    pub async fn import(
        &self,
        items: Vec<ImportedProduct>,
        options: &ImportOptions,
    ) -> Result<ImportReport, ServiceError> {
        let category_id = self.category_id(&options.category).await?;
        let mut report = ImportReport::default();

        for item in items {
            let exists = Product::find()
                .filter(product::Column::CategoryId.eq(category_id))
                .filter(product::Column::Title.eq(item.title.as_str()))
                .one(&*self.db)
                .await?
                .is_some();
            if exists {
                info!("Skipping existing product {}", item.title);
                report.skipped.push(item.title);
                continue;
            }

            let product_id = self.import_one(category_id, item, options).await?;
            report.created.push(product_id);
        }

        info!(
            "Import finished: {} created, {} skipped",
            report.created.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    async fn import_one(
        &self,
        category_id: i32,
        item: ImportedProduct,
        options: &ImportOptions,
    ) -> Result<i32, ServiceError> {
        let date = DateTime::<Utc>::from_timestamp(item.date, 0).ok_or_else(|| {
            ServiceError::ValidationError(format!("{}: date {} is out of range", item.title, item.date))
        })?;

        let txn = self.db.begin().await?;

        let product = product::ActiveModel {
            title: Set(item.title.clone()),
            price: Set(item.price),
            count: Set(item.count),
            date: Set(date),
            description: Set(item.description),
            full_description: Set(item.full_description),
            archived: Set(false),
            free_delivery: Set(item.free_delivery),
            limited_edition: Set(false),
            category_id: Set(category_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for image in &item.images {
            let source = options.source_dir.join(&image.src);
            let src = product_image_path(product.id, &image.src);
            if let Err(e) = self.media.copy_in(&source, &src).await {
                warn!("Could not copy image {}: {}", source.display(), e);
                continue;
            }
            product_image::ActiveModel {
                product_id: Set(product.id),
                src: Set(src),
                alt: Set(image.alt.clone()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        for spec in item.specifications {
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
            .send_or_log(Event::ProductImported {
                product_id: product.id,
                title: item.title,
            })
            .await;
        Ok(product.id)
    }

    async fn category_id(&self, title: &str) -> Result<i32, ServiceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ServiceError::ValidationError(
                "category title cannot be blank".to_string(),
            ));
        }
        if let Some(existing) = Category::find()
            .filter(category::Column::Title.eq(title))
            .one(&*self.db)
            .await?
        {
            return Ok(existing.id);
        }

        let created = category::ActiveModel {
            title: Set(title.to_string()),
            slug: Set(slugify(title)),
            parent_id: Set(None),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;
        info!(category_id = created.id, "Created category {}", title);
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_scraper_output() {
        let raw = r#"[{
            "title": "Laptop X",
            "price": 1299.99,
            "count": 4,
            "date": 1700000000,
            "description": "Thin",
            "fullDescription": "Very thin",
            "freeDelivery": true,
            "images": [{"src": "img/x.png", "alt": "front"}],
            "specifications": [{"name": "RAM", "value": "16GB"}]
        }]"#;
        let items = parse_import_file(raw).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].price, dec!(1299.99));
        assert!(items[0].free_delivery);
        assert_eq!(items[0].images[0].alt, "front");
        assert_eq!(items[0].specifications[0].value, "16GB");
    }

    #[test]
    fn optional_fields_default() {
        let items =
            parse_import_file(r#"[{"title": "Bare", "price": "10", "date": 0}]"#).unwrap();
        assert_eq!(items[0].count, 0);
        assert!(items[0].images.is_empty());
    }

    #[test]
    fn malformed_files_are_validation_errors() {
        assert!(matches!(
            parse_import_file("{not json"),
            Err(ServiceError::ValidationError(_))
        ));
    }
}
