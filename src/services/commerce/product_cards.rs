//! Response shapes for products plus the batch loaders that fill them.
//!
//! Listings never issue per-product queries: images, tags and review totals
//! are fetched once for the whole page and stitched together in memory.

use crate::{
    entities::commerce::{
        product_image, product_tag, review, specification, ProductImage, ProductModel, ProductTag,
        Review, Specification, Tag,
    },
    errors::ServiceError,
    services::media::MediaStorage,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

pub const REVIEW_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ImageView {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TagView {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReviewView {
    pub author: String,
    pub email: String,
    pub text: String,
    pub rate: i16,
    /// `YYYY-MM-DD HH:MM`
    pub date: String,
}

impl From<review::Model> for ReviewView {
    fn from(model: review::Model) -> Self {
        Self {
            author: model.author,
            email: model.email,
            text: model.text,
            rate: model.rate,
            date: model.date.format(REVIEW_DATE_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SpecificationView {
    pub name: String,
    pub value: String,
}

/// Listing representation of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductShort {
    pub id: i32,
    pub category: i32,
    #[schema(value_type = String, example = "499.99")]
    pub price: Decimal,
    /// Stock level, or the quantity held when rendered inside a basket or order
    pub count: i32,
    pub date: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub free_delivery: bool,
    pub images: Vec<ImageView>,
    pub tags: Vec<TagView>,
    /// Number of reviews
    pub reviews: u64,
    pub rating: Option<f64>,
}

/// Product page representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductFull {
    pub id: i32,
    pub category: i32,
    pub title: String,
    pub description: String,
    pub full_description: String,
    #[schema(value_type = String, example = "499.99")]
    pub price: Decimal,
    pub count: i32,
    pub date: DateTime<Utc>,
    pub free_delivery: bool,
    pub images: Vec<ImageView>,
    pub tags: Vec<TagView>,
    pub reviews: Vec<ReviewView>,
    pub specifications: Vec<SpecificationView>,
    pub rating: Option<f64>,
}

/// Review totals for one product
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReviewStats {
    pub count: u64,
    /// Mean rate, `None` when nobody reviewed the product yet
    pub rating: Option<f64>,
}

impl ReviewStats {
    pub fn from_totals(rate_sum: i64, count: i64) -> Self {
        if count <= 0 {
            return Self::default();
        }
        Self {
            count: count as u64,
            rating: Some(rate_sum as f64 / count as f64),
        }
    }

    pub fn from_rates(rates: &[i16]) -> Self {
        let sum: i64 = rates.iter().map(|r| i64::from(*r)).sum();
        Self::from_totals(sum, rates.len() as i64)
    }
}

/// Review count and mean rate per product, aggregated in SQL
async fn review_stats<C: ConnectionTrait>(
    db: &C,
    product_ids: &[i32],
) -> Result<HashMap<i32, ReviewStats>, ServiceError> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i32, Option<i64>, i64)> = Review::find()
        .select_only()
        .column(review::Column::ProductId)
        .column_as(Expr::col(review::Column::Rate).sum(), "rate_sum")
        .column_as(Expr::col(review::Column::Id).count(), "review_count")
        .filter(review::Column::ProductId.is_in(product_ids.iter().copied()))
        .group_by(review::Column::ProductId)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(product_id, sum, count)| {
            (product_id, ReviewStats::from_totals(sum.unwrap_or(0), count))
        })
        .collect())
}

async fn images_by_product<C: ConnectionTrait>(
    db: &C,
    media: &MediaStorage,
    product_ids: &[i32],
) -> Result<HashMap<i32, Vec<ImageView>>, ServiceError> {
    let mut grouped: HashMap<i32, Vec<ImageView>> = HashMap::new();
    if product_ids.is_empty() {
        return Ok(grouped);
    }

    let images = ProductImage::find()
        .filter(product_image::Column::ProductId.is_in(product_ids.iter().copied()))
        .order_by_asc(product_image::Column::Src)
        .all(db)
        .await?;

    for image in images {
        grouped.entry(image.product_id).or_default().push(ImageView {
            src: media.url(&image.src),
            alt: image.alt,
        });
    }
    Ok(grouped)
}

async fn tags_by_product<C: ConnectionTrait>(
    db: &C,
    product_ids: &[i32],
) -> Result<HashMap<i32, Vec<TagView>>, ServiceError> {
    let mut grouped: HashMap<i32, Vec<TagView>> = HashMap::new();
    if product_ids.is_empty() {
        return Ok(grouped);
    }

    let links = ProductTag::find()
        .find_also_related(Tag)
        .filter(product_tag::Column::ProductId.is_in(product_ids.iter().copied()))
        .all(db)
        .await?;

    for (link, tag) in links {
        if let Some(tag) = tag {
            grouped.entry(link.product_id).or_default().push(TagView {
                id: tag.id,
                name: tag.name,
            });
        }
    }
    for tags in grouped.values_mut() {
        tags.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Ok(grouped)
}

/// Renders products whose review totals are already known, preserving order
async fn short_cards_with_stats<C: ConnectionTrait>(
    db: &C,
    media: &MediaStorage,
    rows: Vec<(ProductModel, ReviewStats)>,
) -> Result<Vec<ProductShort>, ServiceError> {
    let ids: Vec<i32> = rows.iter().map(|(p, _)| p.id).collect();
    let mut images = images_by_product(db, media, &ids).await?;
    let mut tags = tags_by_product(db, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|(product, stats)| ProductShort {
            id: product.id,
            category: product.category_id,
            price: product.price,
            count: product.count,
            date: product.date,
            title: product.title,
            description: product.description,
            free_delivery: product.free_delivery,
            images: images.remove(&product.id).unwrap_or_default(),
            tags: tags.remove(&product.id).unwrap_or_default(),
            reviews: stats.count,
            rating: stats.rating,
        })
        .collect())
}

/// Renders products in the given order
pub async fn short_cards<C: ConnectionTrait>(
    db: &C,
    media: &MediaStorage,
    products: Vec<ProductModel>,
) -> Result<Vec<ProductShort>, ServiceError> {
    let ids: Vec<i32> = products.iter().map(|p| p.id).collect();
    let stats = review_stats(db, &ids).await?;
    let rows = products
        .into_iter()
        .map(|p| {
            let s = stats.get(&p.id).copied().unwrap_or_default();
            (p, s)
        })
        .collect();
    short_cards_with_stats(db, media, rows).await
}

/// Renders one product with its reviews and specifications
pub async fn full_card<C: ConnectionTrait>(
    db: &C,
    media: &MediaStorage,
    product: ProductModel,
) -> Result<ProductFull, ServiceError> {
    let ids = [product.id];
    let images = images_by_product(db, media, &ids)
        .await?
        .remove(&product.id)
        .unwrap_or_default();
    let tags = tags_by_product(db, &ids)
        .await?
        .remove(&product.id)
        .unwrap_or_default();

    let reviews = Review::find()
        .filter(review::Column::ProductId.eq(product.id))
        .order_by_asc(review::Column::Date)
        .order_by_asc(review::Column::Id)
        .all(db)
        .await?;
    let rates: Vec<i16> = reviews.iter().map(|r| r.rate).collect();
    let stats = ReviewStats::from_rates(&rates);

    let specifications = Specification::find()
        .filter(specification::Column::ProductId.eq(product.id))
        .order_by_asc(specification::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|s| SpecificationView {
            name: s.name,
            value: s.value,
        })
        .collect();

    Ok(ProductFull {
        id: product.id,
        category: product.category_id,
        title: product.title,
        description: product.description,
        full_description: product.full_description,
        price: product.price,
        count: product.count,
        date: product.date,
        free_delivery: product.free_delivery,
        images,
        tags,
        reviews: reviews.into_iter().map(ReviewView::from).collect(),
        specifications,
        rating: stats.rating,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rating_is_absent_without_reviews() {
        assert_eq!(ReviewStats::from_rates(&[]), ReviewStats::default());
        assert_eq!(ReviewStats::from_totals(0, 0).rating, None);
    }

    #[test]
    fn rating_is_the_mean_rate() {
        let stats = ReviewStats::from_rates(&[5, 4, 4]);
        assert_eq!(stats.count, 3);
        let rating = stats.rating.unwrap();
        assert!((rating - 13.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn review_view_formats_date_to_minutes() {
        let view = ReviewView::from(review::Model {
            id: 1,
            user_id: 1,
            product_id: 1,
            author: "Ann".into(),
            email: "ann@example.com".into(),
            text: "Great".into(),
            rate: 5,
            date: Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 59).unwrap(),
        });
        assert_eq!(view.date, "2024-03-09 14:05");
    }

    #[test]
    fn short_card_uses_storefront_field_names() {
        let card = ProductShort {
            id: 1,
            category: 2,
            price: Decimal::new(1999, 2),
            count: 3,
            date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            title: "Phone".into(),
            description: String::new(),
            free_delivery: true,
            images: vec![],
            tags: vec![],
            reviews: 0,
            rating: None,
        };
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["freeDelivery"], true);
        assert_eq!(json["price"], "19.99");
        assert!(json["rating"].is_null());
    }
}
