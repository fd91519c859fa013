use crate::{
    entities::commerce::{
        basket, basket_item, product, Basket, BasketItem, BasketItemModel, BasketModel, Product,
        ProductModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        commerce::product_cards::{short_cards, ProductShort},
        media::MediaStorage,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// What happened to a basket line after a decrement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    Remove,
    Keep(i32),
}

/// A line whose quantity is at or below the decrement disappears entirely.
pub fn apply_decrement(current: i32, by: i32) -> Decrement {
    if current <= by {
        Decrement::Remove
    } else {
        Decrement::Keep(current - by)
    }
}

/// Per-user basket of product quantities
#[derive(Clone)]
pub struct BasketService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    media: MediaStorage,
}

impl BasketService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>, media: MediaStorage) -> Self {
        Self {
            db,
            event_sender,
            media,
        }
    }

    /// Basket contents; `count` on each entry is the quantity held
    #[instrument(skip(self))]
    pub async fn get_basket(&self, user_id: i32) -> Result<Vec<ProductShort>, ServiceError> {
        let lines = match find_basket(&*self.db, user_id).await? {
            Some(basket) => basket_lines(&*self.db, &basket).await?,
            None => Vec::new(),
        };
        render_with_quantities(&*self.db, &self.media, lines).await
    }

    /// Adds `count` of a product, merging into an existing line
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: i32,
        product_id: i32,
        count: i32,
    ) -> Result<Vec<ProductShort>, ServiceError> {
        ensure_positive(count)?;

        let txn = self.db.begin().await?;

        Product::find_by_id(product_id)
            .filter(product::Column::Archived.eq(false))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("product", product_id))?;

        let basket = match find_basket(&txn, user_id).await? {
            Some(basket) => basket,
            None => {
                basket::ActiveModel {
                    user_id: Set(user_id),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            }
        };

        let existing = BasketItem::find()
            .filter(basket_item::Column::BasketId.eq(basket.id))
            .filter(basket_item::Column::ProductId.eq(product_id))
            .one(&txn)
            .await?;

        match existing {
            Some(line) => {
                let total = line.count.saturating_add(count);
                let mut line: basket_item::ActiveModel = line.into();
                line.count = Set(total);
                line.update(&txn).await?;
            }
            None => {
                basket_item::ActiveModel {
                    basket_id: Set(basket.id),
                    product_id: Set(product_id),
                    count: Set(count),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
            }
        }

        let lines = basket_lines(&txn, &basket).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::BasketItemAdded {
                user_id,
                product_id,
                count,
            })
            .await;
        info!("Added {} x product {} to basket of user {}", count, product_id, user_id);

        render_with_quantities(&*self.db, &self.media, lines).await
    }

    /// Takes `count` of a product out of the basket
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        user_id: i32,
        product_id: i32,
        count: i32,
    ) -> Result<Vec<ProductShort>, ServiceError> {
        ensure_positive(count)?;

        let txn = self.db.begin().await?;

        let basket = find_basket(&txn, user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("basket item", product_id))?;
        let line = BasketItem::find()
            .filter(basket_item::Column::BasketId.eq(basket.id))
            .filter(basket_item::Column::ProductId.eq(product_id))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("basket item", product_id))?;

        match apply_decrement(line.count, count) {
            Decrement::Remove => {
                line.delete(&txn).await?;
            }
            Decrement::Keep(left) => {
                let mut line: basket_item::ActiveModel = line.into();
                line.count = Set(left);
                line.update(&txn).await?;
            }
        }

        let lines = basket_lines(&txn, &basket).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::BasketItemRemoved {
                user_id,
                product_id,
                count,
            })
            .await;

        render_with_quantities(&*self.db, &self.media, lines).await
    }
}

fn ensure_positive(count: i32) -> Result<(), ServiceError> {
    if count < 1 {
        return Err(ServiceError::ValidationError(
            "count must be at least 1".to_string(),
        ));
    }
    Ok(())
}

pub(crate) async fn find_basket<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Option<BasketModel>, ServiceError> {
    Ok(Basket::find()
        .filter(basket::Column::UserId.eq(user_id))
        .one(db)
        .await?)
}

/// Basket lines paired with their products, in insertion order
pub(crate) async fn basket_lines<C: ConnectionTrait>(
    db: &C,
    basket: &BasketModel,
) -> Result<Vec<(BasketItemModel, ProductModel)>, ServiceError> {
    Ok(BasketItem::find()
        .find_also_related(Product)
        .filter(basket_item::Column::BasketId.eq(basket.id))
        .order_by_asc(basket_item::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(line, product)| product.map(|p| (line, p)))
        .collect())
}

/// Product cards whose `count` is replaced by the held quantity
pub(crate) async fn render_with_quantities<C: ConnectionTrait, L>(
    db: &C,
    media: &MediaStorage,
    lines: Vec<(L, ProductModel)>,
) -> Result<Vec<ProductShort>, ServiceError>
where
    L: HeldQuantity,
{
    let quantities: Vec<i32> = lines.iter().map(|(line, _)| line.quantity()).collect();
    let products = lines.into_iter().map(|(_, p)| p).collect();
    let mut cards = short_cards(db, media, products).await?;
    for (card, quantity) in cards.iter_mut().zip(quantities) {
        card.count = quantity;
    }
    Ok(cards)
}

/// Rows that hold some quantity of a product
pub(crate) trait HeldQuantity {
    fn quantity(&self) -> i32;
}

impl HeldQuantity for BasketItemModel {
    fn quantity(&self) -> i32 {
        self.count
    }
}

impl HeldQuantity for crate::entities::order_item::Model {
    fn quantity(&self) -> i32 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(3, 1 => Decrement::Keep(2); "partial decrement keeps the line")]
    #[test_case(3, 3 => Decrement::Remove; "exact decrement removes the line")]
    #[test_case(2, 5 => Decrement::Remove; "over-decrement removes the line")]
    #[test_case(1, 1 => Decrement::Remove; "single unit")]
    fn decrement_boundary(current: i32, by: i32) -> Decrement {
        apply_decrement(current, by)
    }

    #[test]
    fn non_positive_counts_are_rejected() {
        assert!(ensure_positive(0).is_err());
        assert!(ensure_positive(-4).is_err());
        assert!(ensure_positive(1).is_ok());
    }
}
