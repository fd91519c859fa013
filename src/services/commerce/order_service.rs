use crate::{
    entities::{
        commerce::{basket_item, BasketItem, Product, ProductModel},
        order, order_item, profile, DeliveryType, OrderStatus, PaymentType,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        accounts::profile_service::{ensure_profile, find_user},
        commerce::{
            basket_service::{basket_lines, find_basket, render_with_quantities},
            product_cards::ProductShort,
        },
        media::MediaStorage,
    },
};
use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

/// Σ price × count over the ordered lines
pub fn order_total<'a>(lines: impl IntoIterator<Item = (&'a Decimal, i32)>) -> Decimal {
    lines
        .into_iter()
        .map(|(price, count)| *price * Decimal::from(count))
        .sum()
}

/// Turns baskets into orders and lets customers confirm them
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    media: MediaStorage,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>, media: MediaStorage) -> Self {
        Self {
            db,
            event_sender,
            media,
        }
    }

    /// Moves the basket into a new order and empties the basket
    #[instrument(skip(self))]
    pub async fn create_order(&self, user_id: i32) -> Result<i32, ServiceError> {
        let txn = self.db.begin().await?;

        let lines = match find_basket(&txn, user_id).await? {
            Some(basket) => basket_lines(&txn, &basket).await?,
            None => Vec::new(),
        };
        if lines.is_empty() {
            return Err(ServiceError::BadRequest("basket is empty".to_string()));
        }

        let user = find_user(&txn, user_id).await?;
        let profile = ensure_profile(&txn, &user).await?;

        let order = order::ActiveModel {
            profile_id: Set(profile.id),
            created_at: Set(Utc::now()),
            delivery_type: Set(DeliveryType::Ordinary),
            payment_type: Set(PaymentType::Online),
            status: Set(OrderStatus::Created),
            city: Set(String::new()),
            address: Set(String::new()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for (line, product) in &lines {
            order_item::ActiveModel {
                order_id: Set(order.id),
                product_id: Set(product.id),
                count: Set(line.count),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        let basket_id = lines[0].0.basket_id;
        BasketItem::delete_many()
            .filter(basket_item::Column::BasketId.eq(basket_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        counter!("shop.orders.created", 1);
        self.event_sender
            .send_or_log(Event::OrderCreated(order.id))
            .await;
        info!(order_id = order.id, "Created order with {} lines", lines.len());
        Ok(order.id)
    }

    /// Caller's orders, newest first
    #[instrument(skip(self))]
    pub async fn list_orders(&self, user_id: i32) -> Result<Vec<OrderView>, ServiceError> {
        let user = find_user(&*self.db, user_id).await?;
        let profile = ensure_profile(&*self.db, &user).await?;

        let orders = order::Entity::find()
            .filter(order::Column::ProfileId.eq(profile.id))
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .all(&*self.db)
            .await?;

        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            views.push(self.render(&*self.db, &user.email, &profile, order).await?);
        }
        Ok(views)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, user_id: i32, order_id: i32) -> Result<OrderView, ServiceError> {
        let user = find_user(&*self.db, user_id).await?;
        let profile = ensure_profile(&*self.db, &user).await?;
        let order = find_owned(&*self.db, &profile, order_id).await?;
        self.render(&*self.db, &user.email, &profile, order).await
    }

    /// Records delivery and payment details and accepts the order
    #[instrument(skip(self, input))]
    pub async fn confirm_order(
        &self,
        user_id: i32,
        order_id: i32,
        input: ConfirmOrderInput,
    ) -> Result<OrderView, ServiceError> {
        let user = find_user(&*self.db, user_id).await?;
        let profile = ensure_profile(&*self.db, &user).await?;
        let order = find_owned(&*self.db, &profile, order_id).await?;

        let mut active: order::ActiveModel = order.into();
        active.delivery_type = Set(input.delivery_type);
        active.payment_type = Set(input.payment_type);
        active.city = Set(input.city.trim().to_string());
        active.address = Set(input.address.trim().to_string());
        active.status = Set(OrderStatus::Accepted);
        let order = active.update(&*self.db).await?;

        counter!("shop.orders.confirmed", 1);
        self.event_sender
            .send_or_log(Event::OrderConfirmed(order.id))
            .await;
        info!(order_id = order.id, "Order accepted");
        self.render(&*self.db, &user.email, &profile, order).await
    }

    async fn render<C: ConnectionTrait>(
        &self,
        db: &C,
        email: &str,
        profile: &profile::Model,
        order: order::Model,
    ) -> Result<OrderView, ServiceError> {
        let lines: Vec<(order_item::Model, ProductModel)> = order_item::Entity::find()
            .find_also_related(Product)
            .filter(order_item::Column::OrderId.eq(order.id))
            .order_by_asc(order_item::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .filter_map(|(item, product)| product.map(|p| (item, p)))
            .collect();

        let total_cost = order_total(lines.iter().map(|(item, p)| (&p.price, item.count)));
        let products = render_with_quantities(db, &self.media, lines).await?;

        Ok(OrderView {
            id: order.id,
            created_at: order.created_at,
            full_name: profile.full_name.clone(),
            email: email.to_string(),
            phone: profile.phone.clone(),
            delivery_type: order.delivery_type,
            payment_type: order.payment_type,
            total_cost,
            status: order.status,
            city: order.city,
            address: order.address,
            products,
        })
    }
}

async fn find_owned<C: ConnectionTrait>(
    db: &C,
    profile: &profile::Model,
    order_id: i32,
) -> Result<order::Model, ServiceError> {
    order::Entity::find_by_id(order_id)
        .filter(order::Column::ProfileId.eq(profile.id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("order", order_id))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub delivery_type: DeliveryType,
    pub payment_type: PaymentType,
    #[schema(value_type = String)]
    pub total_cost: Decimal,
    pub status: OrderStatus,
    pub city: String,
    pub address: String,
    pub products: Vec<ProductShort>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmOrderInput {
    pub delivery_type: DeliveryType,
    pub payment_type: PaymentType,
    pub city: String,
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn total_is_price_times_count() {
        let prices = [dec!(10.50), dec!(3)];
        let total = order_total([(&prices[0], 2), (&prices[1], 5)]);
        assert_eq!(total, dec!(36.00));
    }

    #[test]
    fn empty_order_costs_nothing() {
        assert_eq!(order_total(std::iter::empty()), Decimal::ZERO);
    }
}
