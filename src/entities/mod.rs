pub mod commerce;
pub mod order;
pub mod order_item;
pub mod profile;
pub mod profile_avatar;

pub use order::{DeliveryType, OrderStatus, PaymentType};
