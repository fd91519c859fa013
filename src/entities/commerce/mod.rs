//! Catalog and basket entities
pub mod basket;
pub mod basket_item;
pub mod category;
pub mod category_image;
pub mod product;
pub mod product_image;
pub mod product_tag;
pub mod review;
pub mod sale;
pub mod specification;
pub mod tag;

pub use basket::{Entity as Basket, Model as BasketModel};
pub use basket_item::{Entity as BasketItem, Model as BasketItemModel};
pub use category::{Entity as Category, Model as CategoryModel};
pub use category_image::{Entity as CategoryImage, Model as CategoryImageModel};
pub use product::{Entity as Product, Model as ProductModel};
pub use product_image::{Entity as ProductImage, Model as ProductImageModel};
pub use product_tag::{Entity as ProductTag, Model as ProductTagModel};
pub use review::{Entity as Review, Model as ReviewModel};
pub use sale::{Entity as Sale, Model as SaleModel};
pub use specification::{Entity as Specification, Model as SpecificationModel};
pub use tag::{Entity as Tag, Model as TagModel};
