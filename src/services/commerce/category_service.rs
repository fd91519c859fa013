use crate::{
    entities::commerce::{category, category_image, Category, CategoryImage, CategoryModel},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        commerce::{category_tree::CategoryTree, product_cards::ImageView},
        media::{category_image_path, MediaStorage},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

/// Category tree browsing and administration
#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    media: MediaStorage,
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>, media: MediaStorage) -> Self {
        Self {
            db,
            event_sender,
            media,
        }
    }

    /// Loads every category into an in-memory tree
    pub async fn load_tree(&self) -> Result<CategoryTree, ServiceError> {
        load_tree(&*self.db).await
    }

    /// Nested category listing starting at the roots
    #[instrument(skip(self))]
    pub async fn list_tree(&self) -> Result<Vec<CategoryNode>, ServiceError> {
        let tree = self.load_tree().await?;
        let images: HashMap<i32, ImageView> = CategoryImage::find()
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|img| {
                (
                    img.category_id,
                    ImageView {
                        src: self.media.url(&img.src),
                        alt: img.alt,
                    },
                )
            })
            .collect();

        Ok(tree
            .roots()
            .iter()
            .filter_map(|id| build_node(&tree, &images, *id))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn create_category(
        &self,
        input: CreateCategoryInput,
    ) -> Result<CategoryModel, ServiceError> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(ServiceError::ValidationError(
                "category title cannot be blank".to_string(),
            ));
        }

        if let Some(parent_id) = input.parent {
            Category::find_by_id(parent_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| ServiceError::not_found("category", parent_id))?;
        }

        let slug = input
            .slug
            .map(|s| slugify(&s))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slugify(&title));

        let category = category::ActiveModel {
            title: Set(title),
            slug: Set(slug),
            parent_id: Set(input.parent),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        self.event_sender
            .send_or_log(Event::CategoryCreated(category.id))
            .await;
        info!(category_id = category.id, "Created category {}", category.title);
        Ok(category)
    }

    /// Stores the category icon and points the category at it, replacing
    /// any earlier file. The alt text is the category title.
    #[instrument(skip(self, bytes))]
    pub async fn set_image(
        &self,
        id: i32,
        filename: &str,
        bytes: &[u8],
    ) -> Result<ImageView, ServiceError> {
        if bytes.is_empty() {
            return Err(ServiceError::BadRequest("category image is empty".to_string()));
        }
        let category = Category::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("category", id))?;
        let existing = CategoryImage::find()
            .filter(category_image::Column::CategoryId.eq(id))
            .one(&*self.db)
            .await?;

        let src = category_image_path(id, filename);
        self.media.save(&src, bytes).await?;

        let previous = existing.as_ref().map(|img| img.src.clone());
        let stored = match existing {
            Some(img) => {
                let mut active: category_image::ActiveModel = img.into();
                active.src = Set(src.clone());
                active.alt = Set(category.title.clone());
                active.update(&*self.db).await
            }
            None => {
                category_image::ActiveModel {
                    category_id: Set(id),
                    src: Set(src.clone()),
                    alt: Set(category.title.clone()),
                    ..Default::default()
                }
                .insert(&*self.db)
                .await
            }
        };
        let image = match stored {
            Ok(image) => image,
            Err(e) => {
                if previous.as_deref() != Some(src.as_str()) {
                    if let Err(cleanup) = self.media.remove(&src).await {
                        warn!("Could not remove orphaned category image {}: {}", src, cleanup);
                    }
                }
                return Err(e.into());
            }
        };

        // only files this endpoint stored are ours to delete
        if let Some(previous) = previous.filter(|p| *p != src && p.starts_with("categories/")) {
            if let Err(e) = self.media.remove(&previous).await {
                warn!("Could not remove previous category image {}: {}", previous, e);
            }
        }

        info!(category_id = id, src = %image.src, "Stored category image");
        Ok(ImageView {
            src: self.media.url(&image.src),
            alt: image.alt,
        })
    }

    /// Deletes a leaf category and, through the foreign key, its products.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: i32) -> Result<(), ServiceError> {
        let category = Category::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("category", id))?;

        let children = Category::find()
            .filter(category::Column::ParentId.eq(id))
            .count(&*self.db)
            .await?;
        if children > 0 {
            return Err(ServiceError::Conflict(format!(
                "category {} still has {} subcategories",
                id, children
            )));
        }

        Category::delete_by_id(category.id).exec(&*self.db).await?;
        self.event_sender
            .send_or_log(Event::CategoryDeleted(id))
            .await;
        info!(category_id = id, "Deleted category");
        Ok(())
    }
}

pub(crate) async fn load_tree<C: ConnectionTrait>(db: &C) -> Result<CategoryTree, ServiceError> {
    Ok(CategoryTree::new(Category::find().all(db).await?))
}

fn build_node(
    tree: &CategoryTree,
    images: &HashMap<i32, ImageView>,
    id: i32,
) -> Option<CategoryNode> {
    let category = tree.get(id)?;
    Some(CategoryNode {
        id: category.id,
        title: category.title.clone(),
        image: images.get(&id).cloned(),
        subcategories: tree
            .children(id)
            .iter()
            .filter_map(|child| build_node(tree, images, *child))
            .collect(),
    })
}

/// Lowercase ASCII-ish slug; runs of separators collapse into one dash.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.trim().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Category with its nested subcategories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct CategoryNode {
    pub id: i32,
    pub title: String,
    pub image: Option<ImageView>,
    pub subcategories: Vec<CategoryNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryInput {
    pub title: String,
    pub parent: Option<i32>,
    pub slug: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Laptops", "laptops")]
    #[test_case("  Home & Garden ", "home-garden")]
    #[test_case("USB--C  cables!", "usb-c-cables")]
    #[test_case("Смартфоны 2024", "смартфоны-2024")]
    #[test_case("***", "")]
    fn slugify_cases(input: &str, expected: &str) {
        assert_eq!(slugify(input), expected);
    }

    #[test]
    fn nodes_nest_children_in_title_order() {
        let tree = CategoryTree::new(vec![
            CategoryModel {
                id: 1,
                title: "Electronics".into(),
                slug: "electronics".into(),
                parent_id: None,
            },
            CategoryModel {
                id: 2,
                title: "Phones".into(),
                slug: "phones".into(),
                parent_id: Some(1),
            },
            CategoryModel {
                id: 3,
                title: "Audio".into(),
                slug: "audio".into(),
                parent_id: Some(1),
            },
        ]);
        let mut images = HashMap::new();
        images.insert(
            3,
            ImageView {
                src: "/media/categories/category_3/a.png".into(),
                alt: "audio".into(),
            },
        );

        let node = build_node(&tree, &images, 1).unwrap();
        let titles: Vec<&str> = node.subcategories.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Audio", "Phones"]);
        assert!(node.image.is_none());
        assert_eq!(node.subcategories[0].image.as_ref().unwrap().alt, "audio");
    }
}
