//! Listing service.
//!
//! Item create/delete with image ownership, cascading deletion, and the
//! owner-only authorization rule.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use gavel_core::{ImageId, ItemId, UserId};

use crate::db::RepositoryError;
use crate::db::images::ImageRepository;
use crate::db::items::ItemRepository;
use crate::models::item::{Item, ItemView};
use crate::uploads::StoredUpload;

/// Errors that can occur during listing operations.
#[derive(Debug, Error)]
pub enum ListingError {
    /// No item with the requested id.
    #[error("item not found")]
    NotFound,

    /// The requester is not the item's owner. Ownership is the only
    /// authorization rule; there are no roles or admin overrides.
    #[error("not the owner of this item")]
    NotOwner,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Listing service over the item and image collections.
pub struct ListingService<'a> {
    items: ItemRepository<'a>,
    images: ImageRepository<'a>,
}

impl<'a> ListingService<'a> {
    /// Create a new listing service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            items: ItemRepository::new(pool),
            images: ImageRepository::new(pool),
        }
    }

    /// All listings joined with their images.
    ///
    /// Two reads (items, images) joined in memory. A dangling image reference
    /// degrades to `null` in the view rather than failing the whole listing.
    ///
    /// # Errors
    ///
    /// Returns `ListingError::Repository` if either read fails.
    pub async fn list(&self, viewer: Option<UserId>) -> Result<Vec<ItemView>, ListingError> {
        let items = self.items.list_all().await?;
        let images = self.images.list_all().await?;

        let paths: HashMap<ImageId, String> = images
            .into_iter()
            .map(|image| (image.id, image.image_path))
            .collect();

        Ok(build_views(items, &paths, viewer))
    }

    /// Create a listing: one image row per stored upload (upload order
    /// preserved), then the item row owned by `owner`.
    ///
    /// Requires a resolved identity, which the authorization gate enforces
    /// upstream; creation itself has no further ownership check.
    ///
    /// # Errors
    ///
    /// Returns `ListingError::Repository` if any insert fails.
    pub async fn add(
        &self,
        owner: UserId,
        name: &str,
        price: Decimal,
        uploads: &[StoredUpload],
    ) -> Result<ItemId, ListingError> {
        let mut image_ids = Vec::with_capacity(uploads.len());
        for upload in uploads {
            image_ids.push(self.images.create(&upload.path).await?);
        }

        let item_id = self.items.create(name, price, owner, &image_ids).await?;
        Ok(item_id)
    }

    /// Delete a listing and every image it references.
    ///
    /// Images are deleted before the item: a crash between the two steps
    /// leaves an imageless item rather than a dangling image reference.
    ///
    /// # Errors
    ///
    /// Returns `ListingError::NotFound` if the item does not exist.
    /// Returns `ListingError::NotOwner` if `requester` did not create it.
    /// Returns `ListingError::Repository` if a delete fails.
    pub async fn delete(&self, requester: UserId, item_id: ItemId) -> Result<(), ListingError> {
        let item = self
            .items
            .get(item_id)
            .await?
            .ok_or(ListingError::NotFound)?;

        if item.added_by != requester {
            return Err(ListingError::NotOwner);
        }

        self.images.delete_by_ids(&item.image_ids).await?;
        self.items.delete(item_id).await?;

        Ok(())
    }
}

/// Join items with their image paths into response views.
fn build_views(
    items: Vec<Item>,
    paths: &HashMap<ImageId, String>,
    viewer: Option<UserId>,
) -> Vec<ItemView> {
    items
        .into_iter()
        .map(|item| {
            let images = item
                .image_ids
                .iter()
                .map(|id| paths.get(id).map(|path| format!("/public/{path}")))
                .collect();

            ItemView {
                id: item.id,
                name: item.name,
                price: item.price,
                images,
                is_authored_by_current_user: viewer.is_some_and(|v| v == item.added_by),
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn item(id: i32, added_by: i32, image_ids: &[i32]) -> Item {
        Item {
            id: ItemId::new(id),
            name: format!("item-{id}"),
            price: Decimal::new(1999, 2),
            added_by: UserId::new(added_by),
            image_ids: image_ids.iter().copied().map(ImageId::new).collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn views_join_images_in_upload_order() {
        let mut paths = HashMap::new();
        paths.insert(ImageId::new(10), "uploads/a.jpg".to_owned());
        paths.insert(ImageId::new(11), "uploads/b.jpg".to_owned());

        let views = build_views(vec![item(1, 5, &[11, 10])], &paths, None);

        assert_eq!(
            views[0].images,
            vec![
                Some("/public/uploads/b.jpg".to_owned()),
                Some("/public/uploads/a.jpg".to_owned()),
            ]
        );
    }

    #[test]
    fn dangling_image_reference_degrades_to_null() {
        let mut paths = HashMap::new();
        paths.insert(ImageId::new(10), "uploads/a.jpg".to_owned());

        let views = build_views(vec![item(1, 5, &[10, 99])], &paths, None);

        assert_eq!(
            views[0].images,
            vec![Some("/public/uploads/a.jpg".to_owned()), None]
        );
    }

    #[test]
    fn ownership_flag_follows_the_viewer() {
        let paths = HashMap::new();
        let items = vec![item(1, 5, &[]), item(2, 6, &[])];

        let views = build_views(items.clone(), &paths, Some(UserId::new(5)));
        assert!(views[0].is_authored_by_current_user);
        assert!(!views[1].is_authored_by_current_user);

        let anonymous = build_views(items, &paths, None);
        assert!(anonymous.iter().all(|v| !v.is_authored_by_current_user));
    }
}
