//! Item and image domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use gavel_core::{ImageId, ItemId, UserId};

/// An auction listing (domain type).
#[derive(Debug, Clone)]
pub struct Item {
    /// Unique item ID.
    pub id: ItemId,
    /// Display name of the listing.
    pub name: String,
    /// Asking price.
    pub price: Decimal,
    /// Owner; set once at creation. The only fact authorization looks at.
    pub added_by: UserId,
    /// Attached images, in upload order.
    pub image_ids: Vec<ImageId>,
    /// When the item was listed.
    pub created_at: DateTime<Utc>,
}

/// An uploaded photo, owned by exactly one item through that item's
/// `image_ids` list.
#[derive(Debug, Clone)]
pub struct Image {
    /// Unique image ID.
    pub id: ImageId,
    /// Storage path relative to the public asset root.
    pub image_path: String,
}

/// One row of the `GET /items` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: ItemId,
    pub name: String,
    pub price: Decimal,
    /// One URL per attached image, `null` where the image record is missing.
    pub images: Vec<Option<String>>,
    /// Rendering hint for the front-end; not an authorization boundary.
    pub is_authored_by_current_user: bool,
}
