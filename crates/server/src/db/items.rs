//! Item repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use gavel_core::{ImageId, ItemId, UserId};

use super::RepositoryError;
use crate::models::item::Item;

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i32,
    name: String,
    price: Decimal,
    added_by: i32,
    image_ids: Vec<i32>,
    created_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Self {
            id: ItemId::new(row.id),
            name: row.name,
            price: row.price,
            added_by: UserId::new(row.added_by),
            image_ids: row.image_ids.into_iter().map(ImageId::new).collect(),
            created_at: row.created_at,
        }
    }
}

/// Repository for item database operations.
pub struct ItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ItemRepository<'a> {
    /// Create a new item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All items, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Item>, RepositoryError> {
        let rows = sqlx::query_as::<_, ItemRow>(
            "SELECT id, name, price, added_by, image_ids, created_at
             FROM items
             ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    /// Get an item by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            "SELECT id, name, price, added_by, image_ids, created_at
             FROM items
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Item::from))
    }

    /// Create an item owned by `added_by`, referencing `image_ids` in order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        name: &str,
        price: Decimal,
        added_by: UserId,
        image_ids: &[ImageId],
    ) -> Result<ItemId, RepositoryError> {
        let ids: Vec<i32> = image_ids.iter().map(ImageId::as_i32).collect();

        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO items (name, price, added_by, image_ids)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(name)
        .bind(price)
        .bind(added_by.as_i32())
        .bind(ids)
        .fetch_one(self.pool)
        .await?;

        Ok(ItemId::new(id))
    }

    /// Delete an item by its ID.
    ///
    /// # Returns
    ///
    /// Returns `true` if the item was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
