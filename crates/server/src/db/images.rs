//! Image repository for database operations.

use sqlx::PgPool;

use gavel_core::ImageId;

use super::RepositoryError;
use crate::models::item::Image;

#[derive(sqlx::FromRow)]
struct ImageRow {
    id: i32,
    image_path: String,
}

impl From<ImageRow> for Image {
    fn from(row: ImageRow) -> Self {
        Self {
            id: ImageId::new(row.id),
            image_path: row.image_path,
        }
    }
}

/// Repository for image database operations.
pub struct ImageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ImageRepository<'a> {
    /// Create a new image repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist one image path, returning the generated ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, image_path: &str) -> Result<ImageId, RepositoryError> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO images (image_path) VALUES ($1) RETURNING id",
        )
        .bind(image_path)
        .fetch_one(self.pool)
        .await?;

        Ok(ImageId::new(id))
    }

    /// All images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Image>, RepositoryError> {
        let rows = sqlx::query_as::<_, ImageRow>("SELECT id, image_path FROM images")
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Image::from).collect())
    }

    /// Delete a batch of images by id set.
    ///
    /// # Returns
    ///
    /// Returns the number of rows deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_by_ids(&self, ids: &[ImageId]) -> Result<u64, RepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let raw: Vec<i32> = ids.iter().map(ImageId::as_i32).collect();
        let result = sqlx::query("DELETE FROM images WHERE id = ANY($1)")
            .bind(raw)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
