//! Item route handlers.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde_json::json;

use gavel_core::ItemId;

use crate::error::{AppError, Result};
use crate::middleware::auth::{CurrentUser, OptionalUser};
use crate::models::item::ItemView;
use crate::services::listings::ListingService;
use crate::state::AppState;
use crate::uploads::{StoredUpload, UploadStore};

/// List all items with their images.
pub async fn index(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
) -> Result<Json<Vec<ItemView>>> {
    let service = ListingService::new(state.pool());
    let views = service.list(viewer.map(|user| user.id)).await?;

    Ok(Json(views))
}

/// Create an item from a multipart form: `name`, `price`, and any number of
/// `images` file fields.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let fields = collect_fields(state.uploads(), multipart).await?;

    let service = ListingService::new(state.pool());
    let item_id = service
        .add(user.id, &fields.name, fields.price, &fields.uploads)
        .await?;

    tracing::info!(%item_id, owner = %user.id, "item listed");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Item added successfully" })),
    ))
}

/// Delete an owned item and every image it references.
pub async fn destroy(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    let service = ListingService::new(state.pool());
    service.delete(user.id, ItemId::new(id)).await?;

    Ok(Json(json!({ "message": "Item deleted successfully" })))
}

/// Parsed multipart fields for `POST /items`.
struct CreateItemFields {
    name: String,
    price: Decimal,
    uploads: Vec<StoredUpload>,
}

/// Drain the multipart stream, persisting file fields as they arrive so
/// upload order is preserved in the collected paths.
async fn collect_fields(
    uploads: &UploadStore,
    mut multipart: Multipart,
) -> Result<CreateItemFields> {
    let mut name = None;
    let mut price = None;
    let mut stored = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        match field.name() {
            Some("name") => name = Some(field.text().await.map_err(bad_request)?),
            Some("price") => {
                let raw = field.text().await.map_err(bad_request)?;
                price = Some(
                    raw.trim()
                        .parse::<Decimal>()
                        .map_err(|_| AppError::BadRequest("invalid price".to_owned()))?,
                );
            }
            Some("images") => {
                let file_name = field.file_name().map(ToOwned::to_owned);
                let bytes = field.bytes().await.map_err(bad_request)?;
                stored.push(uploads.save(file_name.as_deref(), &bytes).await?);
            }
            // unknown fields are ignored
            _ => {}
        }
    }

    Ok(CreateItemFields {
        name: name.ok_or_else(|| AppError::BadRequest("missing item name".to_owned()))?,
        price: price.ok_or_else(|| AppError::BadRequest("missing item price".to_owned()))?,
        uploads: stored,
    })
}

fn bad_request(err: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(err.to_string())
}
