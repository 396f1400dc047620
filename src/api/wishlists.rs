use crate::api::UserQuery;
use crate::error::AppResult;
use crate::models::{NewWishlistItem, WishlistItem};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// `GET /api/wishlists/:id` takes a user id, `DELETE` an item id
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/wishlists", post(add_item))
        .route("/api/wishlists/:id", get(list_items).delete(delete_item))
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<Decimal>,
}

async fn add_item(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddItemRequest>,
) -> AppResult<(StatusCode, Json<WishlistItem>)> {
    let item = state
        .wishlist_service
        .add_item(
            req.user_id,
            NewWishlistItem {
                title: req.title,
                description: req.description,
                url: req.url,
                image_url: req.image_url,
                price: req.price,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn list_items(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<WishlistItem>>> {
    let items = state.wishlist_service.list_items(user_id).await?;
    Ok(Json(items))
}

async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> AppResult<StatusCode> {
    state
        .wishlist_service
        .delete_item(item_id, query.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
