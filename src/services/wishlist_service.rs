use crate::error::{AppError, AppResult, DomainError};
use crate::funding::{release, validate_amount};
use crate::models::{NewWishlistItem, WishlistItem};
use crate::repositories::{EventRepository, UserRepository, WishlistRepository};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Service for users' own wishlists.
///
/// Deleting a booked item locks its event before the item, in the same
/// order as [`FundingService`](super::FundingService).
pub struct WishlistService {
    pool: PgPool,
    wishlist_repo: Arc<WishlistRepository>,
    user_repo: Arc<UserRepository>,
    event_repo: Arc<EventRepository>,
}

impl WishlistService {
    pub fn new(
        pool: PgPool,
        wishlist_repo: Arc<WishlistRepository>,
        user_repo: Arc<UserRepository>,
        event_repo: Arc<EventRepository>,
    ) -> Self {
        Self {
            pool,
            wishlist_repo,
            user_repo,
            event_repo,
        }
    }

    /// Add an unbooked item to the owner's wishlist
    pub async fn add_item(&self, owner_id: Uuid, mut new: NewWishlistItem) -> AppResult<WishlistItem> {
        new.title = new.title.trim().to_string();
        if new.title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        if let Some(price) = new.price {
            validate_amount(price)?;
        }
        if self.user_repo.find_by_id(owner_id).await?.is_none() {
            return Err(AppError::NotFound(format!("User {} not found", owner_id)));
        }

        let item = WishlistItem::new(owner_id, new);
        let mut conn = self.pool.acquire().await?;
        self.wishlist_repo.insert(&mut conn, &item).await?;

        info!("User {} added wishlist item {} ({})", owner_id, item.title, item.id);
        Ok(item)
    }

    pub async fn list_items(&self, owner_id: Uuid) -> AppResult<Vec<WishlistItem>> {
        Ok(self.wishlist_repo.find_by_owner(owner_id).await?)
    }

    /// Delete an item. Only its owner may; a booking is released first.
    pub async fn delete_item(&self, item_id: Uuid, requester: Uuid) -> AppResult<()> {
        let item = self
            .wishlist_repo
            .find_by_id(item_id)
            .await?
            .ok_or_else(|| item_not_found(item_id))?;

        if item.owner_id != requester {
            return Err(DomainError::NotAuthorized(
                "only the owner can delete a wishlist item".to_string(),
            )
            .into());
        }

        let mut tx = self.pool.begin().await?;
        let mut event = match item.booking {
            Some(booking) => Some(
                self.event_repo
                    .lock(&mut *tx, booking.event_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Event {} not found", booking.event_id)))?,
            ),
            None => None,
        };
        let mut locked = self
            .wishlist_repo
            .lock(&mut *tx, item_id)
            .await?
            .ok_or_else(|| item_not_found(item_id))?;

        match (locked.booking, event.as_mut()) {
            (None, _) => {}
            (Some(booking), Some(event)) if booking.event_id == event.id => {
                release(event, &mut locked)?;
                self.event_repo.update(&mut *tx, event).await?;
                info!(
                    "Released {} booking of item {} for event {}",
                    booking.mode.as_str(),
                    item_id,
                    event.id
                );
            }
            // Booked by someone else after the first read
            (Some(_), _) => return Err(DomainError::AlreadyBooked.into()),
        }

        self.wishlist_repo.delete(&mut *tx, item_id).await?;
        tx.commit().await?;

        info!("User {} deleted wishlist item {}", requester, item_id);
        Ok(())
    }
}

fn item_not_found(item_id: Uuid) -> AppError {
    AppError::NotFound(format!("Wishlist item {} not found", item_id))
}
