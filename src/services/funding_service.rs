use crate::error::{AppError, AppResult, DomainError};
use crate::funding::{order_for_display, EventFunding, FundingView};
use crate::models::{Contribution, Event, NewEvent, NewFundItem, WishlistItem};
use crate::repositories::{EventRepository, FriendGroupRepository, UserRepository, WishlistRepository};
use crate::services::notifier::{self, Notifier};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Service for events, their fundraising ledger and wishlist bookings.
///
/// Every mutation locks the event row first, then any wishlist item rows,
/// inside one transaction.
pub struct FundingService {
    pool: PgPool,
    event_repo: Arc<EventRepository>,
    group_repo: Arc<FriendGroupRepository>,
    user_repo: Arc<UserRepository>,
    wishlist_repo: Arc<WishlistRepository>,
    notifier: Arc<Notifier>,
}

impl FundingService {
    pub fn new(
        pool: PgPool,
        event_repo: Arc<EventRepository>,
        group_repo: Arc<FriendGroupRepository>,
        user_repo: Arc<UserRepository>,
        wishlist_repo: Arc<WishlistRepository>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            pool,
            event_repo,
            group_repo,
            user_repo,
            wishlist_repo,
            notifier,
        }
    }

    /// Create an event; the creator joins it
    pub async fn create_event(&self, mut new: NewEvent) -> AppResult<Event> {
        info!("Creating event: group={}, title={}", new.group_id, new.title);

        new.title = new.title.trim().to_string();
        if new.title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        if self.group_repo.find_by_id(new.group_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Group {} not found", new.group_id)));
        }

        let funding = EventFunding::create(new)?;

        let mut tx = self.pool.begin().await?;
        self.event_repo.insert(&mut *tx, &funding.event).await?;
        self.event_repo
            .save_ledger(&mut *tx, funding.event.id, &funding.ledger)
            .await?;
        tx.commit().await?;

        info!("Created event {} ({})", funding.event.title, funding.event.id);
        Ok(funding.event)
    }

    /// Events of a group: upcoming soonest first, then past most recent first
    pub async fn list_group_events(&self, group_id: Uuid, today: NaiveDate) -> AppResult<Vec<Event>> {
        let mut events = self.event_repo.find_by_group(group_id).await?;
        order_for_display(&mut events, today);
        Ok(events)
    }

    /// Delete an event. Only the group host may; bookings are released.
    pub async fn delete_event(&self, event_id: Uuid, requester: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let event = self
            .event_repo
            .lock(&mut *tx, event_id)
            .await?
            .ok_or_else(|| event_not_found(event_id))?;
        let group = self
            .group_repo
            .find_by_id(event.group_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", event.group_id)))?;

        if !group.is_host(requester) {
            return Err(DomainError::NotAuthorized(
                "only the group host can delete events".to_string(),
            )
            .into());
        }

        let released = self.wishlist_repo.unbook_all_for_event(&mut *tx, event_id).await?;
        self.event_repo.delete(&mut *tx, event_id).await?;
        tx.commit().await?;

        info!("Deleted event {} (released {} bookings)", event_id, released);
        Ok(())
    }

    /// Read-only: takes no row locks
    pub async fn funding_view(&self, event_id: Uuid, requester: Uuid) -> AppResult<FundingView> {
        let event = self
            .event_repo
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| event_not_found(event_id))?;

        let mut conn = self.pool.acquire().await?;
        let ledger = self.event_repo.load_ledger(&mut conn, event_id).await?;
        let bookings = self
            .wishlist_repo
            .find_booked_for_event(&mut conn, event_id)
            .await?;

        Ok(EventFunding::new(event, ledger, bookings).view(requester)?)
    }

    /// Claim a payment. It stays PENDING until the organizer confirms it.
    pub async fn contribute(&self, event_id: Uuid, user_id: Uuid, amount: Decimal) -> AppResult<FundingView> {
        let mut tx = self.pool.begin().await?;
        let mut funding = self.lock_funding(&mut *tx, event_id).await?;

        let contribution = funding.contribute(user_id, amount)?;
        self.event_repo
            .save_ledger(&mut *tx, event_id, &funding.ledger)
            .await?;
        tx.commit().await?;

        info!(
            "Contribution {} of {} recorded: event={}, user={}",
            contribution.id, amount, event_id, user_id
        );
        Ok(funding.view(user_id)?)
    }

    pub async fn confirm_contribution(
        &self,
        event_id: Uuid,
        contribution_id: Uuid,
        requester: Uuid,
    ) -> AppResult<FundingView> {
        let mut tx = self.pool.begin().await?;
        let mut funding = self.lock_funding(&mut *tx, event_id).await?;

        let contribution = funding.confirm(requester, contribution_id)?;
        self.event_repo
            .save_ledger(&mut *tx, event_id, &funding.ledger)
            .await?;
        tx.commit().await?;

        info!("Contribution {} confirmed by {}", contribution_id, requester);
        self.notify_contributor(&funding.event, &contribution, notifier::contribution_confirmed_message)
            .await;
        Ok(funding.view(requester)?)
    }

    pub async fn reject_contribution(
        &self,
        event_id: Uuid,
        contribution_id: Uuid,
        requester: Uuid,
    ) -> AppResult<FundingView> {
        let mut tx = self.pool.begin().await?;
        let mut funding = self.lock_funding(&mut *tx, event_id).await?;

        let contribution = funding.reject(requester, contribution_id)?;
        self.event_repo
            .save_ledger(&mut *tx, event_id, &funding.ledger)
            .await?;
        tx.commit().await?;

        info!("Contribution {} rejected by {}", contribution_id, requester);
        self.notify_contributor(&funding.event, &contribution, notifier::contribution_rejected_message)
            .await;
        Ok(funding.view(requester)?)
    }

    pub async fn toggle_participation(&self, event_id: Uuid, user_id: Uuid) -> AppResult<FundingView> {
        let mut tx = self.pool.begin().await?;
        let mut funding = self.lock_funding(&mut *tx, event_id).await?;

        let status = funding.toggle_participation(user_id)?;
        self.event_repo
            .save_ledger(&mut *tx, event_id, &funding.ledger)
            .await?;
        tx.commit().await?;

        info!("User {} is now {} in event {}", user_id, status.as_str(), event_id);
        Ok(funding.view(user_id)?)
    }

    pub async fn set_payment_info(&self, event_id: Uuid, user_id: Uuid, info: &str) -> AppResult<FundingView> {
        let info = info.trim();
        if info.is_empty() {
            return Err(AppError::Validation("Payment info is required".to_string()));
        }

        let mut tx = self.pool.begin().await?;
        let mut funding = self.lock_funding(&mut *tx, event_id).await?;

        funding.set_payment_info(user_id, info.to_string())?;
        self.event_repo.update(&mut *tx, &funding.event).await?;
        tx.commit().await?;

        info!("Payment info of event {} set by {}", event_id, user_id);
        Ok(funding.view(user_id)?)
    }

    pub async fn set_target_amount(&self, event_id: Uuid, user_id: Uuid, amount: Decimal) -> AppResult<FundingView> {
        let mut tx = self.pool.begin().await?;
        let mut funding = self.lock_funding(&mut *tx, event_id).await?;

        funding.set_target_amount(user_id, amount)?;
        self.event_repo.update(&mut *tx, &funding.event).await?;
        tx.commit().await?;

        info!("Target of event {} set to {} by {}", event_id, amount, user_id);
        Ok(funding.view(user_id)?)
    }

    /// The beneficiary's wishlist, for others to book from
    pub async fn event_wishlist(&self, event_id: Uuid, requester: Uuid) -> AppResult<Vec<WishlistItem>> {
        let event = self
            .event_repo
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| event_not_found(event_id))?;

        if event.is_beneficiary(requester) {
            return Err(DomainError::BeneficiaryAccessDenied.into());
        }
        let beneficiary_id = event
            .beneficiary_id
            .ok_or_else(|| AppError::NotFound(format!("Event {} has no beneficiary", event_id)))?;

        Ok(self.wishlist_repo.find_by_owner(beneficiary_id).await?)
    }

    /// Book an item to buy it yourself
    pub async fn book_item(&self, event_id: Uuid, item_id: Uuid, user_id: Uuid) -> AppResult<WishlistItem> {
        let mut tx = self.pool.begin().await?;
        let mut funding = self.lock_funding(&mut *tx, event_id).await?;
        let mut item = self.lock_item(&mut *tx, item_id).await?;

        funding.book_individual(user_id, &mut item)?;
        self.wishlist_repo.save_booking(&mut *tx, &item).await?;
        tx.commit().await?;

        info!("Item {} booked by {} for event {}", item_id, user_id, event_id);
        Ok(item)
    }

    /// Book an item for group funding; its price becomes the event target
    pub async fn fund_item(&self, event_id: Uuid, item_id: Uuid, user_id: Uuid) -> AppResult<FundingView> {
        let mut tx = self.pool.begin().await?;
        let mut funding = self.lock_funding(&mut *tx, event_id).await?;
        let mut item = self.lock_item(&mut *tx, item_id).await?;

        funding.book_group_funding(user_id, &mut item)?;
        self.wishlist_repo.save_booking(&mut *tx, &item).await?;
        self.event_repo.update(&mut *tx, &funding.event).await?;
        tx.commit().await?;

        info!(
            "Item {} chosen for group funding of event {}, target now {}",
            item_id, event_id, funding.event.target_amount
        );
        Ok(funding.view(user_id)?)
    }

    /// Add a gift idea straight into the group funding; its price adds to the target
    pub async fn add_manual_fund_item(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        mut new: NewFundItem,
    ) -> AppResult<WishlistItem> {
        new.title = new.title.trim().to_string();
        if new.title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }

        let mut tx = self.pool.begin().await?;
        let mut funding = self.lock_funding(&mut *tx, event_id).await?;

        let item = funding.add_manual_fund_item(user_id, new)?;
        self.wishlist_repo.insert(&mut *tx, &item).await?;
        self.event_repo.update(&mut *tx, &funding.event).await?;
        tx.commit().await?;

        info!(
            "Manual fund item {} added to event {}, target now {}",
            item.id, event_id, funding.event.target_amount
        );
        Ok(item)
    }

    /// Release a booking held for the event
    pub async fn unbook_item(&self, event_id: Uuid, item_id: Uuid, user_id: Uuid) -> AppResult<WishlistItem> {
        let mut tx = self.pool.begin().await?;
        let mut funding = self.lock_funding(&mut *tx, event_id).await?;
        let mut item = self.lock_item(&mut *tx, item_id).await?;

        let released = funding.unbook(user_id, &mut item)?;
        self.wishlist_repo.save_booking(&mut *tx, &item).await?;
        self.event_repo.update(&mut *tx, &funding.event).await?;
        tx.commit().await?;

        info!(
            "Item {} unbooked by {} ({} booking by {})",
            item_id,
            user_id,
            released.mode.as_str(),
            released.booked_by
        );
        Ok(item)
    }

    async fn lock_funding(&self, conn: &mut PgConnection, event_id: Uuid) -> AppResult<EventFunding> {
        let event = self
            .event_repo
            .lock(conn, event_id)
            .await?
            .ok_or_else(|| event_not_found(event_id))?;
        let ledger = self.event_repo.load_ledger(conn, event_id).await?;
        let bookings = self.wishlist_repo.find_booked_for_event(conn, event_id).await?;

        Ok(EventFunding::new(event, ledger, bookings))
    }

    async fn lock_item(&self, conn: &mut PgConnection, item_id: Uuid) -> AppResult<WishlistItem> {
        self.wishlist_repo
            .lock(conn, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Wishlist item {} not found", item_id)))
    }

    async fn notify_contributor(
        &self,
        event: &Event,
        contribution: &Contribution,
        message: fn(&Event, &Contribution) -> String,
    ) {
        if !self.notifier.is_enabled() {
            return;
        }

        match self.user_repo.find_by_id(contribution.user_id).await {
            Ok(Some(user)) => {
                self.notifier
                    .broadcast(std::slice::from_ref(&user), &message(event, contribution))
                    .await
            }
            Ok(None) => warn!("Contributor {} no longer exists", contribution.user_id),
            Err(e) => warn!("Could not load contributor {}: {}", contribution.user_id, e),
        }
    }
}

fn event_not_found(event_id: Uuid) -> AppError {
    AppError::NotFound(format!("Event {} not found", event_id))
}
