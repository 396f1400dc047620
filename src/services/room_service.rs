use crate::config::DrawConfig;
use crate::error::{AppError, AppResult, DomainError, RepositoryError};
use crate::exchange::{ensure_scope_free, JoinOutcome};
use crate::models::{GiftExchangeRoom, NewRoom, RoomStatus, User, Wish, WishlistItem};
use crate::repositories::{
    EventRepository, FriendGroupRepository, RoomRepository, UserRepository, WishlistRepository,
};
use crate::services::notifier::{self, Notifier};
use chrono::NaiveDate;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

/// Room selector: by id for Secret Santa, by event for Angel Guardian
#[derive(Debug, Clone, Copy)]
pub enum RoomRef {
    Id(Uuid),
    Event(Uuid),
}

/// Who the requester gives to, resolved for display
#[derive(Debug, Clone, Serialize)]
pub struct TargetView {
    pub receiver: User,
    pub wish_text: Option<String>,
    pub wishlist_item: Option<WishlistItem>,
}

/// Service for Secret Santa and Angel Guardian rooms
pub struct RoomService {
    pool: PgPool,
    room_repo: Arc<RoomRepository>,
    event_repo: Arc<EventRepository>,
    group_repo: Arc<FriendGroupRepository>,
    user_repo: Arc<UserRepository>,
    wishlist_repo: Arc<WishlistRepository>,
    notifier: Arc<Notifier>,
    draw_config: DrawConfig,
    rng: Mutex<ChaCha8Rng>,
}

impl RoomService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        room_repo: Arc<RoomRepository>,
        event_repo: Arc<EventRepository>,
        group_repo: Arc<FriendGroupRepository>,
        user_repo: Arc<UserRepository>,
        wishlist_repo: Arc<WishlistRepository>,
        notifier: Arc<Notifier>,
        draw_config: DrawConfig,
    ) -> Self {
        let rng = Mutex::new(draw_config.random_source.rng());
        Self {
            pool,
            room_repo,
            event_repo,
            group_repo,
            user_repo,
            wishlist_repo,
            notifier,
            draw_config,
            rng,
        }
    }

    /// Open a group-wide Secret Santa room
    pub async fn create_room(
        &self,
        group_id: Uuid,
        admin_id: Uuid,
        title: &str,
        budget: Option<String>,
        deadline: Option<NaiveDate>,
    ) -> AppResult<GiftExchangeRoom> {
        info!("Creating Secret Santa room: group={}, admin={}", group_id, admin_id);

        let title = required_title(title)?;
        if self.group_repo.find_by_id(group_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Group {} not found", group_id)));
        }

        self.open_room(NewRoom {
            group_id,
            event_id: None,
            admin_id,
            title,
            budget,
            deadline,
        })
        .await
    }

    /// Open the Angel Guardian room of an event
    pub async fn create_angel_room(
        &self,
        event_id: Uuid,
        admin_id: Uuid,
        title: Option<&str>,
        budget: Option<String>,
        deadline: Option<NaiveDate>,
    ) -> AppResult<GiftExchangeRoom> {
        info!("Creating Angel Guardian room: event={}, admin={}", event_id, admin_id);

        let event = self
            .event_repo
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;

        let title = match title {
            Some(title) => required_title(title)?,
            None => format!("Angel Guardian: {}", event.title),
        };

        self.open_room(NewRoom {
            group_id: event.group_id,
            event_id: Some(event_id),
            admin_id,
            title,
            budget,
            deadline,
        })
        .await
    }

    async fn open_room(&self, new: NewRoom) -> AppResult<GiftExchangeRoom> {
        let mut tx = self.pool.begin().await?;

        let active = self
            .room_repo
            .find_active_in_scope(&mut *tx, new.group_id, new.event_id)
            .await?;
        ensure_scope_free(&active, new.group_id, new.event_id)?;

        let room = GiftExchangeRoom::open(new);
        match self.room_repo.insert(&mut *tx, &room).await {
            Ok(()) => {}
            // Lost the race against a concurrent create in the same scope
            Err(RepositoryError::Duplicate(_)) => return Err(DomainError::DuplicateRoom.into()),
            Err(e) => return Err(e.into()),
        }
        tx.commit().await?;

        info!("Created room {} ({:?})", room.id, room.kind());
        Ok(room)
    }

    /// Secret Santa rooms of a group
    pub async fn list_group_rooms(&self, group_id: Uuid) -> AppResult<Vec<GiftExchangeRoom>> {
        Ok(self.room_repo.find_santa_by_group(group_id).await?)
    }

    pub async fn get_room(&self, room: RoomRef) -> AppResult<GiftExchangeRoom> {
        let found = match room {
            RoomRef::Id(id) => self.room_repo.find_by_id(id).await?,
            RoomRef::Event(event_id) => self.room_repo.find_by_event(event_id).await?,
        };
        found.ok_or_else(|| not_found(room))
    }

    /// Join a waiting room, or replace the wish of someone already in it
    pub async fn join_room(&self, room: RoomRef, user_id: Uuid, wish: Wish) -> AppResult<GiftExchangeRoom> {
        if let Some(item_id) = wish.wishlist_item_id {
            let item = self
                .wishlist_repo
                .find_by_id(item_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Wishlist item {} not found", item_id)))?;
            if item.owner_id != user_id {
                return Err(DomainError::NotAuthorized(
                    "a wish can only reference your own wishlist".to_string(),
                )
                .into());
            }
        }

        let mut tx = self.pool.begin().await?;
        let mut locked = self.lock_room(&mut *tx, room).await?;

        let outcome = locked.join(user_id, wish)?;
        if let Some(participant) = locked.participant(user_id) {
            self.room_repo
                .upsert_participant(&mut *tx, locked.id, participant)
                .await?;
        }
        tx.commit().await?;

        match outcome {
            JoinOutcome::Joined => info!("User {} joined room {}", user_id, locked.id),
            JoinOutcome::WishUpdated => info!("User {} updated wish in room {}", user_id, locked.id),
        }
        Ok(locked)
    }

    /// Run the draw. Only the admin may, and only once.
    pub async fn draw_room(&self, room: RoomRef, requester: Uuid) -> AppResult<GiftExchangeRoom> {
        let mut tx = self.pool.begin().await?;
        let mut locked = self.lock_room(&mut *tx, room).await?;

        {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| AppError::Message("Draw RNG lock poisoned".to_string()))?;
            locked.draw(requester, self.draw_config.strategy, &mut *rng)?;
        }

        self.room_repo.update_status(&mut *tx, &locked).await?;
        tx.commit().await?;

        info!(
            "Draw completed for room {}: {} participants, strategy={}",
            locked.id,
            locked.participants.len(),
            self.draw_config.strategy.as_str()
        );

        self.notify_draw(&locked).await;
        Ok(locked)
    }

    /// The requester's assigned receiver with their wish
    pub async fn get_target(&self, room: RoomRef, requester: Uuid) -> AppResult<TargetView> {
        let found = self.get_room(room).await?;
        let target = found.target_of(requester)?;

        let receiver = self
            .user_repo
            .find_by_id(target.receiver_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", target.receiver_id)))?;

        let wishlist_item = match target.wish.wishlist_item_id {
            Some(item_id) => self.wishlist_repo.find_by_id(item_id).await?,
            None => None,
        };

        Ok(TargetView {
            receiver,
            wish_text: target.wish.text,
            wishlist_item,
        })
    }

    /// Mark drawn rooms whose deadline or event date has passed as completed
    pub async fn complete_expired_rooms(&self, today: NaiveDate) -> AppResult<usize> {
        let due: Vec<Uuid> = self
            .room_repo
            .find_drawn()
            .await?
            .into_iter()
            .filter(|(room, event_date)| room.is_due_for_completion(today, *event_date))
            .map(|(room, _)| room.id)
            .collect();

        let mut completed = 0;
        for room_id in due {
            match self.complete_room(room_id).await {
                Ok(true) => completed += 1,
                Ok(false) => {}
                Err(e) => warn!("Failed to complete room {}: {}", room_id, e),
            }
        }

        if completed > 0 {
            info!("Completed {} expired rooms", completed);
        }
        Ok(completed)
    }

    async fn complete_room(&self, room_id: Uuid) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;
        let Some(mut room) = self.room_repo.lock(&mut *tx, room_id).await? else {
            return Ok(false);
        };
        if room.status != RoomStatus::Drawn {
            return Ok(false);
        }
        room.complete()?;
        self.room_repo.update_status(&mut *tx, &room).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn lock_room(&self, conn: &mut PgConnection, room: RoomRef) -> AppResult<GiftExchangeRoom> {
        let found = match room {
            RoomRef::Id(id) => self.room_repo.lock(conn, id).await?,
            RoomRef::Event(event_id) => self.room_repo.lock_by_event(conn, event_id).await?,
        };
        found.ok_or_else(|| not_found(room))
    }

    async fn notify_draw(&self, room: &GiftExchangeRoom) {
        if !self.notifier.is_enabled() {
            return;
        }

        let ids: Vec<Uuid> = room.participant_ids().into_iter().collect();
        match self.user_repo.find_by_ids(&ids).await {
            Ok(users) => {
                let text = notifier::draw_completed_message(room.kind(), &room.title);
                self.notifier.broadcast(&users, &text).await;
            }
            Err(e) => warn!("Could not load participants of room {} for notification: {}", room.id, e),
        }
    }
}

fn required_title(title: &str) -> AppResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    Ok(title.to_string())
}

fn not_found(room: RoomRef) -> AppError {
    match room {
        RoomRef::Id(id) => AppError::NotFound(format!("Room {} not found", id)),
        RoomRef::Event(event_id) => AppError::NotFound(format!("No room for event {}", event_id)),
    }
}
