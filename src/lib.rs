//! Togetherly Backend Library
//!
//! Group gifting: Secret Santa and Angel Guardian draws, event fundraising
//! and wishlist bookings. This module exposes the backend components for
//! use by the binary and by tests.

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod exchange;
pub mod funding;
pub mod models;
pub mod repositories;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult, DomainError};

use database::Database;
use repositories::*;
use services::{FundingService, Notifier, RoomService, WishlistService};
use std::sync::Arc;

/// Application state containing all repositories and services
pub struct AppState {
    pub database: Database,
    pub friend_group_repo: Arc<FriendGroupRepository>,
    pub user_repo: Arc<UserRepository>,
    pub event_repo: Arc<EventRepository>,
    pub room_repo: Arc<RoomRepository>,
    pub wishlist_repo: Arc<WishlistRepository>,
    pub notifier: Arc<Notifier>,
    pub room_service: Arc<RoomService>,
    pub funding_service: Arc<FundingService>,
    pub wishlist_service: Arc<WishlistService>,
}

impl AppState {
    /// Create a new AppState with initialized repositories and services
    pub fn new(pool: sqlx::PgPool, config: &AppConfig) -> Self {
        let database = Database::new(pool.clone());

        let friend_group_repo = Arc::new(FriendGroupRepository::new(pool.clone()));
        let user_repo = Arc::new(UserRepository::new(pool.clone()));
        let event_repo = Arc::new(EventRepository::new(pool.clone()));
        let room_repo = Arc::new(RoomRepository::new(pool.clone()));
        let wishlist_repo = Arc::new(WishlistRepository::new(pool.clone()));
        let notifier = Arc::new(Notifier::new(&config.telegram));

        let room_service = Arc::new(RoomService::new(
            pool.clone(),
            room_repo.clone(),
            event_repo.clone(),
            friend_group_repo.clone(),
            user_repo.clone(),
            wishlist_repo.clone(),
            notifier.clone(),
            config.draw.clone(),
        ));

        let funding_service = Arc::new(FundingService::new(
            pool.clone(),
            event_repo.clone(),
            friend_group_repo.clone(),
            user_repo.clone(),
            wishlist_repo.clone(),
            notifier.clone(),
        ));

        let wishlist_service = Arc::new(WishlistService::new(
            pool,
            wishlist_repo.clone(),
            user_repo.clone(),
            event_repo.clone(),
        ));

        Self {
            database,
            friend_group_repo,
            user_repo,
            event_repo,
            room_repo,
            wishlist_repo,
            notifier,
            room_service,
            funding_service,
            wishlist_service,
        }
    }
}
