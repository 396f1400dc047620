//! Domain models for the Togetherly backend.
//!
//! This module contains the entities shared by the gift-exchange rooms and
//! the event funding ledger.

pub mod event;
pub mod friend_group;
pub mod room;
pub mod user;
pub mod wishlist;

// Re-export all models for convenient access
pub use event::{
    Contribution, ContributionStatus, Event, EventParticipant, NewEvent, Organizer,
    ParticipationStatus,
};
pub use friend_group::FriendGroup;
pub use room::{GiftExchangeRoom, NewRoom, RoomKind, RoomParticipant, RoomStatus, Wish};
pub use user::User;
pub use wishlist::{Booking, BookingMode, NewFundItem, NewWishlistItem, WishlistItem};
