pub mod funding_service;
pub mod notifier;
pub mod room_service;
pub mod wishlist_service;

pub use funding_service::FundingService;
pub use notifier::Notifier;
pub use room_service::{RoomRef, RoomService, TargetView};
pub use wishlist_service::WishlistService;
