pub mod event_repository;
pub mod friend_group_repository;
pub mod room_repository;
pub mod user_repository;
pub mod wishlist_repository;

// Re-export all repositories for convenient access
pub use event_repository::EventRepository;
pub use friend_group_repository::FriendGroupRepository;
pub use room_repository::RoomRepository;
pub use user_repository::UserRepository;
pub use wishlist_repository::WishlistRepository;
