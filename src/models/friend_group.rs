use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Friend group owning events and Secret Santa rooms
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FriendGroup {
    pub id: Uuid,
    pub title: String,
    /// The group host
    pub creator_id: Uuid,
    pub created_at: NaiveDateTime,
}

impl FriendGroup {
    pub fn new(title: String, creator_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            creator_id,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Check if the user hosts this group
    pub fn is_host(&self, user_id: Uuid) -> bool {
        self.creator_id == user_id
    }
}
