use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User account mapped from a Telegram identity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub telegram_id: Option<i64>,
    pub name: String,
    pub username: Option<String>,
    pub created_at: NaiveDateTime,
}

impl User {
    /// Create a new User (typically used for creating from API input)
    pub fn new(name: String, telegram_id: Option<i64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            telegram_id,
            name,
            username: None,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
