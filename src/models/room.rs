use crate::exchange::Assignments;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Lifecycle status of a gift-exchange room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Waiting,
    Drawn,
    Completed,
}

impl RoomStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_uppercase().as_str() {
            "WAITING" => Ok(RoomStatus::Waiting),
            "DRAWN" => Ok(RoomStatus::Drawn),
            "COMPLETED" => Ok(RoomStatus::Completed),
            _ => Err(format!("Invalid room status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Waiting => "WAITING",
            RoomStatus::Drawn => "DRAWN",
            RoomStatus::Completed => "COMPLETED",
        }
    }
}

/// Which game a room plays, derived from its scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    /// Group-wide Secret Santa
    SecretSanta,
    /// Angel Guardian scoped to one event
    AngelGuardian,
}

/// What a participant would like to receive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wish {
    pub text: Option<String>,
    pub wishlist_item_id: Option<Uuid>,
}

impl Wish {
    pub fn new(text: Option<String>, wishlist_item_id: Option<Uuid>) -> Self {
        let text = text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Self {
            text,
            wishlist_item_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.wishlist_item_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomParticipant {
    pub user_id: Uuid,
    pub wish: Wish,
    pub joined_at: NaiveDateTime,
}

/// Secret Santa or Angel Guardian room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftExchangeRoom {
    pub id: Uuid,
    pub group_id: Uuid,
    /// `None` for a group-wide Secret Santa, the event for an Angel Guardian room
    pub event_id: Option<Uuid>,
    pub title: String,
    pub budget: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub admin_id: Uuid,
    pub status: RoomStatus,
    pub participants: Vec<RoomParticipant>,
    /// Giver -> receiver, set once by the draw
    pub assignments: Option<Assignments>,
    pub created_at: NaiveDateTime,
}

impl GiftExchangeRoom {
    pub fn kind(&self) -> RoomKind {
        match self.event_id {
            Some(_) => RoomKind::AngelGuardian,
            None => RoomKind::SecretSanta,
        }
    }

    /// Rooms that still occupy their group or event scope
    pub fn is_active(&self) -> bool {
        self.status != RoomStatus::Completed
    }

    pub fn is_admin(&self, user_id: Uuid) -> bool {
        self.admin_id == user_id
    }

    pub fn participant(&self, user_id: Uuid) -> Option<&RoomParticipant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }

    pub fn participant_ids(&self) -> BTreeSet<Uuid> {
        self.participants.iter().map(|p| p.user_id).collect()
    }

    /// Check whether this room plays in the given group/event scope
    pub fn shares_scope_with(&self, group_id: Uuid, event_id: Option<Uuid>) -> bool {
        match (self.event_id, event_id) {
            (Some(mine), Some(theirs)) => mine == theirs,
            (None, None) => self.group_id == group_id,
            _ => false,
        }
    }
}

/// Input for opening a new room
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub group_id: Uuid,
    pub event_id: Option<Uuid>,
    pub admin_id: Uuid,
    pub title: String,
    pub budget: Option<String>,
    pub deadline: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_status_conversion() {
        assert_eq!(RoomStatus::Waiting.as_str(), "WAITING");
        assert_eq!(RoomStatus::from_str("drawn"), Ok(RoomStatus::Drawn));
        assert!(RoomStatus::from_str("open").is_err());
    }

    #[test]
    fn test_wish_trims_blank_text() {
        let wish = Wish::new(Some("   ".to_string()), None);
        assert!(wish.is_empty());

        let wish = Wish::new(Some(" socks ".to_string()), None);
        assert_eq!(wish.text.as_deref(), Some("socks"));
    }
}
