use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Whether a participant takes part in an event's fundraising
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipationStatus {
    Joined,
    Declined,
}

impl ParticipationStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_uppercase().as_str() {
            "JOINED" => Ok(ParticipationStatus::Joined),
            "DECLINED" => Ok(ParticipationStatus::Declined),
            _ => Err(format!("Invalid participation status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipationStatus::Joined => "JOINED",
            ParticipationStatus::Declined => "DECLINED",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ParticipationStatus::Joined => ParticipationStatus::Declined,
            ParticipationStatus::Declined => ParticipationStatus::Joined,
        }
    }
}

/// Status of a claimed payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContributionStatus {
    /// The participant says they transferred the money
    Pending,
    /// The organizer found the transfer
    Confirmed,
    /// The organizer did not find the transfer
    Rejected,
}

impl ContributionStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(ContributionStatus::Pending),
            "CONFIRMED" => Ok(ContributionStatus::Confirmed),
            "REJECTED" => Ok(ContributionStatus::Rejected),
            _ => Err(format!("Invalid contribution status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionStatus::Pending => "PENDING",
            ContributionStatus::Confirmed => "CONFIRMED",
            ContributionStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for ContributionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who may edit payment instructions, the target amount and confirm payments.
///
/// The first participant to set payment info claims the role; until then
/// everyone is treated as organizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "participant_id", rename_all = "snake_case")]
pub enum Organizer {
    Unclaimed,
    ClaimedBy(Uuid),
}

impl Organizer {
    pub fn permits(&self, user_id: Uuid) -> bool {
        match self {
            Organizer::Unclaimed => true,
            Organizer::ClaimedBy(owner) => *owner == user_id,
        }
    }

    pub fn claimant(&self) -> Option<Uuid> {
        match self {
            Organizer::Unclaimed => None,
            Organizer::ClaimedBy(owner) => Some(*owner),
        }
    }
}

impl From<Option<Uuid>> for Organizer {
    fn from(set_by: Option<Uuid>) -> Self {
        match set_by {
            Some(user_id) => Organizer::ClaimedBy(user_id),
            None => Organizer::Unclaimed,
        }
    }
}

/// Fundraising event, optionally held for one beneficiary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub group_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub beneficiary_id: Option<Uuid>,
    pub target_amount: Decimal,
    pub currency: String,
    pub creator_id: Uuid,
    pub payment_info: Option<String>,
    pub organizer: Organizer,
    pub created_at: NaiveDateTime,
}

impl Event {
    pub fn is_beneficiary(&self, user_id: Uuid) -> bool {
        self.beneficiary_id == Some(user_id)
    }

    /// Check if event date is today or later
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.date >= today
    }
}

/// A participant's membership in an event's fundraising
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventParticipant {
    pub user_id: Uuid,
    pub status: ParticipationStatus,
    /// Sum of the participant's confirmed contributions
    pub paid_amount: Decimal,
    pub joined_at: NaiveDateTime,
}

impl EventParticipant {
    pub fn joined(user_id: Uuid) -> Self {
        Self {
            user_id,
            status: ParticipationStatus::Joined,
            paid_amount: Decimal::ZERO,
            joined_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn is_joined(&self) -> bool {
        self.status == ParticipationStatus::Joined
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub status: ContributionStatus,
    pub created_at: NaiveDateTime,
}

/// Input for creating an event
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub group_id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub target_amount: Decimal,
    pub currency: Option<String>,
    pub beneficiary_id: Option<Uuid>,
}
