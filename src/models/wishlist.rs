use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a booked wishlist item will be gifted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingMode {
    /// One participant buys the gift
    Individual,
    /// The event's fundraising pays for the gift
    GroupFunding,
}

impl BookingMode {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_uppercase().as_str() {
            "INDIVIDUAL" => Ok(BookingMode::Individual),
            "GROUP_FUNDING" => Ok(BookingMode::GroupFunding),
            _ => Err(format!("Invalid booking mode: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingMode::Individual => "INDIVIDUAL",
            BookingMode::GroupFunding => "GROUP_FUNDING",
        }
    }
}

/// Booking of an item for one event. Present iff the item is booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub booked_by: Uuid,
    pub event_id: Uuid,
    pub mode: BookingMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub booking: Option<Booking>,
    pub created_at: NaiveDateTime,
}

impl WishlistItem {
    /// An unbooked item on `owner_id`'s wishlist
    pub fn new(owner_id: Uuid, new: NewWishlistItem) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: new.title,
            description: new.description,
            price: new.price,
            url: new.url,
            image_url: new.image_url,
            booking: None,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn is_booked(&self) -> bool {
        self.booking.is_some()
    }

    pub fn is_booked_for(&self, event_id: Uuid) -> bool {
        self.booking.map_or(false, |b| b.event_id == event_id)
    }

    /// Positive price, if the item has one
    pub fn known_price(&self) -> Option<Decimal> {
        self.price.filter(|p| *p > Decimal::ZERO)
    }
}

/// Item a user adds to their own wishlist
#[derive(Debug, Clone, Default)]
pub struct NewWishlistItem {
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<Decimal>,
}

/// Gift idea added straight into an event's group funding
#[derive(Debug, Clone, Default)]
pub struct NewFundItem {
    pub title: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<Decimal>,
}
