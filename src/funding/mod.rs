//! Event fundraising: the ledger, wishlist bookings and who may do what.
//!
//! [`EventFunding`] is the aggregate a service loads under the event's row
//! lock, mutates through the methods below and writes back.

pub mod amount;
pub mod booking;
pub mod ledger;

pub use amount::{validate_amount, validate_positive_amount};
pub use booking::{add_to_funding_target, book, release, set_funding_target_from_item, unbook};
pub use ledger::Ledger;

use crate::error::DomainError;
use crate::models::{
    Booking, BookingMode, Contribution, Event, EventParticipant, NewEvent, NewFundItem,
    Organizer, ParticipationStatus, WishlistItem,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Currency of events created without one
pub const DEFAULT_CURRENCY: &str = "RUB";

/// An event with its ledger and the items booked for it
#[derive(Debug, Clone)]
pub struct EventFunding {
    pub event: Event,
    pub ledger: Ledger,
    pub bookings: Vec<WishlistItem>,
}

/// What participants see on the funding page
#[derive(Debug, Clone, Serialize)]
pub struct FundingView {
    pub event: Event,
    pub organizer: Organizer,
    pub participants: Vec<EventParticipant>,
    pub contributions: Vec<Contribution>,
    pub bookings: Vec<WishlistItem>,
    pub collected: Decimal,
    pub progress: u32,
    pub pending_count: usize,
}

impl EventFunding {
    pub fn new(event: Event, ledger: Ledger, bookings: Vec<WishlistItem>) -> Self {
        Self {
            event,
            ledger,
            bookings,
        }
    }

    /// A fresh event with its creator as the first JOINED participant
    pub fn create(new: NewEvent) -> Result<Self, DomainError> {
        validate_amount(new.target_amount)?;

        let currency = new
            .currency
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let event = Event {
            id: Uuid::new_v4(),
            group_id: new.group_id,
            title: new.title,
            description: new.description,
            date: new.date,
            beneficiary_id: new.beneficiary_id,
            target_amount: new.target_amount,
            currency,
            creator_id: new.creator_id,
            payment_info: None,
            organizer: Organizer::Unclaimed,
            created_at: chrono::Utc::now().naive_utc(),
        };

        let mut ledger = Ledger::default();
        ledger.ensure_joined(new.creator_id);

        Ok(Self::new(event, ledger, Vec::new()))
    }

    /// The beneficiary never sees or touches the funding of their own event
    pub fn ensure_not_beneficiary(&self, user_id: Uuid) -> Result<(), DomainError> {
        if self.event.is_beneficiary(user_id) {
            return Err(DomainError::BeneficiaryAccessDenied);
        }
        Ok(())
    }

    fn ensure_organizer(&self, user_id: Uuid) -> Result<(), DomainError> {
        self.ensure_not_beneficiary(user_id)?;
        if !self.event.organizer.permits(user_id) {
            return Err(DomainError::NotOrganizer);
        }
        Ok(())
    }

    pub fn view(&self, requester: Uuid) -> Result<FundingView, DomainError> {
        self.ensure_not_beneficiary(requester)?;

        Ok(FundingView {
            event: self.event.clone(),
            organizer: self.event.organizer,
            participants: self.ledger.participants().to_vec(),
            contributions: self.ledger.contributions().to_vec(),
            bookings: self.bookings.clone(),
            collected: self.ledger.collected(),
            progress: self.progress(),
            pending_count: self.ledger.pending_count(),
        })
    }

    pub fn progress(&self) -> u32 {
        self.ledger.progress(self.event.target_amount)
    }

    pub fn contribute(&mut self, user_id: Uuid, amount: Decimal) -> Result<Contribution, DomainError> {
        self.ensure_not_beneficiary(user_id)?;
        let event_id = self.event.id;
        self.ledger
            .record_contribution(event_id, user_id, amount)
            .cloned()
    }

    pub fn confirm(&mut self, requester: Uuid, contribution_id: Uuid) -> Result<Contribution, DomainError> {
        self.ensure_organizer(requester)?;
        self.ledger.confirm(contribution_id).cloned()
    }

    pub fn reject(&mut self, requester: Uuid, contribution_id: Uuid) -> Result<Contribution, DomainError> {
        self.ensure_organizer(requester)?;
        self.ledger.reject(contribution_id).cloned()
    }

    pub fn toggle_participation(&mut self, user_id: Uuid) -> Result<ParticipationStatus, DomainError> {
        self.ensure_not_beneficiary(user_id)?;
        Ok(self.ledger.toggle_participation(user_id))
    }

    /// Set payment instructions. The first caller claims the organizer role.
    pub fn set_payment_info(&mut self, user_id: Uuid, info: String) -> Result<(), DomainError> {
        self.ensure_organizer(user_id)?;
        self.event.payment_info = Some(info);
        self.event.organizer = Organizer::ClaimedBy(user_id);
        Ok(())
    }

    pub fn set_target_amount(&mut self, user_id: Uuid, amount: Decimal) -> Result<(), DomainError> {
        self.ensure_organizer(user_id)?;
        self.event.target_amount = validate_amount(amount)?;
        Ok(())
    }

    pub fn book_individual(&mut self, user_id: Uuid, item: &mut WishlistItem) -> Result<Booking, DomainError> {
        self.ensure_not_beneficiary(user_id)?;
        let booking = book(item, self.event.id, user_id, BookingMode::Individual)?;
        self.bookings.push(item.clone());
        Ok(booking)
    }

    /// Book `item` for group funding; a priced item becomes the whole target
    pub fn book_group_funding(&mut self, user_id: Uuid, item: &mut WishlistItem) -> Result<Booking, DomainError> {
        self.ensure_not_beneficiary(user_id)?;
        let booking = book(item, self.event.id, user_id, BookingMode::GroupFunding)?;
        set_funding_target_from_item(&mut self.event, item);
        self.bookings.push(item.clone());
        Ok(booking)
    }

    /// Create a gift idea already booked for group funding; its price adds
    /// to the target. Owned by the beneficiary when there is one.
    pub fn add_manual_fund_item(&mut self, user_id: Uuid, new: NewFundItem) -> Result<WishlistItem, DomainError> {
        self.ensure_not_beneficiary(user_id)?;
        if let Some(price) = new.price {
            add_to_funding_target(&mut self.event, price)?;
        }

        let item = WishlistItem {
            id: Uuid::new_v4(),
            owner_id: self.event.beneficiary_id.unwrap_or(user_id),
            title: new.title,
            description: None,
            price: new.price,
            url: new.url,
            image_url: new.image_url,
            booking: Some(Booking {
                booked_by: user_id,
                event_id: self.event.id,
                mode: BookingMode::GroupFunding,
            }),
            created_at: chrono::Utc::now().naive_utc(),
        };
        self.bookings.push(item.clone());
        Ok(item)
    }

    /// Release a booking. The booker or any JOINED participant may do it;
    /// releasing a group-funded item resets the target to zero.
    pub fn unbook(&mut self, user_id: Uuid, item: &mut WishlistItem) -> Result<Booking, DomainError> {
        self.ensure_not_beneficiary(user_id)?;

        let booked_by = match item.booking {
            Some(booking) if booking.event_id == self.event.id => booking.booked_by,
            _ => return Err(DomainError::NotBooked),
        };
        if booked_by != user_id && !self.ledger.is_joined(user_id) {
            return Err(DomainError::NotAuthorized(
                "only the booker or an event participant can unbook".to_string(),
            ));
        }

        let booking = release(&mut self.event, item)?;
        self.bookings.retain(|booked| booked.id != item.id);
        Ok(booking)
    }
}

/// Upcoming events soonest first, then past events most recent first
pub fn order_for_display(events: &mut [Event], today: NaiveDate) {
    events.sort_by(|a, b| {
        match (a.is_upcoming(today), b.is_upcoming(today)) {
            (true, true) => a.date.cmp(&b.date),
            (false, false) => b.date.cmp(&a.date),
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
        }
    });
}
