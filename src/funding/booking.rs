//! Booking wishlist items against an event, and the two ways an item
//! moves the event's funding target.
//!
//! Funding an existing item overwrites the target with its price; adding a
//! manual fund item adds its price on top. The two stay separate operations.

use super::amount::validate_amount;
use crate::error::DomainError;
use crate::models::{Booking, BookingMode, Event, WishlistItem};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Book a free item for `event_id`
pub fn book(
    item: &mut WishlistItem,
    event_id: Uuid,
    booked_by: Uuid,
    mode: BookingMode,
) -> Result<Booking, DomainError> {
    if item.is_booked() {
        return Err(DomainError::AlreadyBooked);
    }

    let booking = Booking {
        booked_by,
        event_id,
        mode,
    };
    item.booking = Some(booking);
    Ok(booking)
}

/// Clear the item's booking for `event_id`, returning what was cleared
pub fn unbook(item: &mut WishlistItem, event_id: Uuid) -> Result<Booking, DomainError> {
    match item.booking {
        Some(booking) if booking.event_id == event_id => {
            item.booking = None;
            Ok(booking)
        }
        _ => Err(DomainError::NotBooked),
    }
}

/// Clear the item's booking for `event`. Releasing a group-funded item
/// resets the target to zero.
pub fn release(event: &mut Event, item: &mut WishlistItem) -> Result<Booking, DomainError> {
    let booking = unbook(item, event.id)?;
    if booking.mode == BookingMode::GroupFunding {
        event.target_amount = Decimal::ZERO;
    }
    Ok(booking)
}

/// Replace the event target with the item's price. Items without a
/// price leave the target for the organizer to set.
pub fn set_funding_target_from_item(event: &mut Event, item: &WishlistItem) -> bool {
    match item.known_price() {
        Some(price) => {
            event.target_amount = price;
            true
        }
        None => false,
    }
}

/// Add `price` to the event target
pub fn add_to_funding_target(event: &mut Event, price: Decimal) -> Result<(), DomainError> {
    let price = validate_amount(price)?;
    event.target_amount = validate_amount(event.target_amount + price)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Organizer;
    use chrono::NaiveDate;

    fn event(target: i64) -> Event {
        Event {
            id: Uuid::new_v4(),
            group_id: Uuid::new_v4(),
            title: "Birthday".to_string(),
            description: None,
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            beneficiary_id: None,
            target_amount: Decimal::from(target),
            currency: "RUB".to_string(),
            creator_id: Uuid::new_v4(),
            payment_info: None,
            organizer: Organizer::Unclaimed,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    fn item(price: Option<i64>) -> WishlistItem {
        WishlistItem {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Headphones".to_string(),
            description: None,
            price: price.map(Decimal::from),
            url: None,
            image_url: None,
            booking: None,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_book_twice_fails() {
        let mut item = item(Some(100));
        let event_id = Uuid::new_v4();

        book(&mut item, event_id, Uuid::new_v4(), BookingMode::Individual).unwrap();
        assert_eq!(
            book(&mut item, Uuid::new_v4(), Uuid::new_v4(), BookingMode::GroupFunding),
            Err(DomainError::AlreadyBooked)
        );
        assert!(item.is_booked_for(event_id));
    }

    #[test]
    fn test_unbook_only_for_own_event() {
        let mut item = item(None);
        let event_id = Uuid::new_v4();
        book(&mut item, event_id, Uuid::new_v4(), BookingMode::Individual).unwrap();

        assert_eq!(unbook(&mut item, Uuid::new_v4()), Err(DomainError::NotBooked));
        assert!(unbook(&mut item, event_id).is_ok());
        assert!(item.booking.is_none());
        assert_eq!(unbook(&mut item, event_id), Err(DomainError::NotBooked));
    }

    #[test]
    fn test_release_group_funding_resets_target() {
        let mut event = event(4000);
        let mut gift = item(Some(4000));
        book(&mut gift, event.id, Uuid::new_v4(), BookingMode::GroupFunding).unwrap();

        let released = release(&mut event, &mut gift).unwrap();
        assert_eq!(released.mode, BookingMode::GroupFunding);
        assert_eq!(event.target_amount, Decimal::ZERO);

        let mut bought = item(Some(900));
        event.target_amount = Decimal::from(700);
        book(&mut bought, event.id, Uuid::new_v4(), BookingMode::Individual).unwrap();
        release(&mut event, &mut bought).unwrap();
        assert_eq!(event.target_amount, Decimal::from(700));
    }

    #[test]
    fn test_fund_overwrites_manual_adds() {
        let mut event = event(700);

        assert!(set_funding_target_from_item(&mut event, &item(Some(4000))));
        assert_eq!(event.target_amount, Decimal::from(4000));

        add_to_funding_target(&mut event, Decimal::from(1000)).unwrap();
        assert_eq!(event.target_amount, Decimal::from(5000));
    }

    #[test]
    fn test_unpriced_item_keeps_target() {
        let mut event = event(700);
        assert!(!set_funding_target_from_item(&mut event, &item(None)));
        assert!(!set_funding_target_from_item(&mut event, &item(Some(0))));
        assert_eq!(event.target_amount, Decimal::from(700));
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut event = event(0);
        assert_eq!(
            add_to_funding_target(&mut event, Decimal::from(-5)),
            Err(DomainError::InvalidAmount(Decimal::from(-5)))
        );
        assert_eq!(event.target_amount, Decimal::ZERO);
    }

    #[test]
    fn test_target_stays_within_money_column() {
        let mut event = event(0);
        let cent_fraction = Decimal::new(10005, 3);
        assert_eq!(
            add_to_funding_target(&mut event, cent_fraction),
            Err(DomainError::InvalidAmount(cent_fraction))
        );

        event.target_amount = Decimal::from(999_999_999_999i64);
        assert!(matches!(
            add_to_funding_target(&mut event, Decimal::ONE),
            Err(DomainError::InvalidAmount(_))
        ));
        assert_eq!(event.target_amount, Decimal::from(999_999_999_999i64));
    }
}
