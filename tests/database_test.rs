mod helpers;

use helpers::*;
use sqlx::{PgPool, Row};
use togetherly_backend::error::DomainError;
use togetherly_backend::models::*;
use togetherly_backend::services::RoomRef;
use uuid::Uuid;

// ============================================================================
// Migration Tests
// ============================================================================

#[sqlx::test]
async fn test_migrations_ran(pool: PgPool) {
    let tables = vec![
        "users",
        "friend_groups",
        "events",
        "event_participants",
        "contributions",
        "wishlist_items",
        "gift_rooms",
        "room_participants",
    ];

    for table in tables {
        let exists: bool = sqlx::query(
            "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_name = $1)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap()
        .get(0);

        assert!(exists, "Table {} should exist", table);
    }
}

// ============================================================================
// Gift-Exchange Room Tests
// ============================================================================

#[sqlx::test]
async fn test_secret_santa_flow(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let fx = TestFixtures::create(&db).await;
    let rooms = &db.state.room_service;

    let room = rooms
        .create_room(fx.friend_group.id, fx.host.id, "Santa 2026", None, None)
        .await
        .expect("Failed to create room");
    assert_eq!(room.participants.len(), 1);

    let book = create_test_item(&db, fx.user1.id, "A book", None).await;
    rooms
        .join_room(RoomRef::Id(room.id), fx.user1.id, Wish::new(None, Some(book.id)))
        .await
        .unwrap();
    rooms
        .join_room(RoomRef::Id(room.id), fx.user2.id, Wish::new(Some("Socks".to_string()), None))
        .await
        .unwrap();

    let err = rooms
        .draw_room(RoomRef::Id(room.id), fx.user1.id)
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::NotAuthorized(_))));

    let drawn = rooms.draw_room(RoomRef::Id(room.id), fx.host.id).await.unwrap();
    assert_eq!(drawn.status, RoomStatus::Drawn);

    let stored = db.room_repo.find_by_id(room.id).await.unwrap().unwrap();
    let assignments = stored.assignments.expect("assignments stored");
    assert!(assignments.is_single_cycle());

    for user in [&fx.host, &fx.user1, &fx.user2] {
        let target = rooms.get_target(RoomRef::Id(room.id), user.id).await.unwrap();
        assert_ne!(target.receiver.id, user.id);
        if target.receiver.id == fx.user1.id {
            assert_eq!(target.wishlist_item.map(|i| i.id), Some(book.id));
        }
    }

    let err = rooms.draw_room(RoomRef::Id(room.id), fx.host.id).await.unwrap_err();
    assert_eq!(err.as_domain(), Some(&DomainError::RoomAlreadyDrawn));

    let err = rooms
        .join_room(RoomRef::Id(room.id), fx.beneficiary.id, Wish::default())
        .await
        .unwrap_err();
    assert_eq!(err.as_domain(), Some(&DomainError::RoomAlreadyDrawn));
}

#[sqlx::test]
async fn test_one_active_room_per_group(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let fx = TestFixtures::create(&db).await;
    let rooms = &db.state.room_service;

    rooms
        .create_room(fx.friend_group.id, fx.host.id, "First", None, None)
        .await
        .unwrap();
    let err = rooms
        .create_room(fx.friend_group.id, fx.user1.id, "Second", None, None)
        .await
        .unwrap_err();

    assert_eq!(err.as_domain(), Some(&DomainError::DuplicateRoom));
}

#[sqlx::test]
async fn test_concurrent_draws_run_once(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let fx = TestFixtures::create(&db).await;
    let rooms = db.state.room_service.clone();

    let room = rooms
        .create_room(fx.friend_group.id, fx.host.id, "Race", None, None)
        .await
        .unwrap();
    for user in [&fx.user1, &fx.user2] {
        rooms
            .join_room(RoomRef::Id(room.id), user.id, Wish::default())
            .await
            .unwrap();
    }

    let (first, second) = tokio::join!(
        rooms.draw_room(RoomRef::Id(room.id), fx.host.id),
        rooms.draw_room(RoomRef::Id(room.id), fx.host.id)
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(loser.as_domain(), Some(&DomainError::RoomAlreadyDrawn));
}

#[sqlx::test]
async fn test_expired_angel_room_is_completed(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let fx = TestFixtures::create(&db).await;
    let event = fx.birthday(&db, money(0)).await;
    let rooms = &db.state.room_service;

    let yesterday = chrono::Utc::now().date_naive() - chrono::Duration::days(1);
    let room = rooms
        .create_angel_room(event.id, fx.host.id, None, None, Some(yesterday))
        .await
        .unwrap();
    assert_eq!(room.title, "Angel Guardian: Birthday");

    for user in [&fx.user1, &fx.user2] {
        rooms
            .join_room(RoomRef::Event(event.id), user.id, Wish::default())
            .await
            .unwrap();
    }
    rooms.draw_room(RoomRef::Event(event.id), fx.host.id).await.unwrap();

    let completed = rooms
        .complete_expired_rooms(chrono::Utc::now().date_naive())
        .await
        .unwrap();
    assert_eq!(completed, 1);

    let stored = rooms.get_room(RoomRef::Event(event.id)).await.unwrap();
    assert_eq!(stored.status, RoomStatus::Completed);

    // A completed room frees the event for a new one
    rooms
        .create_angel_room(event.id, fx.host.id, Some("Round two"), None, None)
        .await
        .unwrap();
}

#[sqlx::test]
async fn test_completed_angel_room_stays_closed(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let fx = TestFixtures::create(&db).await;
    let event = fx.birthday(&db, money(0)).await;
    let rooms = &db.state.room_service;
    let angel = RoomRef::Event(event.id);

    let yesterday = chrono::Utc::now().date_naive() - chrono::Duration::days(1);
    rooms
        .create_angel_room(event.id, fx.host.id, None, None, Some(yesterday))
        .await
        .unwrap();
    for user in [&fx.user1, &fx.user2] {
        rooms.join_room(angel, user.id, Wish::default()).await.unwrap();
    }
    rooms.draw_room(angel, fx.host.id).await.unwrap();
    rooms
        .complete_expired_rooms(chrono::Utc::now().date_naive())
        .await
        .unwrap();

    let err = rooms.draw_room(angel, fx.host.id).await.unwrap_err();
    assert_eq!(err.as_domain(), Some(&DomainError::RoomAlreadyDrawn));

    let err = rooms
        .join_room(angel, fx.beneficiary.id, Wish::default())
        .await
        .unwrap_err();
    assert_eq!(err.as_domain(), Some(&DomainError::RoomAlreadyDrawn));

    let stored = rooms.get_room(angel).await.unwrap();
    assert_eq!(stored.status, RoomStatus::Completed);
    assert_eq!(stored.participants.len(), 3);
}

// ============================================================================
// Funding Tests
// ============================================================================

#[sqlx::test]
async fn test_contribution_flow(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let fx = TestFixtures::create(&db).await;
    let event = fx.birthday(&db, money(5000)).await;
    let funding = &db.state.funding_service;

    let view = funding.contribute(event.id, fx.user1.id, money(2000)).await.unwrap();
    let first = view.contributions[0].id;
    let view = funding.contribute(event.id, fx.user2.id, money(1500)).await.unwrap();
    let second = view
        .contributions
        .iter()
        .find(|c| c.user_id == fx.user2.id)
        .unwrap()
        .id;

    funding
        .set_payment_info(event.id, fx.host.id, "Card 1234 5678")
        .await
        .unwrap();
    let err = funding
        .confirm_contribution(event.id, first, fx.user1.id)
        .await
        .unwrap_err();
    assert_eq!(err.as_domain(), Some(&DomainError::NotOrganizer));

    funding.confirm_contribution(event.id, first, fx.host.id).await.unwrap();
    let view = funding.confirm_contribution(event.id, second, fx.host.id).await.unwrap();

    assert_eq!(view.collected, money(3500));
    assert_eq!(view.progress, 70);
    assert_eq!(view.pending_count, 0);

    let err = funding
        .funding_view(event.id, fx.beneficiary.id)
        .await
        .unwrap_err();
    assert_eq!(err.as_domain(), Some(&DomainError::BeneficiaryAccessDenied));
}

#[sqlx::test]
async fn test_concurrent_confirms_credit_once(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let fx = TestFixtures::create(&db).await;
    let event = fx.birthday(&db, money(1000)).await;
    let funding = db.state.funding_service.clone();

    let view = funding.contribute(event.id, fx.user1.id, money(400)).await.unwrap();
    let contribution = view.contributions[0].id;

    let (first, second) = tokio::join!(
        funding.confirm_contribution(event.id, contribution, fx.host.id),
        funding.confirm_contribution(event.id, contribution, fx.host.id)
    );
    assert_eq!([&first, &second].iter().filter(|r| r.is_ok()).count(), 1);

    let view = funding.funding_view(event.id, fx.host.id).await.unwrap();
    assert_eq!(view.collected, money(400));
    let participant = view
        .participants
        .iter()
        .find(|p| p.user_id == fx.user1.id)
        .unwrap();
    assert_eq!(participant.paid_amount, money(400));
}

#[sqlx::test]
async fn test_group_funding_bookings(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let fx = TestFixtures::create(&db).await;
    let event = fx.birthday(&db, money(0)).await;
    let funding = &db.state.funding_service;

    let headphones =
        create_test_item(&db, fx.beneficiary.id, "Headphones", Some(money(4000))).await;

    let wishlist = funding.event_wishlist(event.id, fx.user1.id).await.unwrap();
    assert_eq!(wishlist.len(), 1);
    let err = funding
        .event_wishlist(event.id, fx.beneficiary.id)
        .await
        .unwrap_err();
    assert_eq!(err.as_domain(), Some(&DomainError::BeneficiaryAccessDenied));

    let view = funding.fund_item(event.id, headphones.id, fx.user1.id).await.unwrap();
    assert_eq!(view.event.target_amount, money(4000));

    let err = funding
        .book_item(event.id, headphones.id, fx.user2.id)
        .await
        .unwrap_err();
    assert_eq!(err.as_domain(), Some(&DomainError::AlreadyBooked));

    let manual = funding
        .add_manual_fund_item(
            event.id,
            fx.user2.id,
            NewFundItem {
                title: "Flowers".to_string(),
                price: Some(money(1000)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(manual.owner_id, fx.beneficiary.id);

    let view = funding.funding_view(event.id, fx.host.id).await.unwrap();
    assert_eq!(view.event.target_amount, money(5000));
    assert_eq!(view.bookings.len(), 2);

    // The host is a JOINED participant, so they may release someone else's booking
    let released = funding
        .unbook_item(event.id, headphones.id, fx.host.id)
        .await
        .unwrap();
    assert!(!released.is_booked());

    let view = funding.funding_view(event.id, fx.host.id).await.unwrap();
    assert_eq!(view.event.target_amount, money(0));
}

#[sqlx::test]
async fn test_only_host_deletes_event(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let fx = TestFixtures::create(&db).await;
    let event = fx.birthday(&db, money(0)).await;
    let funding = &db.state.funding_service;

    let item = create_test_item(&db, fx.beneficiary.id, "Scarf", Some(money(900))).await;
    funding.book_item(event.id, item.id, fx.user1.id).await.unwrap();

    let err = funding.delete_event(event.id, fx.user1.id).await.unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::NotAuthorized(_))));

    funding.delete_event(event.id, fx.host.id).await.unwrap();
    assert!(db.event_repo.find_by_id(event.id).await.unwrap().is_none());

    let item = db.wishlist_repo.find_by_id(item.id).await.unwrap().unwrap();
    assert!(!item.is_booked());
}

#[sqlx::test]
async fn test_events_listed_upcoming_first(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let fx = TestFixtures::create(&db).await;
    let funding = &db.state.funding_service;
    let today = chrono::Utc::now().date_naive();

    for (title, offset) in [("Past", -10), ("Far", 60), ("Soon", 5)] {
        funding
            .create_event(NewEvent {
                group_id: fx.friend_group.id,
                creator_id: fx.host.id,
                title: title.to_string(),
                description: None,
                date: today + chrono::Duration::days(offset),
                target_amount: money(0),
                currency: Some("eur".to_string()),
                beneficiary_id: None,
            })
            .await
            .unwrap();
    }

    let events = funding.list_group_events(fx.friend_group.id, today).await.unwrap();
    let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Soon", "Far", "Past"]);
    assert!(events.iter().all(|e| e.currency == "EUR"));
}

#[sqlx::test]
async fn test_amounts_outside_money_column_are_rejected(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let fx = TestFixtures::create(&db).await;
    let event = fx.birthday(&db, money(1000)).await;
    let funding = &db.state.funding_service;

    let huge = money(1_000_000_000_000_000);
    let err = funding.contribute(event.id, fx.user1.id, huge).await.unwrap_err();
    assert_eq!(err.as_domain(), Some(&DomainError::InvalidAmount(huge)));

    let fraction: rust_decimal::Decimal = "10.005".parse().unwrap();
    let err = funding
        .set_target_amount(event.id, fx.host.id, fraction)
        .await
        .unwrap_err();
    assert_eq!(err.as_domain(), Some(&DomainError::InvalidAmount(fraction)));

    let view = funding.funding_view(event.id, fx.host.id).await.unwrap();
    assert!(view.contributions.is_empty());
    assert_eq!(view.event.target_amount, money(1000));
}

// ============================================================================
// Wishlist Tests
// ============================================================================

#[sqlx::test]
async fn test_wishlist_add_list_delete(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let fx = TestFixtures::create(&db).await;
    let wishlists = &db.state.wishlist_service;

    let kettle = create_test_item(&db, fx.user1.id, "  Kettle ", Some(money(3000))).await;
    assert_eq!(kettle.title, "Kettle");
    create_test_item(&db, fx.user1.id, "Socks", None).await;

    let items = wishlists.list_items(fx.user1.id).await.unwrap();
    let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, ["Kettle", "Socks"]);
    assert!(wishlists.list_items(fx.user2.id).await.unwrap().is_empty());

    let err = wishlists.delete_item(kettle.id, fx.user2.id).await.unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::NotAuthorized(_))));

    wishlists.delete_item(kettle.id, fx.user1.id).await.unwrap();
    assert_eq!(wishlists.list_items(fx.user1.id).await.unwrap().len(), 1);

    let err = wishlists.delete_item(kettle.id, fx.user1.id).await.unwrap_err();
    assert!(err.is_not_found());

    let err = wishlists
        .add_item(
            Uuid::new_v4(),
            NewWishlistItem {
                title: "Ghost".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[sqlx::test]
async fn test_deleting_group_funded_item_resets_target(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let fx = TestFixtures::create(&db).await;
    let event = fx.birthday(&db, money(0)).await;
    let funding = &db.state.funding_service;

    let drone = create_test_item(&db, fx.beneficiary.id, "Drone", Some(money(8000))).await;
    let view = funding.fund_item(event.id, drone.id, fx.user1.id).await.unwrap();
    assert_eq!(view.event.target_amount, money(8000));

    db.state
        .wishlist_service
        .delete_item(drone.id, fx.beneficiary.id)
        .await
        .unwrap();

    let view = funding.funding_view(event.id, fx.host.id).await.unwrap();
    assert_eq!(view.event.target_amount, money(0));
    assert!(view.bookings.is_empty());
    assert!(db.wishlist_repo.find_by_id(drone.id).await.unwrap().is_none());
}
