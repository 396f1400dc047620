//! Gift-exchange rooms: the draw engine and the room lifecycle.
//!
//! A room moves `WAITING -> DRAWN -> COMPLETED`. Participants may join or
//! edit their wish only while waiting; the admin's draw freezes the
//! participant set and stores the assignments exactly once.

pub mod assignments;
pub mod draw;

pub use assignments::{AssignmentError, Assignments};
pub use draw::{draw, draw_with_limit, DrawStrategy, RandomSource, MAX_DRAW_ATTEMPTS, MIN_PARTICIPANTS};

use crate::error::DomainError;
use crate::models::{GiftExchangeRoom, NewRoom, RoomParticipant, RoomStatus, Wish};
use chrono::NaiveDate;
use rand::Rng;
use uuid::Uuid;

/// Result of a join request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    WishUpdated,
}

/// Who a participant gives to, with the receiver's wish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub receiver_id: Uuid,
    pub wish: Wish,
}

/// Fail with `DuplicateRoom` if an active room already plays in the scope
pub fn ensure_scope_free<'a>(
    existing: impl IntoIterator<Item = &'a GiftExchangeRoom>,
    group_id: Uuid,
    event_id: Option<Uuid>,
) -> Result<(), DomainError> {
    let taken = existing
        .into_iter()
        .any(|room| room.is_active() && room.shares_scope_with(group_id, event_id));

    if taken {
        return Err(DomainError::DuplicateRoom);
    }
    Ok(())
}

impl GiftExchangeRoom {
    /// New waiting room with its admin as the first participant
    pub fn open(new: NewRoom) -> Self {
        let now = chrono::Utc::now().naive_utc();

        Self {
            id: Uuid::new_v4(),
            group_id: new.group_id,
            event_id: new.event_id,
            title: new.title,
            budget: new.budget,
            deadline: new.deadline,
            admin_id: new.admin_id,
            status: RoomStatus::Waiting,
            participants: vec![RoomParticipant {
                user_id: new.admin_id,
                wish: Wish::default(),
                joined_at: now,
            }],
            assignments: None,
            created_at: now,
        }
    }

    /// Add a participant, or replace the wish of one already in the room
    pub fn join(&mut self, user_id: Uuid, wish: Wish) -> Result<JoinOutcome, DomainError> {
        if self.status != RoomStatus::Waiting {
            return Err(DomainError::RoomAlreadyDrawn);
        }

        if let Some(existing) = self.participants.iter_mut().find(|p| p.user_id == user_id) {
            existing.wish = wish;
            return Ok(JoinOutcome::WishUpdated);
        }

        self.participants.push(RoomParticipant {
            user_id,
            wish,
            joined_at: chrono::Utc::now().naive_utc(),
        });
        Ok(JoinOutcome::Joined)
    }

    /// Run the draw and move the room to `DRAWN`.
    ///
    /// Leaves the room untouched on any error.
    pub fn draw<R: Rng + ?Sized>(
        &mut self,
        requester: Uuid,
        strategy: DrawStrategy,
        rng: &mut R,
    ) -> Result<&Assignments, DomainError> {
        if !self.is_admin(requester) {
            return Err(DomainError::NotAuthorized(
                "only the room admin can run the draw".to_string(),
            ));
        }
        if self.status != RoomStatus::Waiting {
            return Err(DomainError::RoomAlreadyDrawn);
        }

        let assignments = draw(&self.participant_ids(), strategy, rng)?;
        self.status = RoomStatus::Drawn;
        Ok(self.assignments.insert(assignments))
    }

    /// The receiver `requester` was assigned in the draw
    pub fn target_of(&self, requester: Uuid) -> Result<Target, DomainError> {
        let assignments = match (self.status, &self.assignments) {
            (RoomStatus::Waiting, _) | (_, None) => return Err(DomainError::DrawNotPerformed),
            (_, Some(assignments)) => assignments,
        };

        let receiver_id = assignments
            .receiver_of(requester)
            .ok_or(DomainError::NotAParticipant)?;

        let wish = self
            .participant(receiver_id)
            .map(|p| p.wish.clone())
            .unwrap_or_default();

        Ok(Target { receiver_id, wish })
    }

    /// Close a drawn room. Completing a completed room is a no-op.
    pub fn complete(&mut self) -> Result<(), DomainError> {
        match self.status {
            RoomStatus::Waiting => Err(DomainError::DrawNotPerformed),
            RoomStatus::Drawn => {
                self.status = RoomStatus::Completed;
                Ok(())
            }
            RoomStatus::Completed => Ok(()),
        }
    }

    /// Drawn rooms whose deadline or event date lies before `today`
    pub fn is_due_for_completion(&self, today: NaiveDate, event_date: Option<NaiveDate>) -> bool {
        self.status == RoomStatus::Drawn
            && (self.deadline.map_or(false, |d| d < today)
                || event_date.map_or(false, |d| d < today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn santa_room(admin: Uuid) -> GiftExchangeRoom {
        GiftExchangeRoom::open(NewRoom {
            group_id: Uuid::new_v4(),
            event_id: None,
            admin_id: admin,
            title: "Office Santa".to_string(),
            budget: Some("1000".to_string()),
            deadline: None,
        })
    }

    fn room_with(n_guests: usize) -> (GiftExchangeRoom, Uuid) {
        let admin = Uuid::new_v4();
        let mut room = santa_room(admin);
        for _ in 0..n_guests {
            room.join(Uuid::new_v4(), Wish::default()).unwrap();
        }
        (room, admin)
    }

    fn wish(text: &str) -> Wish {
        Wish::new(Some(text.to_string()), None)
    }

    #[test]
    fn test_open_joins_admin() {
        let admin = Uuid::new_v4();
        let room = santa_room(admin);

        assert_eq!(room.status, RoomStatus::Waiting);
        assert_eq!(room.participant_ids().into_iter().collect::<Vec<_>>(), vec![admin]);
        assert!(room.assignments.is_none());
    }

    #[test]
    fn test_join_twice_updates_wish() {
        let (mut room, _) = room_with(0);
        let guest = Uuid::new_v4();

        assert_eq!(room.join(guest, wish("book")), Ok(JoinOutcome::Joined));
        assert_eq!(room.join(guest, wish("scarf")), Ok(JoinOutcome::WishUpdated));

        assert_eq!(room.participants.len(), 2);
        assert_eq!(room.participant(guest).unwrap().wish, wish("scarf"));
    }

    #[test]
    fn test_draw_requires_admin() {
        let (mut room, _) = room_with(3);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let result = room.draw(Uuid::new_v4(), DrawStrategy::Derangement, &mut rng);
        assert!(matches!(result, Err(DomainError::NotAuthorized(_))));
        assert_eq!(room.status, RoomStatus::Waiting);
    }

    #[test]
    fn test_draw_too_small_leaves_room_waiting() {
        let (mut room, admin) = room_with(1);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let result = room.draw(admin, DrawStrategy::Derangement, &mut rng);
        assert!(matches!(
            result,
            Err(DomainError::InsufficientParticipants { actual: 2, .. })
        ));
        assert_eq!(room.status, RoomStatus::Waiting);
        assert!(room.assignments.is_none());
    }

    #[test]
    fn test_second_draw_keeps_first_assignments() {
        let (mut room, admin) = room_with(4);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let first = room.draw(admin, DrawStrategy::Derangement, &mut rng).unwrap().clone();
        let second = room.draw(admin, DrawStrategy::Derangement, &mut rng);

        assert_eq!(second, Err(DomainError::RoomAlreadyDrawn));
        assert_eq!(room.assignments.as_ref(), Some(&first));
    }

    #[test]
    fn test_join_after_draw_rejected() {
        let (mut room, admin) = room_with(2);
        room.draw(admin, DrawStrategy::Cycle, &mut ChaCha8Rng::seed_from_u64(1))
            .unwrap();

        assert_eq!(
            room.join(Uuid::new_v4(), Wish::default()),
            Err(DomainError::RoomAlreadyDrawn)
        );
        assert_eq!(room.participants.len(), 3);
    }

    #[test]
    fn test_target_lifecycle() {
        let (mut room, admin) = room_with(2);
        assert_eq!(room.target_of(admin), Err(DomainError::DrawNotPerformed));

        room.draw(admin, DrawStrategy::Derangement, &mut ChaCha8Rng::seed_from_u64(5))
            .unwrap();

        let target = room.target_of(admin).unwrap();
        assert_ne!(target.receiver_id, admin);
        assert!(room.participant(target.receiver_id).is_some());
        assert_eq!(room.target_of(Uuid::new_v4()), Err(DomainError::NotAParticipant));

        room.complete().unwrap();
        assert_eq!(room.target_of(admin).unwrap(), target);
    }

    #[test]
    fn test_target_carries_receiver_wish() {
        let admin = Uuid::new_v4();
        let mut room = santa_room(admin);
        let guests: Vec<Uuid> = (0..2).map(|_| Uuid::new_v4()).collect();
        for (i, guest) in guests.iter().enumerate() {
            room.join(*guest, wish(&format!("gift {}", i))).unwrap();
        }
        room.draw(admin, DrawStrategy::Cycle, &mut ChaCha8Rng::seed_from_u64(9))
            .unwrap();

        for giver in room.participant_ids() {
            let target = room.target_of(giver).unwrap();
            let expected = room.participant(target.receiver_id).unwrap().wish.clone();
            assert_eq!(target.wish, expected);
        }
    }

    #[test]
    fn test_complete_transitions() {
        let (mut room, admin) = room_with(2);
        assert_eq!(room.complete(), Err(DomainError::DrawNotPerformed));

        room.draw(admin, DrawStrategy::Cycle, &mut ChaCha8Rng::seed_from_u64(2))
            .unwrap();
        room.complete().unwrap();
        assert_eq!(room.status, RoomStatus::Completed);
        assert!(!room.is_active());
        assert_eq!(room.complete(), Ok(()));
    }

    #[test]
    fn test_due_for_completion() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 26).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        let (mut room, admin) = room_with(2);
        room.deadline = Some(yesterday);

        assert!(!room.is_due_for_completion(today, None));

        room.draw(admin, DrawStrategy::Cycle, &mut ChaCha8Rng::seed_from_u64(3))
            .unwrap();
        assert!(room.is_due_for_completion(today, None));

        room.deadline = Some(today);
        assert!(!room.is_due_for_completion(today, None));
        assert!(room.is_due_for_completion(today, Some(yesterday)));
    }

    #[test]
    fn test_scope_rules() {
        let admin = Uuid::new_v4();
        let santa = santa_room(admin);
        let group_id = santa.group_id;

        assert_eq!(
            ensure_scope_free([&santa], group_id, None),
            Err(DomainError::DuplicateRoom)
        );
        // An angel room of the same group does not collide with the Santa room
        assert!(ensure_scope_free([&santa], group_id, Some(Uuid::new_v4())).is_ok());
        assert!(ensure_scope_free([&santa], Uuid::new_v4(), None).is_ok());

        let mut finished = santa.clone();
        finished.status = RoomStatus::Completed;
        assert!(ensure_scope_free([&finished], group_id, None).is_ok());
    }
}
