use super::amount::validate_positive_amount;
use crate::error::DomainError;
use crate::models::{Contribution, ContributionStatus, EventParticipant, ParticipationStatus};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use uuid::Uuid;

/// Participation records and the contribution log of one event.
///
/// A participant's `paid_amount` always equals the sum of their confirmed
/// contributions: it changes only on the single PENDING -> CONFIRMED step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ledger {
    participants: Vec<EventParticipant>,
    contributions: Vec<Contribution>,
}

impl Ledger {
    pub fn new(participants: Vec<EventParticipant>, contributions: Vec<Contribution>) -> Self {
        Self {
            participants,
            contributions,
        }
    }

    pub fn participants(&self) -> &[EventParticipant] {
        &self.participants
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    pub fn participant(&self, user_id: Uuid) -> Option<&EventParticipant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }

    pub fn contribution(&self, id: Uuid) -> Option<&Contribution> {
        self.contributions.iter().find(|c| c.id == id)
    }

    pub fn is_joined(&self, user_id: Uuid) -> bool {
        self.participant(user_id).map_or(false, |p| p.is_joined())
    }

    /// Make `user_id` a JOINED participant, creating the record if needed
    pub fn ensure_joined(&mut self, user_id: Uuid) -> &EventParticipant {
        let index = match self.participants.iter().position(|p| p.user_id == user_id) {
            Some(index) => {
                self.participants[index].status = ParticipationStatus::Joined;
                index
            }
            None => {
                self.participants.push(EventParticipant::joined(user_id));
                self.participants.len() - 1
            }
        };
        &self.participants[index]
    }

    /// Append a PENDING contribution. Contributing joins the event.
    pub fn record_contribution(
        &mut self,
        event_id: Uuid,
        user_id: Uuid,
        amount: Decimal,
    ) -> Result<&Contribution, DomainError> {
        let amount = validate_positive_amount(amount)?;

        self.ensure_joined(user_id);
        self.contributions.push(Contribution {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            amount,
            status: ContributionStatus::Pending,
            created_at: chrono::Utc::now().naive_utc(),
        });

        let last = self.contributions.len() - 1;
        Ok(&self.contributions[last])
    }

    /// PENDING -> CONFIRMED, crediting the contributor's paid amount
    pub fn confirm(&mut self, contribution_id: Uuid) -> Result<&Contribution, DomainError> {
        let index = self.pending_index(contribution_id)?;
        let (user_id, amount) = {
            let contribution = &mut self.contributions[index];
            contribution.status = ContributionStatus::Confirmed;
            (contribution.user_id, contribution.amount)
        };

        match self.participants.iter_mut().find(|p| p.user_id == user_id) {
            Some(participant) => participant.paid_amount += amount,
            None => {
                let mut participant = EventParticipant::joined(user_id);
                participant.paid_amount = amount;
                self.participants.push(participant);
            }
        }

        Ok(&self.contributions[index])
    }

    /// PENDING -> REJECTED. Paid amounts are untouched.
    pub fn reject(&mut self, contribution_id: Uuid) -> Result<&Contribution, DomainError> {
        let index = self.pending_index(contribution_id)?;
        self.contributions[index].status = ContributionStatus::Rejected;
        Ok(&self.contributions[index])
    }

    /// Absent -> JOINED, JOINED <-> DECLINED
    pub fn toggle_participation(&mut self, user_id: Uuid) -> ParticipationStatus {
        match self.participants.iter_mut().find(|p| p.user_id == user_id) {
            Some(participant) => {
                participant.status = participant.status.toggled();
                participant.status
            }
            None => {
                self.participants.push(EventParticipant::joined(user_id));
                ParticipationStatus::Joined
            }
        }
    }

    /// Confirmed money of JOINED participants
    pub fn collected(&self) -> Decimal {
        self.participants
            .iter()
            .filter(|p| p.is_joined())
            .map(|p| p.paid_amount)
            .sum()
    }

    /// Percentage of `target` collected, rounded half away from zero and capped at 100
    pub fn progress(&self, target: Decimal) -> u32 {
        if target <= Decimal::ZERO {
            return 0;
        }

        let percent = (self.collected() * Decimal::ONE_HUNDRED / target)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .min(Decimal::ONE_HUNDRED);
        percent.to_u32().unwrap_or(0)
    }

    pub fn pending_count(&self) -> usize {
        self.contributions
            .iter()
            .filter(|c| c.status == ContributionStatus::Pending)
            .count()
    }

    fn pending_index(&self, contribution_id: Uuid) -> Result<usize, DomainError> {
        let index = self
            .contributions
            .iter()
            .position(|c| c.id == contribution_id)
            .ok_or(DomainError::InvalidContributionState {
                id: contribution_id,
                status: None,
            })?;

        match self.contributions[index].status {
            ContributionStatus::Pending => Ok(index),
            status => Err(DomainError::InvalidContributionState {
                id: contribution_id,
                status: Some(status),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(amount: i64) -> Decimal {
        Decimal::from(amount)
    }

    fn confirmed_sum(ledger: &Ledger, user_id: Uuid) -> Decimal {
        ledger
            .contributions()
            .iter()
            .filter(|c| c.user_id == user_id && c.status == ContributionStatus::Confirmed)
            .map(|c| c.amount)
            .sum()
    }

    #[test]
    fn test_contribution_must_be_positive() {
        let mut ledger = Ledger::default();
        let user = Uuid::new_v4();

        assert_eq!(
            ledger.record_contribution(Uuid::new_v4(), user, Decimal::ZERO),
            Err(DomainError::InvalidAmount(Decimal::ZERO))
        );
        assert!(ledger.participant(user).is_none());
        assert!(ledger.contributions().is_empty());
    }

    #[test]
    fn test_contributing_joins_with_zero_paid() {
        let mut ledger = Ledger::default();
        let user = Uuid::new_v4();

        let status = ledger
            .record_contribution(Uuid::new_v4(), user, money(500))
            .unwrap()
            .status;

        assert_eq!(status, ContributionStatus::Pending);
        let participant = ledger.participant(user).unwrap();
        assert!(participant.is_joined());
        assert_eq!(participant.paid_amount, Decimal::ZERO);
    }

    #[test]
    fn test_double_confirm_credits_once() {
        let mut ledger = Ledger::default();
        let user = Uuid::new_v4();
        let id = ledger
            .record_contribution(Uuid::new_v4(), user, money(2000))
            .unwrap()
            .id;

        ledger.confirm(id).unwrap();
        assert_eq!(
            ledger.confirm(id),
            Err(DomainError::InvalidContributionState {
                id,
                status: Some(ContributionStatus::Confirmed)
            })
        );
        assert_eq!(ledger.participant(user).unwrap().paid_amount, money(2000));
        assert_eq!(confirmed_sum(&ledger, user), money(2000));
    }

    #[test]
    fn test_reject_then_confirm_fails() {
        let mut ledger = Ledger::default();
        let user = Uuid::new_v4();
        let id = ledger
            .record_contribution(Uuid::new_v4(), user, money(300))
            .unwrap()
            .id;

        ledger.reject(id).unwrap();
        assert!(matches!(
            ledger.confirm(id),
            Err(DomainError::InvalidContributionState { .. })
        ));
        assert_eq!(ledger.contribution(id).unwrap().status, ContributionStatus::Rejected);
        assert_eq!(ledger.participant(user).unwrap().paid_amount, Decimal::ZERO);
    }

    #[test]
    fn test_missing_contribution_is_not_pending() {
        let mut ledger = Ledger::default();
        let id = Uuid::new_v4();
        let missing = DomainError::InvalidContributionState { id, status: None };
        assert_eq!(ledger.reject(id), Err(missing.clone()));
        assert_eq!(ledger.confirm(id).unwrap_err(), missing);
    }

    #[test]
    fn test_collected_and_progress() {
        let mut ledger = Ledger::default();
        let event_id = Uuid::new_v4();
        for amount in [2000, 1500] {
            let id = ledger
                .record_contribution(event_id, Uuid::new_v4(), money(amount))
                .unwrap()
                .id;
            ledger.confirm(id).unwrap();
        }

        assert_eq!(ledger.collected(), money(3500));
        assert_eq!(ledger.progress(money(5000)), 70);
        assert_eq!(ledger.progress(money(3000)), 100);
        assert_eq!(ledger.progress(Decimal::ZERO), 0);
    }

    #[test]
    fn test_progress_rounds_half_up() {
        let mut ledger = Ledger::default();
        let id = ledger
            .record_contribution(Uuid::new_v4(), Uuid::new_v4(), money(1))
            .unwrap()
            .id;
        ledger.confirm(id).unwrap();

        // 1/200 = 0.5%
        assert_eq!(ledger.progress(money(200)), 1);
        // 1/300 = 0.33%
        assert_eq!(ledger.progress(money(300)), 0);
    }

    #[test]
    fn test_declined_money_is_kept_but_not_counted() {
        let mut ledger = Ledger::default();
        let user = Uuid::new_v4();
        let id = ledger
            .record_contribution(Uuid::new_v4(), user, money(1000))
            .unwrap()
            .id;
        ledger.confirm(id).unwrap();

        assert_eq!(ledger.toggle_participation(user), ParticipationStatus::Declined);
        assert_eq!(ledger.collected(), Decimal::ZERO);
        assert_eq!(ledger.participant(user).unwrap().paid_amount, money(1000));

        assert_eq!(ledger.toggle_participation(user), ParticipationStatus::Joined);
        assert_eq!(ledger.collected(), money(1000));
    }

    #[test]
    fn test_toggle_creates_joined_record() {
        let mut ledger = Ledger::default();
        let user = Uuid::new_v4();
        assert_eq!(ledger.toggle_participation(user), ParticipationStatus::Joined);
        assert!(ledger.is_joined(user));
    }

    #[test]
    fn test_contributing_rejoins_declined_participant() {
        let mut ledger = Ledger::default();
        let user = Uuid::new_v4();
        ledger.toggle_participation(user);
        ledger.toggle_participation(user);
        assert!(!ledger.is_joined(user));

        ledger
            .record_contribution(Uuid::new_v4(), user, money(10))
            .unwrap();
        assert!(ledger.is_joined(user));
        assert_eq!(ledger.participants().len(), 1);
        assert_eq!(ledger.pending_count(), 1);
    }
}
