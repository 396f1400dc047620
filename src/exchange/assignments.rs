use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use uuid::Uuid;

/// Reasons a giver -> receiver mapping is not a valid draw result
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("Participant {0} is assigned to themselves")]
    SelfAssignment(Uuid),

    #[error("Participant {0} receives more than one gift")]
    DuplicateReceiver(Uuid),

    #[error("Participant {0} has no one to give to")]
    MissingGiver(Uuid),

    #[error("Participant {0} was not part of the draw")]
    UnknownParticipant(Uuid),
}

/// Giver -> receiver mapping of a completed draw.
///
/// Always a bijection over the drawn participants with no fixed points:
/// every participant gives exactly once, receives exactly once, and never
/// to themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Uuid, Uuid>", into = "BTreeMap<Uuid, Uuid>")]
pub struct Assignments {
    pairs: BTreeMap<Uuid, Uuid>,
}

impl Assignments {
    /// Validate `pairs` against the participant set of the draw
    pub fn new(
        participants: &BTreeSet<Uuid>,
        pairs: BTreeMap<Uuid, Uuid>,
    ) -> Result<Self, AssignmentError> {
        if let Some(giver) = pairs.keys().find(|giver| !participants.contains(giver)) {
            return Err(AssignmentError::UnknownParticipant(*giver));
        }

        if let Some(missing) = participants.iter().find(|p| !pairs.contains_key(p)) {
            return Err(AssignmentError::MissingGiver(*missing));
        }

        let mut receivers = BTreeSet::new();
        for (giver, receiver) in &pairs {
            if giver == receiver {
                return Err(AssignmentError::SelfAssignment(*giver));
            }
            if !participants.contains(receiver) {
                return Err(AssignmentError::UnknownParticipant(*receiver));
            }
            if !receivers.insert(*receiver) {
                return Err(AssignmentError::DuplicateReceiver(*receiver));
            }
        }

        Ok(Self { pairs })
    }

    /// Who `giver` gives a gift to
    pub fn receiver_of(&self, giver: Uuid) -> Option<Uuid> {
        self.pairs.get(&giver).copied()
    }

    pub fn participants(&self) -> BTreeSet<Uuid> {
        self.pairs.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Uuid, Uuid)> + '_ {
        self.pairs.iter().map(|(giver, receiver)| (*giver, *receiver))
    }

    /// True when following givers to receivers visits everyone in one loop
    pub fn is_single_cycle(&self) -> bool {
        let Some(start) = self.pairs.keys().next().copied() else {
            return true;
        };

        let mut current = start;
        for step in 1..=self.pairs.len() {
            current = match self.receiver_of(current) {
                Some(next) => next,
                None => return false,
            };
            if current == start {
                return step == self.pairs.len();
            }
        }
        false
    }
}

impl TryFrom<BTreeMap<Uuid, Uuid>> for Assignments {
    type Error = AssignmentError;

    fn try_from(pairs: BTreeMap<Uuid, Uuid>) -> Result<Self, Self::Error> {
        let participants = pairs.keys().copied().collect();
        Self::new(&participants, pairs)
    }
}

impl From<Assignments> for BTreeMap<Uuid, Uuid> {
    fn from(assignments: Assignments) -> Self {
        assignments.pairs
    }
}
