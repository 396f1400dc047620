//! Random giver -> receiver assignment.

use crate::error::DomainError;
use crate::exchange::Assignments;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Smallest group a draw is allowed for
pub const MIN_PARTICIPANTS: usize = 3;

/// Resample budget of the rejection-sampling strategy
pub const MAX_DRAW_ATTEMPTS: u32 = 100;

/// How the assignment is sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawStrategy {
    /// Uniform over all derangements: shuffle receivers, resample on a fixed point
    #[default]
    Derangement,
    /// Shuffle once, everyone gives to the next in line; always a single cycle
    Cycle,
}

impl DrawStrategy {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "derangement" => Ok(DrawStrategy::Derangement),
            "cycle" => Ok(DrawStrategy::Cycle),
            _ => Err(format!(
                "Invalid DRAW_STRATEGY: {}. Must be one of: derangement, cycle",
                s
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DrawStrategy::Derangement => "derangement",
            DrawStrategy::Cycle => "cycle",
        }
    }
}

/// Where draw randomness comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomSource {
    /// OS entropy, for production
    Entropy,
    /// Reproducible draws
    Seeded(u64),
}

impl RandomSource {
    pub fn rng(&self) -> ChaCha8Rng {
        match self {
            RandomSource::Entropy => ChaCha8Rng::from_entropy(),
            RandomSource::Seeded(seed) => ChaCha8Rng::seed_from_u64(*seed),
        }
    }
}

/// Draw a giver -> receiver mapping with no self-assignment
///
/// # Errors
/// * `InsufficientParticipants` - fewer than [`MIN_PARTICIPANTS`]
/// * `DrawFailed` - rejection sampling ran out of attempts
pub fn draw<R: Rng + ?Sized>(
    participants: &BTreeSet<Uuid>,
    strategy: DrawStrategy,
    rng: &mut R,
) -> Result<Assignments, DomainError> {
    draw_with_limit(participants, strategy, rng, MAX_DRAW_ATTEMPTS)
}

/// [`draw`] with an explicit resample budget
pub fn draw_with_limit<R: Rng + ?Sized>(
    participants: &BTreeSet<Uuid>,
    strategy: DrawStrategy,
    rng: &mut R,
    max_attempts: u32,
) -> Result<Assignments, DomainError> {
    if participants.len() < MIN_PARTICIPANTS {
        return Err(DomainError::InsufficientParticipants {
            required: MIN_PARTICIPANTS,
            actual: participants.len(),
        });
    }

    match strategy {
        DrawStrategy::Cycle => draw_cycle(participants, rng),
        DrawStrategy::Derangement => draw_derangement(participants, rng, max_attempts),
    }
}

fn draw_cycle<R: Rng + ?Sized>(
    participants: &BTreeSet<Uuid>,
    rng: &mut R,
) -> Result<Assignments, DomainError> {
    let mut order: Vec<Uuid> = participants.iter().copied().collect();
    order.shuffle(rng);

    let pairs = order
        .iter()
        .enumerate()
        .map(|(i, giver)| (*giver, order[(i + 1) % order.len()]))
        .collect::<BTreeMap<_, _>>();

    Assignments::new(participants, pairs).map_err(|_| DomainError::DrawFailed { attempts: 1 })
}

fn draw_derangement<R: Rng + ?Sized>(
    participants: &BTreeSet<Uuid>,
    rng: &mut R,
    max_attempts: u32,
) -> Result<Assignments, DomainError> {
    let givers: Vec<Uuid> = participants.iter().copied().collect();
    let mut receivers = givers.clone();

    for _ in 0..max_attempts {
        receivers.shuffle(rng);

        if givers.iter().zip(&receivers).any(|(giver, receiver)| giver == receiver) {
            continue;
        }

        let pairs = givers
            .iter()
            .copied()
            .zip(receivers.iter().copied())
            .collect::<BTreeMap<_, _>>();

        return Assignments::new(participants, pairs)
            .map_err(|_| DomainError::DrawFailed { attempts: max_attempts });
    }

    Err(DomainError::DrawFailed {
        attempts: max_attempts,
    })
}
