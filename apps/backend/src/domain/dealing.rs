//! Deck engine: the fixed 32-card deck and seeded dealing into four hands.
//!
//! Dealing is a pure function of the deck and a seed. Where the seed comes
//! from is injected through [`SeedSource`]: production draws a fresh seed
//! from the OS for every deal, tests pin one with [`FixedSeed`].

use std::sync::Arc;

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::{SeedableRng, TryRngCore};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::domain::{Card, Rank, SeatAlias, Suit};

pub const DECK_SIZE: usize = 32;
pub const HAND_SIZE: usize = 8;

/// Cards held by one seat for the current deal.
pub type Hand = Vec<Card>;

/// Generate the full 32-card deck in canonical order (suit-major).
pub fn build_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card { suit, rank });
        }
    }
    deck
}

/// Fisher-Yates shuffle driven by a ChaCha20 stream seeded with `seed`.
pub fn shuffle_with_seed(deck: &mut [Card], seed: u64) {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    deck.shuffle(&mut rng);
}

/// Result of one deal, kept on the session for audit and replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    pub seed: u64,
    pub shuffled: Vec<Card>,
    pub hands: [Hand; 4],
}

impl Deal {
    pub fn hand(&self, seat: SeatAlias) -> &Hand {
        &self.hands[seat.index()]
    }
}

/// Shuffle `deck` with `seed` and cut it into four contiguous groups of
/// eight: Nord gets 0..8, Sud 8..16, Est 16..24, Ouest 24..32.
///
/// Hands are sorted for display; `shuffled` keeps the dealt order.
pub fn deal_hands(deck: &[Card], seed: u64) -> Deal {
    let mut shuffled = deck.to_vec();
    shuffle_with_seed(&mut shuffled, seed);

    let mut hands: [Hand; 4] = Default::default();
    for (slot, chunk) in hands.iter_mut().zip(shuffled.chunks(HAND_SIZE)) {
        let mut hand = chunk.to_vec();
        hand.sort();
        *slot = hand;
    }

    Deal {
        seed,
        shuffled,
        hands,
    }
}

/// Source of shuffle seeds, consulted once per deal.
pub trait SeedSource: Send + Sync {
    fn next_seed(&self) -> u64;
}

/// Fresh OS entropy for every deal.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSeed;

impl SeedSource for OsSeed {
    fn next_seed(&self) -> u64 {
        OsRng
            .try_next_u64()
            .unwrap_or_else(|_| rand::random::<u64>())
    }
}

/// Always the same seed; reproducible deals for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedSeed(pub u64);

impl SeedSource for FixedSeed {
    fn next_seed(&self) -> u64 {
        self.0
    }
}

/// Deals complete hands using the injected seed source.
#[derive(Clone)]
pub struct Dealer {
    seeds: Arc<dyn SeedSource>,
}

impl Dealer {
    pub fn new(seeds: Arc<dyn SeedSource>) -> Self {
        Self { seeds }
    }

    pub fn with_os_entropy() -> Self {
        Self::new(Arc::new(OsSeed))
    }

    pub fn deal(&self) -> Deal {
        deal_hands(&build_deck(), self.seeds.next_seed())
    }
}

impl Default for Dealer {
    fn default() -> Self {
        Self::with_os_entropy()
    }
}

impl std::fmt::Debug for Dealer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dealer").finish_non_exhaustive()
    }
}
