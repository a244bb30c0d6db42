//! Domain layer: cards, seats, dealing and the persisted records.

pub mod cards_parsing;
pub mod cards_serde;
pub mod cards_types;
pub mod dealing;
pub mod ids;
pub mod records;
pub mod seats;

pub use cards_types::{Card, Rank, Suit};
pub use dealing::{build_deck, deal_hands, Deal, Dealer, Hand};
pub use records::{GameSession, PlayedCardEntry, Player, SeatAssignment, TrickRecord, TrickSlot};
pub use seats::{SeatAlias, Team};
