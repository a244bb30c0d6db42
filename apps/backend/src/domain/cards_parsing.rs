//! Card parsing from logical ids (`heartK`) and presentation ids (`Kh`)

use std::str::FromStr;

use super::cards_types::{Card, Rank, Suit};
use crate::errors::domain::{DomainError, ValidationKind};

fn parse_error(s: &str) -> DomainError {
    DomainError::validation(ValidationKind::ParseCard, format!("Parse card: {s}"))
}

impl Card {
    /// Parse a logical id such as `spadeA` or `diamond10`.
    pub fn from_id(s: &str) -> Result<Card, DomainError> {
        Suit::ALL
            .into_iter()
            .find_map(|suit| {
                let token = s.strip_prefix(suit.id_prefix())?;
                Rank::from_token(token).map(|rank| Card { suit, rank })
            })
            .ok_or_else(|| parse_error(s))
    }

    /// Parse a presentation id such as `As` or `10d`.
    pub fn from_presentation(s: &str) -> Result<Card, DomainError> {
        let mut chars = s.chars();
        let letter = chars.next_back().ok_or_else(|| parse_error(s))?;
        let suit = Suit::ALL
            .into_iter()
            .find(|suit| suit.letter() == letter)
            .ok_or_else(|| parse_error(s))?;
        let rank = Rank::from_token(chars.as_str()).ok_or_else(|| parse_error(s))?;
        Ok(Card { suit, rank })
    }
}

/// Accepts either form; logical ids are tried first.
impl FromStr for Card {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Card::from_id(s).or_else(|_| Card::from_presentation(s))
    }
}
