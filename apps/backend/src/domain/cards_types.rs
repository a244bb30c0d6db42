//! Core card-related types for the 32-card coinche deck: Card, Rank, Suit

/// Suits in canonical deck order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Suit {
    Heart,
    Spade,
    Diamond,
    Club,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Heart, Suit::Spade, Suit::Diamond, Suit::Club];

    /// Prefix used by logical card ids (`heartK`).
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Suit::Heart => "heart",
            Suit::Spade => "spade",
            Suit::Diamond => "diamond",
            Suit::Club => "club",
        }
    }

    /// Suffix letter used by presentation ids (`Kh`).
    pub const fn letter(self) -> char {
        match self {
            Suit::Heart => 'h',
            Suit::Spade => 's',
            Suit::Diamond => 'd',
            Suit::Club => 'c',
        }
    }
}

/// Ranks in canonical deck order (the order cards are laid out per suit).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Rank {
    King,
    Queen,
    Jack,
    Ace,
    Ten,
    Nine,
    Eight,
    Seven,
}

impl Rank {
    pub const ALL: [Rank; 8] = [
        Rank::King,
        Rank::Queen,
        Rank::Jack,
        Rank::Ace,
        Rank::Ten,
        Rank::Nine,
        Rank::Eight,
        Rank::Seven,
    ];

    pub const fn token(self) -> &'static str {
        match self {
            Rank::King => "K",
            Rank::Queen => "Q",
            Rank::Jack => "J",
            Rank::Ace => "A",
            Rank::Ten => "10",
            Rank::Nine => "9",
            Rank::Eight => "8",
            Rank::Seven => "7",
        }
    }

    pub(crate) fn from_token(token: &str) -> Option<Rank> {
        Rank::ALL.into_iter().find(|rank| rank.token() == token)
    }
}

/// One of the 32 unique playing cards.
///
/// `Ord` follows canonical deck order (suit, then rank) and is only meant for
/// stable sorting; it carries no trick-taking meaning.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub const fn new(suit: Suit, rank: Rank) -> Self {
        Self { suit, rank }
    }

    /// Logical id, e.g. `heartK`, `club10`.
    pub fn id(&self) -> String {
        format!("{}{}", self.suit.id_prefix(), self.rank.token())
    }

    /// Rendering id, e.g. `Kh`, `10c`.
    pub fn presentation(&self) -> String {
        format!("{}{}", self.rank.token(), self.suit.letter())
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.suit.id_prefix(), self.rank.token())
    }
}
