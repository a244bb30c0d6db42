//! Seats and teams at a four-seat table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, ValidationKind};

/// Fixed seat role. Declaration order is deal order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum SeatAlias {
    Nord,
    Sud,
    Est,
    Ouest,
}

/// Pairing of two opposite seats.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Team {
    NordSud,
    EstOuest,
}

impl SeatAlias {
    pub const ALL: [SeatAlias; 4] = [SeatAlias::Nord, SeatAlias::Sud, SeatAlias::Est, SeatAlias::Ouest];

    pub const fn as_str(self) -> &'static str {
        match self {
            SeatAlias::Nord => "Nord",
            SeatAlias::Sud => "Sud",
            SeatAlias::Est => "Est",
            SeatAlias::Ouest => "Ouest",
        }
    }

    pub const fn team(self) -> Team {
        match self {
            SeatAlias::Nord | SeatAlias::Sud => Team::NordSud,
            SeatAlias::Est | SeatAlias::Ouest => Team::EstOuest,
        }
    }

    /// Position in deal order (0..4).
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl Team {
    pub const ALL: [Team; 2] = [Team::NordSud, Team::EstOuest];

    pub const fn as_str(self) -> &'static str {
        match self {
            Team::NordSud => "NordSud",
            Team::EstOuest => "EstOuest",
        }
    }

    pub const fn seats(self) -> [SeatAlias; 2] {
        match self {
            Team::NordSud => [SeatAlias::Nord, SeatAlias::Sud],
            Team::EstOuest => [SeatAlias::Est, SeatAlias::Ouest],
        }
    }
}

impl fmt::Display for SeatAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeatAlias {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SeatAlias::ALL
            .into_iter()
            .find(|seat| seat.as_str() == s)
            .ok_or_else(|| {
                DomainError::validation(ValidationKind::InvalidSeat, format!("Unknown seat alias: {s}"))
            })
    }
}

impl FromStr for Team {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Team::ALL
            .into_iter()
            .find(|team| team.as_str() == s)
            .ok_or_else(|| {
                DomainError::validation(ValidationKind::InvalidTeam, format!("Unknown team: {s}"))
            })
    }
}
