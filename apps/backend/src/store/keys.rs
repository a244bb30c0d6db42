//! Persistent key layout.
//!
//! ```text
//! game/<sessionId>                                            session record
//! player/<playerId>                                           player + hand
//! game/<sessionId>/distrib/<round>/player/<alias>/card/<seq>  played card
//! game/<sessionId>/distrib/<round>/team/<team>                trick set
//! refCards                                                    card id → presentation
//! ```

use crate::domain::{SeatAlias, Team};

pub const REF_CARDS_KEY: &str = "refCards";

pub fn session_key(session_id: &str) -> String {
    format!("game/{session_id}")
}

pub fn player_key(player_id: &str) -> String {
    format!("player/{player_id}")
}

pub fn played_card_key(session_id: &str, round: u32, seat: SeatAlias, sequence: u32) -> String {
    format!("game/{session_id}/distrib/{round}/player/{seat}/card/{sequence}")
}

pub fn trick_key(session_id: &str, round: u32, team: Team) -> String {
    format!("game/{session_id}/distrib/{round}/team/{team}")
}
