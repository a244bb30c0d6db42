//! Repository functions over the key-value store.

pub mod games;
pub mod ledger;
pub mod players;
