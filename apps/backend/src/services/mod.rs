pub mod coordinator;
pub mod games;
pub mod persistence;
