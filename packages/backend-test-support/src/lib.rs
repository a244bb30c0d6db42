//! Helpers shared by the backend's unit and integration tests: logging,
//! problem-details assertions and unique identifiers.

pub mod logging;
pub mod problem_details;
pub mod unique_helpers;
