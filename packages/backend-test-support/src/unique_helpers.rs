//! Test helpers for generating unique test data
//!
//! Session and player identifiers must be alphanumeric, so these helpers
//! strip the hyphens out of a v4 UUID.

use uuid::Uuid;

/// Generate a unique alphanumeric identifier with the given prefix
///
/// # Examples
/// ```
/// use backend_test_support::unique_helpers::unique_id;
///
/// let id1 = unique_id("game");
/// let id2 = unique_id("game");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("game"));
/// assert!(id1.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn unique_id(prefix: &str) -> String {
    format!("{}{}", prefix, Uuid::new_v4().simple())
}
