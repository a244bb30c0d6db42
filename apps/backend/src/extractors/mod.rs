pub mod session_id;

pub use session_id::{PlayerId, SessionId};
