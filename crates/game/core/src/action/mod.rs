//! Move and attack vocabulary shared by the world interface and its callers.
mod commit;
mod direction;

pub use commit::{AttackTarget, Commit};
pub use direction::Direction;
