//! Drag sessions and drop commits
//!
//! [`DragCoordinator`] owns the single active gesture and publishes its
//! lifecycle; [`commit_drop`] turns the final intent into store mutations.

pub mod commit;
pub mod session;

pub use commit::{commit_drop, placement_for, DropPayload};
pub use session::{DragCoordinator, DragEvent, DragSession, DragSource, SessionEnd};
