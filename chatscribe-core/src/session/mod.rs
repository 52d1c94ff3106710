//! Capture session tracking

pub mod state;
pub mod tracker;

pub use state::SessionState;
pub use tracker::{Boundary, SessionTracker};
