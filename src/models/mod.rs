//! Core data models for the league scheduler.

mod availability;
mod color;
mod event;
mod ids;
mod roster;

pub use availability::*;
pub use color::*;
pub use event::*;
pub use ids::*;
pub use roster::*;
