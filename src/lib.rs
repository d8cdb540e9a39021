//! # League Scheduler
//!
//! Constraint-aware court/timeslot assignment engine for recreational
//! league flights.
//!
//! ## Architecture
//!
//! - **models**: Reference data, availability records and server payloads
//! - **availability**: Per-player availability loaded once per session
//! - **grid**: The court × timeslot assignment matrix
//! - **mediator**: Drag/drop state machine, the only writer of the grid
//! - **calculate**: Derived per-player metrics and the pair matrix
//! - **render**: Availability highlighting, conflict marks, legend
//! - **sync**: Server gateway (HTTP, dry-run, recording)
//! - **session**: Context object tying the above together
//! - **config**: Configuration loading and validation

pub mod availability;
pub mod calculate;
pub mod config;
pub mod grid;
pub mod mediator;
pub mod models;
pub mod render;
pub mod session;
pub mod sync;

pub use models::*;
