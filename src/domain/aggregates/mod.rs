//! Aggregates - The per-user progression graph treated as a single unit

pub mod user_progression;

pub use user_progression::{HierarchyError, UserProgression};
