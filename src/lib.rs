//! StatusWindow Engine - Progression and rules engine for real-life RPG activity tracking
//!
//! The engine turns a categorized activity record into XP, level-ups, rank
//! changes, title unlocks, quest completions, reward distribution, and decay
//! of neglected progression branches. It consumes a single input type
//! ([`CategorizationResult`]) and produces a single output type
//! ([`ProgressionDelta`]); it performs no I/O, networking, or language
//! interpretation itself.
//!
//! Layering:
//! - `domain`: entities, value objects, and the per-user aggregate
//! - `application`: the template bank, the ledger / title / quest services,
//!   and the coordinator that sequences them
//! - `infrastructure`: configuration and the per-user registry

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::dto::{CategorizationResult, ProgressionDelta};
pub use application::services::{ProgressionEngine, TemplateBank};
pub use domain::aggregates::UserProgression;
pub use infrastructure::config::EngineConfig;
pub use infrastructure::registry::UserRegistry;
