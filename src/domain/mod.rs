//! Domain layer - Core progression logic with no external dependencies
//!
//! This layer contains:
//! - Entities: Theme, Skill, Title, Quest, JournalRecord
//! - Value Objects: ids, Rank, CorrosionState, LevelCurve, Reward
//! - Aggregates: UserProgression aggregate root

pub mod aggregates;
pub mod entities;
pub mod value_objects;
