//! Data transfer objects at the engine boundary

pub mod categorization;
pub mod progression_delta;

pub use categorization::{CategorizationResult, SkillPractice};
pub use progression_delta::{ProgressionDelta, SkillDelta, ThemeDelta};
