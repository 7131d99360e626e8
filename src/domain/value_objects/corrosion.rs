//! Corrosion - staged decay of a progression node from neglect
//!
//! `New` is the unlocked-but-never-touched state and never decays. Once a
//! node has seen activity it sits at `Fresh`, and a stale node advances one
//! stage per evaluation tick: Fresh -> Old -> Patterned -> Unrecovered.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrosionState {
    New,
    Fresh,
    Old,
    Patterned,
    Unrecovered,
}

impl Default for CorrosionState {
    fn default() -> Self {
        Self::New
    }
}

impl CorrosionState {
    /// The next stage after one missed staleness window
    ///
    /// `New` has no history to corrode and `Unrecovered` is the floor.
    pub fn decayed(self) -> Self {
        match self {
            Self::New => Self::New,
            Self::Fresh => Self::Old,
            Self::Old => Self::Patterned,
            Self::Patterned => Self::Unrecovered,
            Self::Unrecovered => Self::Unrecovered,
        }
    }

    /// Whether this state is one of the decay stages
    pub fn is_decayed(self) -> bool {
        matches!(self, Self::Old | Self::Patterned | Self::Unrecovered)
    }

    /// XP-rate modifier consumed by quest generation
    ///
    /// Corrosion modulates generation inputs but never blocks progression.
    pub fn xp_rate_modifier(self) -> f64 {
        match self {
            Self::New | Self::Fresh => 1.0,
            Self::Old => 0.9,
            Self::Patterned => 0.75,
            Self::Unrecovered => 0.5,
        }
    }

    /// Difficulty modifier consumed by quest generation
    pub fn difficulty_modifier(self) -> f64 {
        match self {
            Self::New | Self::Fresh => 1.0,
            Self::Old => 0.9,
            Self::Patterned => 0.8,
            Self::Unrecovered => 0.65,
        }
    }
}
