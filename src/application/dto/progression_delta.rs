//! Progression Delta - The engine's single output
//!
//! Summarizes everything one invocation changed. Owned by the coordinator
//! for the duration of one invocation, then handed to the persistence /
//! presentation collaborator and discarded.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    EntryId, Rank, Reward, SkillId, ThemeId, TitleTemplateId, UserQuestId,
};

/// XP/level movement on one theme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeDelta {
    pub theme_id: ThemeId,
    pub xp_gained: f64,
    pub level_before: u32,
    pub level_after: u32,
}

/// XP/level/rank movement on one skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDelta {
    pub skill_id: SkillId,
    pub xp_gained: f64,
    pub level_before: u32,
    pub level_after: u32,
    pub rank_before: Rank,
    pub rank_after: Rank,
}

/// Everything one engine invocation changed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionDelta {
    pub entry_id: EntryId,
    pub theme_deltas: Vec<ThemeDelta>,
    pub skill_deltas: Vec<SkillDelta>,
    pub unlocked_titles: Vec<TitleTemplateId>,
    pub completed_quests: Vec<UserQuestId>,
    pub rewards: Reward,
}

impl ProgressionDelta {
    /// The all-zero delta, emitted when an entry was already processed
    pub fn empty(entry_id: EntryId) -> Self {
        Self {
            entry_id,
            theme_deltas: Vec::new(),
            skill_deltas: Vec::new(),
            unlocked_titles: Vec::new(),
            completed_quests: Vec::new(),
            rewards: Reward::default(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.theme_deltas.is_empty()
            && self.skill_deltas.is_empty()
            && self.unlocked_titles.is_empty()
            && self.completed_quests.is_empty()
            && self.rewards.is_empty()
    }
}
