//! Entities - Progression nodes, titles, quests, and the entry log

pub mod journal;
pub mod quest;
pub mod skill;
pub mod theme;
pub mod title;

pub use journal::JournalRecord;
pub use quest::{AutostartCondition, CompletionCondition, QuestStatus, QuestTemplate, QuestType, UserQuest};
pub use skill::Skill;
pub use theme::Theme;
pub use title::{EffectScope, EffectTarget, TitleEffect, TitleRank, TitleTemplate, UnlockCondition, UserTitle};

use serde::{Deserialize, Serialize};

/// Where a parcel of XP came from, tracked per node for analytics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpSource {
    Journal,
    Quest,
    Practice,
}
