//! UserProgression aggregate - The root for one user's entity graph
//!
//! Holds the theme/skill arenas, title and quest instances, the journal
//! history, and the processed-entry set backing idempotency. All hierarchy
//! edits go through this aggregate so parent references can never form a
//! cycle.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    JournalRecord, QuestStatus, Skill, Theme, UserQuest, UserTitle,
};
use crate::domain::value_objects::{
    EntryId, SkillId, ThemeId, TitleTemplateId, UserId, UserQuestId, UserTitleId,
};

/// Errors from hierarchy edits on the entity graph
#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    #[error("reparenting would create a cycle through {0}")]
    CycleDetected(String),

    #[error("unknown node referenced as parent: {0}")]
    UnknownParent(String),
}

/// One user's complete progression state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProgression {
    pub user_id: UserId,
    themes: HashMap<ThemeId, Theme>,
    skills: HashMap<SkillId, Skill>,
    titles: Vec<UserTitle>,
    quests: HashMap<UserQuestId, UserQuest>,
    journal: Vec<JournalRecord>,
    processed_entries: HashSet<EntryId>,
    coins: i64,
}

impl UserProgression {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            themes: HashMap::new(),
            skills: HashMap::new(),
            titles: Vec::new(),
            quests: HashMap::new(),
            journal: Vec::new(),
            processed_entries: HashSet::new(),
            coins: 0,
        }
    }

    // ========================================================================
    // Themes
    // ========================================================================

    pub fn add_theme(&mut self, theme: Theme) -> Result<ThemeId, HierarchyError> {
        if let Some(parent) = theme.parent_theme_id {
            if !self.themes.contains_key(&parent) {
                return Err(HierarchyError::UnknownParent(parent.to_string()));
            }
        }
        let id = theme.id;
        self.themes.insert(id, theme);
        Ok(id)
    }

    pub fn theme(&self, id: ThemeId) -> Option<&Theme> {
        self.themes.get(&id)
    }

    pub fn theme_mut(&mut self, id: ThemeId) -> Option<&mut Theme> {
        self.themes.get_mut(&id)
    }

    pub fn theme_by_name(&self, name: &str) -> Option<&Theme> {
        self.themes.values().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn themes(&self) -> impl Iterator<Item = &Theme> {
        self.themes.values()
    }

    pub fn themes_mut(&mut self) -> impl Iterator<Item = &mut Theme> {
        self.themes.values_mut()
    }

    /// Reparent a theme, rejecting edits that would create a cycle.
    /// The graph is left unchanged on error.
    pub fn set_theme_parent(
        &mut self,
        child: ThemeId,
        parent: Option<ThemeId>,
    ) -> Result<(), HierarchyError> {
        if let Some(parent_id) = parent {
            if !self.themes.contains_key(&parent_id) {
                return Err(HierarchyError::UnknownParent(parent_id.to_string()));
            }
            // Walk the ancestor chain from the proposed parent; finding the
            // child means the edit closes a loop.
            let mut cursor = Some(parent_id);
            while let Some(current) = cursor {
                if current == child {
                    return Err(HierarchyError::CycleDetected(child.to_string()));
                }
                cursor = self.themes.get(&current).and_then(|t| t.parent_theme_id);
            }
        }
        if let Some(theme) = self.themes.get_mut(&child) {
            theme.parent_theme_id = parent;
        }
        Ok(())
    }

    // ========================================================================
    // Skills
    // ========================================================================

    pub fn add_skill(&mut self, skill: Skill) -> Result<SkillId, HierarchyError> {
        if let Some(parent) = skill.parent_skill_id {
            if !self.skills.contains_key(&parent) {
                return Err(HierarchyError::UnknownParent(parent.to_string()));
            }
        }
        let id = skill.id;
        self.skills.insert(id, skill);
        Ok(id)
    }

    pub fn skill(&self, id: SkillId) -> Option<&Skill> {
        self.skills.get(&id)
    }

    pub fn skill_mut(&mut self, id: SkillId) -> Option<&mut Skill> {
        self.skills.get_mut(&id)
    }

    pub fn skills(&self) -> impl Iterator<Item = &Skill> {
        self.skills.values()
    }

    pub fn skills_mut(&mut self) -> impl Iterator<Item = &mut Skill> {
        self.skills.values_mut()
    }

    pub fn set_skill_parent(
        &mut self,
        child: SkillId,
        parent: Option<SkillId>,
    ) -> Result<(), HierarchyError> {
        if let Some(parent_id) = parent {
            if !self.skills.contains_key(&parent_id) {
                return Err(HierarchyError::UnknownParent(parent_id.to_string()));
            }
            let mut cursor = Some(parent_id);
            while let Some(current) = cursor {
                if current == child {
                    return Err(HierarchyError::CycleDetected(child.to_string()));
                }
                cursor = self.skills.get(&current).and_then(|s| s.parent_skill_id);
            }
        }
        if let Some(skill) = self.skills.get_mut(&child) {
            skill.parent_skill_id = parent;
        }
        Ok(())
    }

    // ========================================================================
    // Titles
    // ========================================================================

    pub fn titles(&self) -> &[UserTitle] {
        &self.titles
    }

    pub fn titles_mut(&mut self) -> &mut [UserTitle] {
        &mut self.titles
    }

    pub fn has_title(&self, template_id: TitleTemplateId) -> bool {
        self.titles.iter().any(|t| t.template_id == template_id)
    }

    /// Award a title. Set-once: a second award for the same template is
    /// refused. The user's first title is equipped automatically.
    pub fn award_title(
        &mut self,
        template_id: TitleTemplateId,
        now: DateTime<Utc>,
    ) -> Option<UserTitleId> {
        if self.has_title(template_id) {
            return None;
        }
        let mut title = UserTitle::new(template_id, now);
        if self.titles.is_empty() {
            title.equip();
        }
        let id = title.id;
        self.titles.push(title);
        Some(id)
    }

    // ========================================================================
    // Quests
    // ========================================================================

    pub fn add_quest(&mut self, quest: UserQuest) -> Result<UserQuestId, HierarchyError> {
        if let Some(parent) = quest.parent_quest_id {
            if !self.quests.contains_key(&parent) {
                return Err(HierarchyError::UnknownParent(parent.to_string()));
            }
        }
        let id = quest.id;
        self.quests.insert(id, quest);
        Ok(id)
    }

    pub fn quest(&self, id: UserQuestId) -> Option<&UserQuest> {
        self.quests.get(&id)
    }

    pub fn quest_mut(&mut self, id: UserQuestId) -> Option<&mut UserQuest> {
        self.quests.get_mut(&id)
    }

    pub fn quests(&self) -> impl Iterator<Item = &UserQuest> {
        self.quests.values()
    }

    pub fn quests_mut(&mut self) -> impl Iterator<Item = &mut UserQuest> {
        self.quests.values_mut()
    }

    pub fn set_quest_parent(
        &mut self,
        child: UserQuestId,
        parent: Option<UserQuestId>,
    ) -> Result<(), HierarchyError> {
        if let Some(parent_id) = parent {
            if !self.quests.contains_key(&parent_id) {
                return Err(HierarchyError::UnknownParent(parent_id.to_string()));
            }
            let mut cursor = Some(parent_id);
            while let Some(current) = cursor {
                if current == child {
                    return Err(HierarchyError::CycleDetected(child.to_string()));
                }
                cursor = self.quests.get(&current).and_then(|q| q.parent_quest_id);
            }
        }
        if let Some(quest) = self.quests.get_mut(&child) {
            quest.parent_quest_id = parent;
        }
        Ok(())
    }

    pub fn completed_quest_count(&self) -> u64 {
        self.quests
            .values()
            .filter(|q| q.status == QuestStatus::Completed)
            .count() as u64
    }

    // ========================================================================
    // Journal history and idempotency
    // ========================================================================

    pub fn journal(&self) -> &[JournalRecord] {
        &self.journal
    }

    pub fn is_processed(&self, entry_id: EntryId) -> bool {
        self.processed_entries.contains(&entry_id)
    }

    /// Record a processed entry in the permanent history
    pub fn record_entry(&mut self, record: JournalRecord) {
        self.processed_entries.insert(record.entry_id);
        self.journal.push(record);
    }

    // ========================================================================
    // Wallet
    // ========================================================================

    pub fn coins(&self) -> i64 {
        self.coins
    }

    pub fn add_coins(&mut self, amount: i64) {
        self.coins += amount;
    }
}
