//! Template Bank - Content-addressed, de-duplicated store of reusable
//! title and quest templates
//!
//! Templates are shared across users and effectively immutable once
//! published; personalization lives on per-user instances only. Any
//! creation path must call `find_*_or_none` before asking the generation
//! collaborator for a new template - the dedupe key is what bounds
//! external-generation cost.

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::entities::{EffectScope, QuestTemplate, QuestType, TitleEffect, TitleTemplate};
use crate::domain::value_objects::{QuestTemplateId, TitleTemplateId};

/// Errors from bank operations
#[derive(Debug, thiserror::Error)]
pub enum BankError {
    /// An equivalent template already exists under this key; the caller
    /// should re-fetch via `find_*_or_none`
    #[error("a template is already published under dedupe key {0}")]
    DuplicateKey(String),
}

/// Shared bank of title and quest templates
#[derive(Debug, Default, Clone)]
pub struct TemplateBank {
    titles: HashMap<TitleTemplateId, TitleTemplate>,
    quests: HashMap<QuestTemplateId, QuestTemplate>,
    title_keys: HashMap<String, TitleTemplateId>,
    quest_keys: HashMap<String, QuestTemplateId>,
}

/// Derive a dedupe key from normalized (name, kind, scope)
///
/// Normalization lowercases and collapses whitespace so semantically
/// identical templates hash to the same key.
pub fn dedupe_key(name: &str, kind: &str, scope: &str) -> String {
    let normalize = |s: &str| s.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ");

    let mut hasher = Sha256::new();
    hasher.update(normalize(name));
    hasher.update(b"|");
    hasher.update(normalize(kind));
    hasher.update(b"|");
    hasher.update(normalize(scope));
    hex::encode(hasher.finalize())
}

impl TemplateBank {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Titles
    // ========================================================================

    /// The dedupe key a title template publishes under
    pub fn title_key(template: &TitleTemplate) -> String {
        let scope = match &template.effect {
            TitleEffect::XpMultiplier { scope, .. }
            | TitleEffect::DifficultyModifier { scope, .. } => match scope {
                EffectScope::Theme => "theme",
                EffectScope::Skill => "skill",
                EffectScope::All => "all",
            },
            TitleEffect::Unknown(_) => "unknown",
        };
        dedupe_key(&template.name, "title", scope)
    }

    pub fn find_title_or_none(&self, key: &str) -> Option<&TitleTemplate> {
        self.title_keys.get(key).and_then(|id| self.titles.get(id))
    }

    /// Publish a title template; fails with `DuplicateKey` if an equivalent
    /// template already exists
    pub fn publish_title(&mut self, template: TitleTemplate) -> Result<TitleTemplateId, BankError> {
        let key = Self::title_key(&template);
        if self.title_keys.contains_key(&key) {
            return Err(BankError::DuplicateKey(key));
        }

        let id = template.id;
        debug!(template_id = %id, name = %template.name, "Publishing title template");
        self.title_keys.insert(key, id);
        self.titles.insert(id, template);
        Ok(id)
    }

    pub fn title(&self, id: TitleTemplateId) -> Option<&TitleTemplate> {
        self.titles.get(&id)
    }

    pub fn title_templates(&self) -> impl Iterator<Item = &TitleTemplate> {
        self.titles.values()
    }

    // ========================================================================
    // Quests
    // ========================================================================

    /// The dedupe key a quest template publishes under
    pub fn quest_key(template: &QuestTemplate) -> String {
        let scope = match template.quest_type {
            QuestType::Daily => "daily",
            QuestType::Timed => "timed",
            QuestType::Periodic => "periodic",
            QuestType::Repeatable => "repeatable",
        };
        dedupe_key(&template.name, "quest", scope)
    }

    pub fn find_quest_or_none(&self, key: &str) -> Option<&QuestTemplate> {
        self.quest_keys.get(key).and_then(|id| self.quests.get(id))
    }

    /// Publish a quest template; fails with `DuplicateKey` if an equivalent
    /// template already exists
    pub fn publish_quest(&mut self, template: QuestTemplate) -> Result<QuestTemplateId, BankError> {
        let key = Self::quest_key(&template);
        if self.quest_keys.contains_key(&key) {
            return Err(BankError::DuplicateKey(key));
        }

        let id = template.id;
        debug!(template_id = %id, name = %template.name, "Publishing quest template");
        self.quest_keys.insert(key, id);
        self.quests.insert(id, template);
        Ok(id)
    }

    pub fn quest(&self, id: QuestTemplateId) -> Option<&QuestTemplate> {
        self.quests.get(&id)
    }

    pub fn quest_templates(&self) -> impl Iterator<Item = &QuestTemplate> {
        self.quests.values()
    }
}
