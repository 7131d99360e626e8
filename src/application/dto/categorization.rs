//! Categorization Result - The engine's single external input
//!
//! Produced by the language-understanding collaborator strictly before the
//! engine runs. The `entry_id` doubles as the idempotency key: reprocessing
//! an already-applied id is a no-op.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{EntryId, Sentiment, SkillId, ThemeId};

/// Practice minutes attributed to one skill
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillPractice {
    pub skill_id: SkillId,
    pub minutes: f64,
}

/// A categorized activity record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizationResult {
    /// Unique source-entry identifier; the coordinator rejects reprocessing
    pub entry_id: EntryId,
    /// Themes the activity touched
    pub theme_ids: Vec<ThemeId>,
    /// Skills practiced, with minutes
    pub skill_practice: Vec<SkillPractice>,
    pub sentiment: Sentiment,
    /// Free-form tokens for quest matching
    pub match_tokens: Vec<String>,
}

impl CategorizationResult {
    pub fn new(entry_id: EntryId) -> Self {
        Self {
            entry_id,
            theme_ids: Vec::new(),
            skill_practice: Vec::new(),
            sentiment: Sentiment::Neutral,
            match_tokens: Vec::new(),
        }
    }

    pub fn with_themes(mut self, theme_ids: impl IntoIterator<Item = ThemeId>) -> Self {
        self.theme_ids.extend(theme_ids);
        self
    }

    pub fn with_practice(mut self, skill_id: SkillId, minutes: f64) -> Self {
        self.skill_practice.push(SkillPractice { skill_id, minutes });
        self
    }

    pub fn with_sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = sentiment;
        self
    }

    pub fn with_tokens(mut self, tokens: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.match_tokens.extend(tokens.into_iter().map(|t| t.into()));
        self
    }
}
