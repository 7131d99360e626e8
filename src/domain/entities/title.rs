//! Title entities - Persistent/temporary modifiers unlocked by rule conditions
//!
//! Titles follow the template/instance split: `TitleTemplate` lives in the
//! shared bank (immutable once published), `UserTitle` is the per-user
//! acquisition record carrying equip state and expiry.
//!
//! Effects and unlock conditions are closed tagged unions with an explicit
//! `Unknown` fallback so templates published by a newer engine version are
//! skipped, never fatal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Rank, TimeOfDayWindow, TitleTemplateId, UserTitleId};

/// A reusable title definition in the shared bank, immutable once published
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleTemplate {
    pub id: TitleTemplateId,
    pub name: String,
    pub description: Option<String>,
    pub effect: TitleEffect,
    pub unlock_condition: UnlockCondition,
    pub rank: TitleRank,
    /// Hidden titles are not shown until unlocked
    pub hidden: bool,
}

impl TitleTemplate {
    pub fn new(
        name: impl Into<String>,
        effect: TitleEffect,
        unlock_condition: UnlockCondition,
    ) -> Self {
        Self {
            id: TitleTemplateId::new(),
            name: name.into(),
            description: None,
            effect,
            unlock_condition,
            rank: TitleRank::D,
            hidden: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_rank(mut self, rank: TitleRank) -> Self {
        self.rank = rank;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Prestige rank of a title
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TitleRank {
    D,
    C,
    B,
    A,
    S,
}

/// Effect a title applies while equipped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TitleEffect {
    /// Multiplies XP gains for matching targets
    XpMultiplier {
        scope: EffectScope,
        target: EffectTarget,
        value: f64,
    },
    /// Scales quest difficulty for matching targets (consumed by generation)
    DifficultyModifier {
        scope: EffectScope,
        target: EffectTarget,
        value: f64,
    },
    /// Effect published by a newer engine version; excluded from folding
    #[serde(untagged)]
    Unknown(serde_json::Value),
}

impl TitleEffect {
    /// The XP multiplier this effect contributes for a target, if any
    pub fn xp_multiplier_for(&self, kind: EffectScope, target_name: &str) -> Option<f64> {
        match self {
            Self::XpMultiplier { scope, target, value }
                if scope.covers(kind) && target.matches(target_name) =>
            {
                Some(*value)
            }
            _ => None,
        }
    }

    /// The difficulty modifier this effect contributes for a target, if any
    pub fn difficulty_modifier_for(&self, kind: EffectScope, target_name: &str) -> Option<f64> {
        match self {
            Self::DifficultyModifier { scope, target, value }
                if scope.covers(kind) && target.matches(target_name) =>
            {
                Some(*value)
            }
            _ => None,
        }
    }
}

/// What kind of progression node an effect applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectScope {
    Theme,
    Skill,
    All,
}

impl EffectScope {
    /// Whether this scope covers a concrete node kind
    pub fn covers(self, kind: EffectScope) -> bool {
        self == EffectScope::All || self == kind
    }
}

/// Which node(s) within a scope an effect applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTarget {
    /// Every node within the scope
    All,
    /// A single node, matched by name case-insensitively
    #[serde(untagged)]
    Named(String),
}

impl EffectTarget {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(target) => target.eq_ignore_ascii_case(name),
        }
    }
}

/// Condition under which a title unlocks
///
/// Evaluated against ledger state and the entry history by the title
/// service. Unknown tags deserialize into the fallback variant and are
/// treated as never-satisfied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnlockCondition {
    /// Consecutive calendar days with at least one entry, counted backward
    /// from the most recent entry
    JournalStreak { days: u32 },
    /// Named theme has reached a level
    ThemeLevel { theme: String, level: u32 },
    /// Lifetime entry count
    TotalEntries { count: u64 },
    /// Entries falling inside a time-of-day window across history
    TimeWindowCount { window: TimeOfDayWindow, count: u64 },
    /// Lifetime completed-quest count
    QuestCompletionCount { count: u64 },
    /// Any skill has reached a rank
    SkillRank { rank: Rank },
    /// Condition published by a newer engine version; never satisfied
    #[serde(untagged)]
    Unknown(serde_json::Value),
}

/// A user's acquisition of a title - at most one per (user, template)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTitle {
    pub id: UserTitleId,
    pub template_id: TitleTemplateId,
    pub acquired_at: DateTime<Utc>,
    pub equipped: bool,
    /// Temporary titles carry an expiry; expired titles are excluded from
    /// effect folding but kept as a permanent record
    pub expires_at: Option<DateTime<Utc>>,
}

impl UserTitle {
    pub fn new(template_id: TitleTemplateId, acquired_at: DateTime<Utc>) -> Self {
        Self {
            id: UserTitleId::new(),
            template_id,
            acquired_at,
            equipped: false,
            expires_at: None,
        }
    }

    pub fn equipped(mut self) -> Self {
        self.equipped = true;
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Whether this title currently contributes to effect folding
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.equipped && !self.is_expired(now)
    }

    pub fn equip(&mut self) {
        self.equipped = true;
    }

    pub fn unequip(&mut self) {
        self.equipped = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_target_matching() {
        let specific = TitleEffect::XpMultiplier {
            scope: EffectScope::Theme,
            target: EffectTarget::Named("Education".into()),
            value: 1.1,
        };
        assert_eq!(specific.xp_multiplier_for(EffectScope::Theme, "Education"), Some(1.1));
        assert_eq!(specific.xp_multiplier_for(EffectScope::Theme, "education"), Some(1.1));
        assert_eq!(specific.xp_multiplier_for(EffectScope::Theme, "Health"), None);
        assert_eq!(specific.xp_multiplier_for(EffectScope::Skill, "Education"), None);

        let all_themes = TitleEffect::XpMultiplier {
            scope: EffectScope::Theme,
            target: EffectTarget::All,
            value: 1.15,
        };
        assert_eq!(all_themes.xp_multiplier_for(EffectScope::Theme, "Health"), Some(1.15));
        assert_eq!(all_themes.xp_multiplier_for(EffectScope::Skill, "Python"), None);

        let global = TitleEffect::XpMultiplier {
            scope: EffectScope::All,
            target: EffectTarget::All,
            value: 1.2,
        };
        assert_eq!(global.xp_multiplier_for(EffectScope::Skill, "Python"), Some(1.2));
    }

    #[test]
    fn test_difficulty_effect_does_not_multiply_xp() {
        let effect = TitleEffect::DifficultyModifier {
            scope: EffectScope::All,
            target: EffectTarget::All,
            value: 0.9,
        };
        assert_eq!(effect.xp_multiplier_for(EffectScope::Theme, "Health"), None);
        assert_eq!(effect.difficulty_modifier_for(EffectScope::Theme, "Health"), Some(0.9));
    }

    #[test]
    fn test_unknown_condition_tag_round_trips() {
        let raw = serde_json::json!({"type": "lunar_phase", "phase": "full"});
        let condition: UnlockCondition = serde_json::from_value(raw.clone()).unwrap();
        assert!(matches!(condition, UnlockCondition::Unknown(_)));
    }

    #[test]
    fn test_known_condition_tag_deserializes() {
        let raw = serde_json::json!({"type": "journal_streak", "days": 7});
        let condition: UnlockCondition = serde_json::from_value(raw).unwrap();
        assert_eq!(condition, UnlockCondition::JournalStreak { days: 7 });
    }

    #[test]
    fn test_title_expiry_excludes_from_folding() {
        let now = Utc::now();
        let title = UserTitle::new(TitleTemplateId::new(), now)
            .equipped()
            .with_expiry(now - chrono::Duration::hours(1));

        assert!(title.is_expired(now));
        assert!(!title.is_active(now));
    }
}
