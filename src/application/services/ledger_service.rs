//! Progression Ledger - XP distribution, leveling, rank recomputation,
//! and corrosion ticking
//!
//! One categorized entry yields a configured base XP split equally across
//! the themes it touched; skills gain XP from practice minutes at a
//! configured rate. Equipped-title multipliers are applied per target
//! before the XP lands.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, instrument, warn};

use crate::application::dto::{CategorizationResult, SkillDelta, ThemeDelta};
use crate::application::services::title_service::effective_xp_multiplier;
use crate::application::services::TemplateBank;
use crate::domain::aggregates::UserProgression;
use crate::domain::entities::{EffectScope, XpSource};
use crate::domain::value_objects::ThemeId;
use crate::infrastructure::config::EngineConfig;

/// Errors from ledger operations
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Negative XP or practice time is rejected, never silently clamped
    #[error("XP amount cannot be negative: {0}")]
    InvalidAmount(f64),
}

/// Service applying XP and decay to the progression graph
#[derive(Debug, Clone)]
pub struct LedgerService {
    config: EngineConfig,
}

impl LedgerService {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Distribute one entry's XP across the touched themes and practiced
    /// skills, settling level-ups and recomputing ranks.
    #[instrument(skip_all, fields(user_id = %user.user_id, entry_id = %result.entry_id))]
    pub fn apply_entry_xp(
        &self,
        bank: &TemplateBank,
        user: &mut UserProgression,
        result: &CategorizationResult,
        now: DateTime<Utc>,
    ) -> Result<(Vec<ThemeDelta>, Vec<SkillDelta>), LedgerError> {
        for practice in &result.skill_practice {
            if practice.minutes < 0.0 {
                return Err(LedgerError::InvalidAmount(practice.minutes));
            }
        }

        let mut theme_deltas = Vec::new();
        let mut skill_deltas = Vec::new();

        if !result.theme_ids.is_empty() {
            let share = self.config.base_entry_xp / result.theme_ids.len() as f64;
            for theme_id in &result.theme_ids {
                let Some(name) = user.theme(*theme_id).map(|t| t.name.clone()) else {
                    warn!(theme_id = %theme_id, "Categorization referenced unknown theme");
                    continue;
                };
                let multiplier =
                    effective_xp_multiplier(bank, user, EffectScope::Theme, &name, now);
                let final_xp = share * multiplier;

                let Some(theme) = user.theme_mut(*theme_id) else {
                    continue;
                };
                let level_before = theme.level;
                theme.add_xp(final_xp, &self.config.theme_curve);
                theme.touch(now);
                theme.record_xp_source(XpSource::Journal, final_xp);

                debug!(theme = %name, xp = final_xp, "Theme XP awarded");
                theme_deltas.push(ThemeDelta {
                    theme_id: *theme_id,
                    xp_gained: final_xp,
                    level_before,
                    level_after: theme.level,
                });
            }
        }

        for practice in &result.skill_practice {
            let Some(name) = user.skill(practice.skill_id).map(|s| s.name.clone()) else {
                warn!(skill_id = %practice.skill_id, "Categorization referenced unknown skill");
                continue;
            };
            let multiplier = effective_xp_multiplier(bank, user, EffectScope::Skill, &name, now);
            let final_xp = practice.minutes * self.config.xp_per_practice_minute * multiplier;

            let Some(skill) = user.skill_mut(practice.skill_id) else {
                continue;
            };
            let level_before = skill.level;
            let rank_before = skill.rank;
            skill.add_xp(final_xp, &self.config.skill_curve, &self.config.rank_thresholds);
            skill.add_practice_minutes(practice.minutes, now);
            skill.record_xp_source(XpSource::Practice, final_xp);

            debug!(skill = %name, xp = final_xp, minutes = practice.minutes, "Skill XP awarded");
            skill_deltas.push(SkillDelta {
                skill_id: practice.skill_id,
                xp_gained: final_xp,
                level_before,
                level_after: skill.level,
                rank_before,
                rank_after: skill.rank,
            });
        }

        Ok((theme_deltas, skill_deltas))
    }

    /// Grant XP to one theme outside the entry split (quest rewards).
    /// Returns None when the theme is unknown.
    pub fn grant_theme_xp(
        &self,
        user: &mut UserProgression,
        theme_id: ThemeId,
        amount: f64,
        source: XpSource,
        now: DateTime<Utc>,
    ) -> Result<Option<ThemeDelta>, LedgerError> {
        if amount < 0.0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let Some(theme) = user.theme_mut(theme_id) else {
            return Ok(None);
        };

        let level_before = theme.level;
        theme.add_xp(amount, &self.config.theme_curve);
        theme.touch(now);
        theme.record_xp_source(source, amount);

        Ok(Some(ThemeDelta {
            theme_id,
            xp_gained: amount,
            level_before,
            level_after: theme.level,
        }))
    }

    /// Advance corrosion on every stale node. Invoked once per coordinator
    /// run and usable as a scheduled sweep.
    #[instrument(skip_all, fields(user_id = %user.user_id))]
    pub fn corrosion_tick(&self, user: &mut UserProgression, now: DateTime<Utc>) {
        let theme_staleness = Duration::days(self.config.theme_staleness_days);
        let skill_staleness = Duration::days(self.config.skill_staleness_days);

        let mut advanced = 0usize;
        for theme in user.themes_mut() {
            if theme.tick_corrosion(now, theme_staleness) {
                advanced += 1;
            }
        }
        for skill in user.skills_mut() {
            if skill.tick_corrosion(now, skill_staleness) {
                advanced += 1;
            }
        }

        if advanced > 0 {
            debug!(nodes = advanced, "Corrosion advanced on stale nodes");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use crate::domain::entities::{
        EffectTarget, Skill, Theme, TitleEffect, TitleTemplate, UnlockCondition,
    };
    use crate::domain::value_objects::{CorrosionState, EntryId, Rank, UserId};

    fn service() -> LedgerService {
        LedgerService::new(EngineConfig::default())
    }

    fn user_with_theme(name: &str) -> (UserProgression, ThemeId) {
        let mut user = UserProgression::new(UserId::new());
        let theme = Theme::new(name, &EngineConfig::default().theme_curve);
        let id = user.add_theme(theme).unwrap();
        (user, id)
    }

    #[test]
    fn test_negative_practice_time_rejected() {
        let ledger = service();
        let bank = TemplateBank::new();
        let mut user = UserProgression::new(UserId::new());
        let skill = Skill::new("Running", &EngineConfig::default().skill_curve);
        let skill_id = user.add_skill(skill).unwrap();

        let result = CategorizationResult::new(EntryId::new()).with_practice(skill_id, -5.0);
        let err = ledger
            .apply_entry_xp(&bank, &mut user, &result, Utc::now())
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
    }

    #[test]
    fn test_negative_reward_grant_rejected() {
        let ledger = service();
        let (mut user, theme_id) = user_with_theme("Health");
        let err = ledger
            .grant_theme_xp(&mut user, theme_id, -1.0, XpSource::Quest, Utc::now())
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
    }

    #[test]
    fn test_entry_xp_split_equally_across_themes() {
        let ledger = service();
        let bank = TemplateBank::new();
        let mut user = UserProgression::new(UserId::new());
        let curve = EngineConfig::default().theme_curve;
        let a = user.add_theme(Theme::new("Health", &curve)).unwrap();
        let b = user.add_theme(Theme::new("Education", &curve)).unwrap();

        let result = CategorizationResult::new(EntryId::new()).with_themes([a, b]);
        let (theme_deltas, _) = ledger
            .apply_entry_xp(&bank, &mut user, &result, Utc::now())
            .unwrap();

        assert_eq!(theme_deltas.len(), 2);
        // Default base entry XP is 50: 25 each
        for delta in &theme_deltas {
            assert!((delta.xp_gained - 25.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_equipped_title_multiplies_theme_xp() {
        let ledger = service();
        let mut bank = TemplateBank::new();
        let template_id = bank
            .publish_title(TitleTemplate::new(
                "Scholar",
                TitleEffect::XpMultiplier {
                    scope: EffectScope::Theme,
                    target: EffectTarget::Named("Education".into()),
                    value: 1.5,
                },
                UnlockCondition::TotalEntries { count: 0 },
            ))
            .unwrap();

        let (mut user, theme_id) = user_with_theme("Education");
        let now = Utc::now();
        user.award_title(template_id, now); // first title auto-equips

        let result = CategorizationResult::new(EntryId::new()).with_themes([theme_id]);
        let (theme_deltas, _) = ledger.apply_entry_xp(&bank, &mut user, &result, now).unwrap();

        assert!((theme_deltas[0].xp_gained - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_practice_minutes_drive_skill_xp_and_rank() {
        let ledger = service();
        let bank = TemplateBank::new();
        let mut user = UserProgression::new(UserId::new());
        let skill = Skill::new("Python", &EngineConfig::default().skill_curve);
        let skill_id = user.add_skill(skill).unwrap();

        // 50 base XP at level 0 means 60 minutes cross the first threshold
        let result = CategorizationResult::new(EntryId::new()).with_practice(skill_id, 60.0);
        let (_, skill_deltas) = ledger
            .apply_entry_xp(&bank, &mut user, &result, Utc::now())
            .unwrap();

        assert_eq!(skill_deltas.len(), 1);
        assert_eq!(skill_deltas[0].level_before, 0);
        assert_eq!(skill_deltas[0].level_after, 1);
        assert_eq!(skill_deltas[0].rank_before, Rank::Beginner);
        let skill = user.skill(skill_id).unwrap();
        assert!((skill.practice_time_minutes - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_theme_skipped_without_error() {
        let ledger = service();
        let bank = TemplateBank::new();
        let mut user = UserProgression::new(UserId::new());

        let result = CategorizationResult::new(EntryId::new()).with_themes([ThemeId::new()]);
        let (theme_deltas, _) = ledger
            .apply_entry_xp(&bank, &mut user, &result, Utc::now())
            .unwrap();
        assert!(theme_deltas.is_empty());
    }

    #[test]
    fn test_corrosion_tick_spares_active_nodes() {
        let ledger = service();
        let now = Utc::now();
        let curve = EngineConfig::default().theme_curve;
        let mut user = UserProgression::new(UserId::new());

        let mut stale = Theme::new("Neglected", &curve);
        stale.touch(now - Duration::days(20));
        let stale_id = user.add_theme(stale).unwrap();

        let mut active = Theme::new("Active", &curve);
        active.touch(now - Duration::days(2));
        let active_id = user.add_theme(active).unwrap();

        ledger.corrosion_tick(&mut user, now);

        assert_eq!(user.theme(stale_id).unwrap().corrosion_state, CorrosionState::Old);
        assert_eq!(user.theme(active_id).unwrap().corrosion_state, CorrosionState::Fresh);
    }

    proptest! {
        #[test]
        fn prop_add_xp_preserves_invariants(amounts in proptest::collection::vec(0.0f64..5000.0, 1..20)) {
            let curve = EngineConfig::default().theme_curve;
            let mut theme = Theme::new("Prop", &curve);
            let mut last_level = 0;

            for amount in amounts {
                theme.add_xp(amount, &curve);
                prop_assert!(theme.xp >= 0.0);
                prop_assert!(theme.xp < theme.xp_to_next_level);
                prop_assert!(theme.level >= last_level);
                last_level = theme.level;
            }
        }
    }
}
