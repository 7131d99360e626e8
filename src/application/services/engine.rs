//! Engine Coordinator - One categorized entry in, one progression delta out
//!
//! The pipeline per entry: idempotency check, corrosion tick, entry XP,
//! title evaluation, quest matching, reward feedback, history record. All
//! mutation happens on a working copy of the aggregate that is committed
//! only when every stage succeeds, so a failed invocation leaves the user
//! untouched.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::application::dto::{CategorizationResult, ProgressionDelta, ThemeDelta};
use crate::application::services::{
    LedgerError, LedgerService, QuestService, TemplateBank, TitleService,
};
use crate::domain::aggregates::UserProgression;
use crate::domain::entities::{JournalRecord, XpSource};
use crate::infrastructure::config::EngineConfig;

/// Errors from one engine invocation
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// The coordinator tying the services into one entry pipeline
#[derive(Debug, Clone)]
pub struct ProgressionEngine {
    config: EngineConfig,
    ledger: LedgerService,
    titles: TitleService,
    quests: QuestService,
}

impl ProgressionEngine {
    pub fn new(config: EngineConfig) -> Self {
        let ledger = LedgerService::new(config.clone());
        let quests = QuestService::new(config.match_threshold);
        Self {
            config,
            ledger,
            titles: TitleService::new(),
            quests,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Process one categorized entry against one user's progression.
    ///
    /// Reprocessing an already-applied entry id returns the all-zero delta
    /// without touching the aggregate. On error nothing is committed.
    #[instrument(skip_all, fields(user_id = %user.user_id, entry_id = %result.entry_id))]
    pub fn process_entry(
        &self,
        bank: &TemplateBank,
        user: &mut UserProgression,
        result: &CategorizationResult,
        now: DateTime<Utc>,
    ) -> Result<ProgressionDelta, EngineError> {
        if user.is_processed(result.entry_id) {
            debug!("Entry already processed; emitting empty delta");
            return Ok(ProgressionDelta::empty(result.entry_id));
        }

        // Mutate a working copy; commit only after every stage succeeds.
        let mut working = user.clone();

        self.ledger.corrosion_tick(&mut working, now);

        let (mut theme_deltas, skill_deltas) =
            self.ledger.apply_entry_xp(bank, &mut working, result, now)?;

        let unlocked_titles = self.titles.evaluate(bank, &mut working, now);

        let outcome = self.quests.process_activity(bank, &mut working, result, now);

        // Quest reward XP feeds back into the themes the entry touched,
        // recorded under the quest source.
        if outcome.rewards.xp > 0.0 && !result.theme_ids.is_empty() {
            let share = outcome.rewards.xp / result.theme_ids.len() as f64;
            for theme_id in &result.theme_ids {
                if let Some(delta) =
                    self.ledger
                        .grant_theme_xp(&mut working, *theme_id, share, XpSource::Quest, now)?
                {
                    merge_theme_delta(&mut theme_deltas, delta);
                }
            }
        }
        working.add_coins(outcome.rewards.coins);

        working.record_entry(JournalRecord::new(result.entry_id, now, result.sentiment));

        *user = working;

        let delta = ProgressionDelta {
            entry_id: result.entry_id,
            theme_deltas,
            skill_deltas,
            unlocked_titles,
            completed_quests: outcome.completed,
            rewards: outcome.rewards,
        };
        info!(
            themes = delta.theme_deltas.len(),
            skills = delta.skill_deltas.len(),
            titles = delta.unlocked_titles.len(),
            quests = delta.completed_quests.len(),
            "Entry processed"
        );
        Ok(delta)
    }
}

/// Fold a later theme delta into an existing one for the same theme,
/// keeping the earliest before-level and the latest after-level
fn merge_theme_delta(deltas: &mut Vec<ThemeDelta>, incoming: ThemeDelta) {
    match deltas.iter_mut().find(|d| d.theme_id == incoming.theme_id) {
        Some(existing) => {
            existing.xp_gained += incoming.xp_gained;
            existing.level_after = incoming.level_after;
        }
        None => deltas.push(incoming),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::entities::{
        CompletionCondition, EffectScope, EffectTarget, QuestTemplate, QuestType, Skill, Theme,
        TitleEffect, TitleTemplate, UnlockCondition, UserQuest,
    };
    use crate::domain::value_objects::{EntryId, Reward, UserId};

    fn engine() -> ProgressionEngine {
        ProgressionEngine::new(EngineConfig::default())
    }

    fn user_with_theme(name: &str) -> (UserProgression, crate::domain::value_objects::ThemeId) {
        let mut user = UserProgression::new(UserId::new());
        let theme = Theme::new(name, &EngineConfig::default().theme_curve);
        let id = user.add_theme(theme).unwrap();
        (user, id)
    }

    #[test]
    fn test_reprocessing_same_entry_is_a_noop() {
        let engine = engine();
        let bank = TemplateBank::new();
        let (mut user, theme_id) = user_with_theme("Health");
        let now = Utc::now();

        let result = CategorizationResult::new(EntryId::new()).with_themes([theme_id]);
        let first = engine.process_entry(&bank, &mut user, &result, now).unwrap();
        assert!(!first.is_noop());
        let xp_after_first = user.theme(theme_id).unwrap().xp;

        let second = engine.process_entry(&bank, &mut user, &result, now).unwrap();
        assert!(second.is_noop());
        assert_eq!(user.theme(theme_id).unwrap().xp, xp_after_first);
        assert_eq!(user.journal().len(), 1);
    }

    #[test]
    fn test_failed_invocation_leaves_user_untouched() {
        let engine = engine();
        let bank = TemplateBank::new();
        let mut user = UserProgression::new(UserId::new());
        let skill = Skill::new("Running", &EngineConfig::default().skill_curve);
        let skill_id = user.add_skill(skill).unwrap();

        let entry_id = EntryId::new();
        let result = CategorizationResult::new(entry_id).with_practice(skill_id, -10.0);
        let err = engine.process_entry(&bank, &mut user, &result, Utc::now());
        assert!(err.is_err());

        assert!(!user.is_processed(entry_id));
        assert_eq!(user.skill(skill_id).unwrap().xp, 0.0);
        assert!(user.journal().is_empty());
    }

    #[test]
    fn test_full_pipeline_entry_to_delta() {
        let engine = engine();
        let mut bank = TemplateBank::new();
        let now = Utc::now();

        // A title that unlocks on the very first entry
        bank.publish_title(TitleTemplate::new(
            "Novice Chronicler",
            TitleEffect::XpMultiplier {
                scope: EffectScope::All,
                target: EffectTarget::All,
                value: 1.1,
            },
            UnlockCondition::TotalEntries { count: 0 },
        ))
        .unwrap();

        // A quest the entry's tokens will complete
        let quest_template_id = bank
            .publish_quest(
                QuestTemplate::new("morning run", QuestType::Daily, CompletionCondition::YesNo)
                    .with_reward(Reward::new(30.0, 10)),
            )
            .unwrap();

        let (mut user, theme_id) = user_with_theme("Health");
        let skill_id = user
            .add_skill(Skill::new("Running", &EngineConfig::default().skill_curve))
            .unwrap();
        user.add_quest(UserQuest::from_template(
            bank.quest(quest_template_id).unwrap(),
            now,
        ))
        .unwrap();

        let result = CategorizationResult::new(EntryId::new())
            .with_themes([theme_id])
            .with_practice(skill_id, 30.0)
            .with_tokens(["morning", "run"]);
        let delta = engine.process_entry(&bank, &mut user, &result, now).unwrap();

        // Base 50 entry XP plus the 30 reward XP on the single theme
        assert_eq!(delta.theme_deltas.len(), 1);
        assert!(delta.theme_deltas[0].xp_gained > 50.0);
        assert_eq!(delta.skill_deltas.len(), 1);
        assert_eq!(delta.unlocked_titles.len(), 1);
        assert_eq!(delta.completed_quests.len(), 1);
        assert_eq!(delta.rewards, Reward::new(30.0, 10));
        assert_eq!(user.coins(), 10);
        assert_eq!(user.journal().len(), 1);
    }

    #[test]
    fn test_quest_reward_xp_merges_into_theme_delta() {
        let engine = engine();
        let mut bank = TemplateBank::new();
        let now = Utc::now();
        let template_id = bank
            .publish_quest(
                QuestTemplate::new("stretch", QuestType::Daily, CompletionCondition::YesNo)
                    .with_reward(Reward::new(20.0, 0)),
            )
            .unwrap();

        let (mut user, theme_id) = user_with_theme("Health");
        user.add_quest(UserQuest::from_template(bank.quest(template_id).unwrap(), now))
            .unwrap();

        let result = CategorizationResult::new(EntryId::new())
            .with_themes([theme_id])
            .with_tokens(["stretch"]);
        let delta = engine.process_entry(&bank, &mut user, &result, now).unwrap();

        // One merged delta for the theme: 50 entry XP + 20 reward XP
        assert_eq!(delta.theme_deltas.len(), 1);
        assert!((delta.theme_deltas[0].xp_gained - 70.0).abs() < 1e-9);
        assert_eq!(delta.theme_deltas[0].level_before, 0);
    }
}
