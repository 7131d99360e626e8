//! Title Rule Evaluator - Unlock-condition evaluation and effect folding
//!
//! Walks every published title template the user does not yet own,
//! evaluates its unlock condition against the current ledger state and
//! entry history, and awards at most one `UserTitle` per template.
//!
//! Effect aggregation is a pure read-time fold over the equipped,
//! non-expired title set; no mutable accumulator is kept anywhere.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};

use crate::application::services::TemplateBank;
use crate::domain::aggregates::UserProgression;
use crate::domain::entities::{EffectScope, JournalRecord, UnlockCondition};
use crate::domain::value_objects::TitleTemplateId;

/// Service for evaluating title unlock conditions and awarding titles
#[derive(Debug, Default, Clone)]
pub struct TitleService;

impl TitleService {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate every unowned published template and award satisfied ones.
    ///
    /// Returns the template ids newly unlocked. Awarding is set-once: a
    /// condition that stays satisfied on later calls awards nothing new.
    #[instrument(skip_all, fields(user_id = %user.user_id))]
    pub fn evaluate(
        &self,
        bank: &TemplateBank,
        user: &mut UserProgression,
        now: DateTime<Utc>,
    ) -> Vec<TitleTemplateId> {
        let candidates: Vec<TitleTemplateId> = bank
            .title_templates()
            .filter(|t| !user.has_title(t.id))
            .filter(|t| self.condition_met(&t.unlock_condition, user))
            .map(|t| t.id)
            .collect();

        let mut unlocked = Vec::new();
        for template_id in candidates {
            if user.award_title(template_id, now).is_some() {
                let name = bank
                    .title(template_id)
                    .map(|t| t.name.as_str())
                    .unwrap_or("unknown");
                info!(template_id = %template_id, title = name, "Title unlocked");
                unlocked.push(template_id);
            }
        }
        unlocked
    }

    fn condition_met(&self, condition: &UnlockCondition, user: &UserProgression) -> bool {
        match condition {
            UnlockCondition::JournalStreak { days } => {
                current_streak_days(user.journal()) >= *days
            }
            UnlockCondition::ThemeLevel { theme, level } => user
                .theme_by_name(theme)
                .is_some_and(|t| t.level >= *level),
            UnlockCondition::TotalEntries { count } => user.journal().len() as u64 >= *count,
            UnlockCondition::TimeWindowCount { window, count } => {
                let matching = user
                    .journal()
                    .iter()
                    .filter(|r| window.contains(&r.recorded_at))
                    .count() as u64;
                matching >= *count
            }
            UnlockCondition::QuestCompletionCount { count } => {
                user.completed_quest_count() >= *count
            }
            UnlockCondition::SkillRank { rank } => user.skills().any(|s| s.rank >= *rank),
            UnlockCondition::Unknown(value) => {
                // Forward-compat: templates from a newer engine version are
                // skipped, never fatal.
                warn!(condition = %value, "Unknown unlock condition tag; treating as never satisfied");
                false
            }
        }
    }
}

/// Consecutive calendar days with at least one entry, counted backward
/// from the most recent entry
fn current_streak_days(journal: &[JournalRecord]) -> u32 {
    let mut dates: Vec<NaiveDate> = journal.iter().map(|r| r.recorded_at.date_naive()).collect();
    dates.sort_unstable();
    dates.dedup();

    let Some(&most_recent) = dates.last() else {
        return 0;
    };

    let mut streak = 1;
    let mut expected = most_recent;
    for date in dates.iter().rev().skip(1) {
        match expected.pred_opt() {
            Some(previous) if *date == previous => {
                streak += 1;
                expected = previous;
            }
            _ => break,
        }
    }
    streak
}

/// Combined XP multiplier from the user's equipped, non-expired titles
/// whose effect covers (kind, target name). Multiplicative, baseline 1.0.
pub fn effective_xp_multiplier(
    bank: &TemplateBank,
    user: &UserProgression,
    kind: EffectScope,
    target_name: &str,
    now: DateTime<Utc>,
) -> f64 {
    fold_effects(bank, user, now, |effect| effect.xp_multiplier_for(kind, target_name))
}

/// Combined difficulty modifier for matching equipped titles, consumed by
/// quest generation
pub fn effective_difficulty_modifier(
    bank: &TemplateBank,
    user: &UserProgression,
    kind: EffectScope,
    target_name: &str,
    now: DateTime<Utc>,
) -> f64 {
    fold_effects(bank, user, now, |effect| {
        effect.difficulty_modifier_for(kind, target_name)
    })
}

fn fold_effects<F>(bank: &TemplateBank, user: &UserProgression, now: DateTime<Utc>, pick: F) -> f64
where
    F: Fn(&crate::domain::entities::TitleEffect) -> Option<f64>,
{
    let mut combined = 1.0;
    for user_title in user.titles().iter().filter(|t| t.is_active(now)) {
        let Some(template) = bank.title(user_title.template_id) else {
            debug!(template_id = %user_title.template_id, "Equipped title references unknown template");
            continue;
        };
        if let Some(value) = pick(&template.effect) {
            combined *= value;
        }
    }
    combined
}
