//! Quest Matcher & Lifecycle - Matching activity to quests and driving the
//! quest state machine
//!
//! For each active quest the matcher computes the token-overlap ratio
//! between the quest's name tokens and the activity's match tokens; a
//! match is declared at or above the configured threshold. Every matching
//! quest advances - there is no single-winner tie-break.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::application::dto::CategorizationResult;
use crate::application::services::TemplateBank;
use crate::domain::aggregates::UserProgression;
use crate::domain::entities::{CompletionCondition, QuestStatus, UserQuest};
use crate::domain::value_objects::{Reward, UserQuestId};

/// What one activity did to the user's quests
#[derive(Debug, Default, Clone)]
pub struct QuestOutcome {
    pub completed: Vec<UserQuestId>,
    pub progressed: Vec<UserQuestId>,
    pub failed: Vec<UserQuestId>,
    /// Summed rewards of all completed quests
    pub rewards: Reward,
}

/// Service advancing quest instances against categorized activity
#[derive(Debug, Clone)]
pub struct QuestService {
    match_threshold: f64,
}

impl QuestService {
    pub fn new(match_threshold: f64) -> Self {
        Self { match_threshold }
    }

    /// Expire overdue quests, autostart eligible ones, and advance every
    /// quest the activity matches.
    #[instrument(skip_all, fields(user_id = %user.user_id, entry_id = %result.entry_id))]
    pub fn process_activity(
        &self,
        bank: &TemplateBank,
        user: &mut UserProgression,
        result: &CategorizationResult,
        now: DateTime<Utc>,
    ) -> QuestOutcome {
        let tokens: HashSet<String> = result
            .match_tokens
            .iter()
            .map(|t| t.to_lowercase())
            .collect();

        let mut outcome = QuestOutcome::default();

        let quest_ids: Vec<UserQuestId> = user.quests().map(|q| q.id).collect();
        for quest_id in quest_ids {
            let Some(quest) = user.quest_mut(quest_id) else {
                continue;
            };
            if quest.status.is_terminal() {
                continue;
            }

            // Deadline expiry comes first; a late match can neither rescue
            // an overdue quest nor start one.
            if quest.is_past_deadline(now) {
                if quest.fail() {
                    debug!(quest_id = %quest_id, name = %quest.name, "Quest failed on deadline");
                    outcome.failed.push(quest_id);
                }
                continue;
            }

            let name_match = self.matches(&quest.name, &tokens);

            if quest.status == QuestStatus::NotStarted {
                let started = if quest.autostart {
                    let instance_condition = quest.autostart_condition.clone();
                    let template_condition = quest
                        .template_id
                        .and_then(|id| bank.quest(id))
                        .and_then(|t| t.autostart_condition.clone());
                    match instance_condition.or(template_condition) {
                        Some(condition) => condition.matches(&result.match_tokens),
                        None => name_match,
                    }
                } else {
                    // First matching activity starts a quest even without
                    // the autostart flag.
                    name_match
                };

                let Some(quest) = user.quest_mut(quest_id) else {
                    continue;
                };
                if started && quest.start() {
                    debug!(quest_id = %quest_id, name = %quest.name, "Quest started");
                } else {
                    continue;
                }
            }

            let Some(quest) = user.quest_mut(quest_id) else {
                continue;
            };
            if !name_match {
                continue;
            }
            if !advanceable(bank, quest) {
                continue;
            }

            if quest.advance(1, now) {
                let reward = quest
                    .template_id
                    .and_then(|id| bank.quest(id))
                    .map(|t| t.reward)
                    .unwrap_or_default();
                info!(quest_id = %quest_id, name = %quest.name, "Quest completed");
                outcome.rewards.add(reward);
                outcome.completed.push(quest_id);
            } else {
                outcome.progressed.push(quest_id);
            }
        }

        outcome
    }

    /// Token overlap ratio between the quest name and the activity tokens.
    /// An empty quest token set never matches.
    fn matches(&self, quest_name: &str, activity_tokens: &HashSet<String>) -> bool {
        let name_tokens: HashSet<String> = quest_name
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .collect();

        if name_tokens.is_empty() {
            return false;
        }

        let overlap = name_tokens.intersection(activity_tokens).count();
        let ratio = overlap as f64 / name_tokens.len() as f64;
        ratio >= self.match_threshold
    }
}

/// Whether the quest's completion condition is one the matcher can drive
fn advanceable(bank: &TemplateBank, quest: &UserQuest) -> bool {
    let Some(template_id) = quest.template_id else {
        // Ad-hoc quests accumulate one step per match against the
        // instance's own target.
        return true;
    };
    match bank.quest(template_id).map(|t| &t.completion_condition) {
        Some(CompletionCondition::YesNo) | Some(CompletionCondition::Accumulation { .. }) => true,
        Some(CompletionCondition::Unknown(value)) => {
            warn!(quest_id = %quest.id, condition = %value, "Unknown completion condition tag; quest left untouched");
            false
        }
        None => true,
    }
}
