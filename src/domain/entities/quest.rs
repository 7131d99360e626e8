//! Quest entities - Reusable templates and per-user quest instances
//!
//! Quests follow the template/instance split of the shared bank. The
//! instance carries the status state machine:
//!
//! ```text
//! NotStarted -> InProgress -> { Completed | Failed | Cancelled }
//! ```
//!
//! Terminal states absorb; no transition leaves them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{QuestTemplateId, Reward, UserQuestId};

/// A reusable quest definition in the shared bank, immutable once published
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestTemplate {
    pub id: QuestTemplateId,
    pub name: String,
    /// Template text with placeholders; personalization lives on instances
    pub description_template: Option<String>,
    pub quest_type: QuestType,
    pub completion_condition: CompletionCondition,
    pub reward: Reward,
    /// Whether instances start without an explicit user action
    pub autostart: bool,
    pub autostart_condition: Option<AutostartCondition>,
}

impl QuestTemplate {
    pub fn new(
        name: impl Into<String>,
        quest_type: QuestType,
        completion_condition: CompletionCondition,
    ) -> Self {
        Self {
            id: QuestTemplateId::new(),
            name: name.into(),
            description_template: None,
            quest_type,
            completion_condition,
            reward: Reward::default(),
            autostart: false,
            autostart_condition: None,
        }
    }

    pub fn with_description(mut self, template: impl Into<String>) -> Self {
        self.description_template = Some(template.into());
        self
    }

    pub fn with_reward(mut self, reward: Reward) -> Self {
        self.reward = reward;
        self
    }

    pub fn with_autostart(mut self, condition: Option<AutostartCondition>) -> Self {
        self.autostart = true;
        self.autostart_condition = condition;
        self
    }
}

/// Cadence of a quest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestType {
    Daily,
    Timed,
    Periodic,
    Repeatable,
}

/// How a quest completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompletionCondition {
    /// Single qualifying match completes the quest
    YesNo,
    /// Progress accumulates one step per qualifying match until the target
    Accumulation { target: u32 },
    /// Condition published by a newer engine version; never advanced
    #[serde(untagged)]
    Unknown(serde_json::Value),
}

impl CompletionCondition {
    /// The progress target this condition implies
    pub fn target(&self) -> u32 {
        match self {
            Self::YesNo => 1,
            Self::Accumulation { target } => *target,
            Self::Unknown(_) => 1,
        }
    }
}

/// Keyword condition gating autostart, matched against activity tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutostartCondition {
    pub keywords: Vec<String>,
}

impl AutostartCondition {
    pub fn new(keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            keywords: keywords.into_iter().map(|k| k.into()).collect(),
        }
    }

    /// Whether any keyword appears among the activity tokens
    pub fn matches(&self, tokens: &[String]) -> bool {
        self.keywords
            .iter()
            .any(|k| tokens.iter().any(|t| t.eq_ignore_ascii_case(k)))
    }
}

/// Quest instance status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    NotStarted,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl QuestStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// A user's quest instance
///
/// Usually references a bank template; ad-hoc quests have no template and
/// carry no reward. Sub-quests reference a parent instance (tree,
/// cycle-checked by the aggregate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserQuest {
    pub id: UserQuestId,
    pub template_id: Option<QuestTemplateId>,
    pub parent_quest_id: Option<UserQuestId>,
    pub name: String,
    /// Per-user framing; never written back onto the template
    pub personalized_description: Option<String>,
    pub status: QuestStatus,
    pub completion_progress: u32,
    pub completion_target: u32,
    pub autostart: bool,
    /// Instance-level condition; the matcher falls back to the template's
    /// when this is unset
    pub autostart_condition: Option<AutostartCondition>,
    pub created_at: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl UserQuest {
    /// Instantiate a quest from a bank template
    pub fn from_template(template: &QuestTemplate, now: DateTime<Utc>) -> Self {
        Self {
            id: UserQuestId::new(),
            template_id: Some(template.id),
            parent_quest_id: None,
            name: template.name.clone(),
            personalized_description: None,
            status: QuestStatus::NotStarted,
            completion_progress: 0,
            completion_target: template.completion_condition.target(),
            autostart: template.autostart,
            autostart_condition: None,
            created_at: now,
            deadline: None,
            completed_at: None,
        }
    }

    /// An ad-hoc quest with no backing template (and no reward)
    pub fn ad_hoc(name: impl Into<String>, target: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: UserQuestId::new(),
            template_id: None,
            parent_quest_id: None,
            name: name.into(),
            personalized_description: None,
            status: QuestStatus::NotStarted,
            completion_progress: 0,
            completion_target: target.max(1),
            autostart: false,
            autostart_condition: None,
            created_at: now,
            deadline: None,
            completed_at: None,
        }
    }

    pub fn with_parent(mut self, parent: UserQuestId) -> Self {
        self.parent_quest_id = Some(parent);
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_personalized_description(mut self, text: impl Into<String>) -> Self {
        self.personalized_description = Some(text.into());
        self
    }

    pub fn with_autostart(mut self, condition: Option<AutostartCondition>) -> Self {
        self.autostart = true;
        self.autostart_condition = condition;
        self
    }

    /// NotStarted -> InProgress. Returns false from any other state.
    pub fn start(&mut self) -> bool {
        if self.status == QuestStatus::NotStarted {
            self.status = QuestStatus::InProgress;
            true
        } else {
            false
        }
    }

    /// Advance progress by `amount` steps; completes when the target is
    /// reached. Only InProgress quests advance. Returns true on completion.
    pub fn advance(&mut self, amount: u32, now: DateTime<Utc>) -> bool {
        if self.status != QuestStatus::InProgress {
            return false;
        }

        self.completion_progress = (self.completion_progress + amount).min(self.completion_target);

        if self.completion_progress >= self.completion_target {
            self.complete(now);
            true
        } else {
            false
        }
    }

    /// Complete the quest; instance is immutable thereafter
    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = QuestStatus::Completed;
        self.completion_progress = self.completion_target;
        self.completed_at = Some(now);
        true
    }

    /// Deadline expiry: InProgress -> Failed
    pub fn fail(&mut self) -> bool {
        if self.status == QuestStatus::InProgress {
            self.status = QuestStatus::Failed;
            true
        } else {
            false
        }
    }

    /// Cancel a quest that has not finished
    pub fn cancel(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = QuestStatus::Cancelled;
        true
    }

    /// Whether the deadline has passed for a quest that has not finished
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_terminal() && self.deadline.is_some_and(|deadline| deadline < now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accumulation_quest(target: u32) -> UserQuest {
        let mut quest = UserQuest::ad_hoc("Read 3 chapters", target, Utc::now());
        quest.start();
        quest
    }

    #[test]
    fn test_state_machine_happy_path() {
        let now = Utc::now();
        let mut quest = UserQuest::ad_hoc("Meditate", 1, now);
        assert_eq!(quest.status, QuestStatus::NotStarted);

        assert!(quest.start());
        assert_eq!(quest.status, QuestStatus::InProgress);

        assert!(quest.advance(1, now));
        assert_eq!(quest.status, QuestStatus::Completed);
        assert_eq!(quest.completed_at, Some(now));
    }

    #[test]
    fn test_terminal_states_absorb() {
        let now = Utc::now();
        let mut quest = UserQuest::ad_hoc("Meditate", 1, now);
        quest.start();
        quest.complete(now);

        assert!(!quest.start());
        assert!(!quest.fail());
        assert!(!quest.cancel());
        assert!(!quest.complete(now));
        assert!(!quest.advance(1, now));
        assert_eq!(quest.status, QuestStatus::Completed);
    }

    #[test]
    fn test_accumulation_progress_bounded_by_target() {
        let now = Utc::now();
        let mut quest = accumulation_quest(3);

        assert!(!quest.advance(1, now));
        assert!(!quest.advance(1, now));
        assert_eq!(quest.completion_progress, 2);
        assert!(quest.advance(1, now));
        assert_eq!(quest.completion_progress, 3);
        assert_eq!(quest.status, QuestStatus::Completed);
    }

    #[test]
    fn test_fail_only_from_in_progress() {
        let now = Utc::now();
        let mut quest = UserQuest::ad_hoc("Timed", 1, now);
        assert!(!quest.fail());

        quest.start();
        assert!(quest.fail());
        assert_eq!(quest.status, QuestStatus::Failed);
    }

    #[test]
    fn test_deadline_check() {
        let now = Utc::now();
        let mut quest = UserQuest::ad_hoc("Timed", 1, now)
            .with_deadline(now - chrono::Duration::hours(1));
        // Overdue whether or not it has been started
        assert!(quest.is_past_deadline(now));

        quest.start();
        assert!(quest.is_past_deadline(now));

        quest.fail();
        assert!(!quest.is_past_deadline(now));
    }

    #[test]
    fn test_completion_target_from_condition() {
        assert_eq!(CompletionCondition::YesNo.target(), 1);
        assert_eq!(CompletionCondition::Accumulation { target: 5 }.target(), 5);
    }

    #[test]
    fn test_autostart_condition_matches_tokens() {
        let condition = AutostartCondition::new(["gym", "running"]);
        let tokens = vec!["went".to_string(), "Running".to_string(), "today".to_string()];
        assert!(condition.matches(&tokens));
        assert!(!condition.matches(&["slept".to_string()]));
    }
}
