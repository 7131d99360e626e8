//! Sentiment attached to a categorized activity record

use serde::{Deserialize, Serialize};

/// Overall sentiment of an activity log, as reported by the
/// categorization collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    VeryNegative,
    Negative,
    Neutral,
    Positive,
    VeryPositive,
}

impl Default for Sentiment {
    fn default() -> Self {
        Self::Neutral
    }
}
