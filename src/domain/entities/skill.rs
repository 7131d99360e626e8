//! Skill entity - Specific competency progression node with rank tiers
//!
//! Skills level up through practice and carry a rank derived from level
//! (Beginner through Master). They form skill trees via a parent reference
//! and optionally belong to one theme.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::XpSource;
use crate::domain::value_objects::{CorrosionState, LevelCurve, Rank, RankTable, SkillId, ThemeId};

/// A skill progression node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    pub description: Option<String>,
    /// Theme this skill belongs to, if any
    pub theme_id: Option<ThemeId>,
    /// Parent skill for skill trees; cycle-checked by the aggregate
    pub parent_skill_id: Option<SkillId>,
    pub level: u32,
    pub xp: f64,
    pub xp_to_next_level: f64,
    /// Derived from level via the rank table, never set independently
    pub rank: Rank,
    pub corrosion_state: CorrosionState,
    /// Lifetime practice minutes accumulated
    pub practice_time_minutes: f64,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub xp_breakdown: HashMap<XpSource, f64>,
}

impl Skill {
    pub fn new(name: impl Into<String>, curve: &LevelCurve) -> Self {
        Self {
            id: SkillId::new(),
            name: name.into(),
            description: None,
            theme_id: None,
            parent_skill_id: None,
            level: 0,
            xp: 0.0,
            xp_to_next_level: curve.xp_to_next(0),
            rank: Rank::Beginner,
            corrosion_state: CorrosionState::New,
            practice_time_minutes: 0.0,
            last_activity_at: None,
            xp_breakdown: HashMap::new(),
        }
    }

    pub fn with_theme(mut self, theme_id: ThemeId) -> Self {
        self.theme_id = Some(theme_id);
        self
    }

    pub fn with_parent(mut self, parent: SkillId) -> Self {
        self.parent_skill_id = Some(parent);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add XP, settle level-ups with exact overflow carry, and recompute
    /// rank after every level change.
    ///
    /// Returns the number of levels gained. Negative amounts are rejected
    /// upstream by the ledger.
    pub fn add_xp(&mut self, amount: f64, curve: &LevelCurve, ranks: &RankTable) -> u32 {
        debug_assert!(amount >= 0.0, "negative XP must be rejected upstream");

        self.xp += amount;
        let mut gained = 0;

        while self.xp >= self.xp_to_next_level {
            self.xp -= self.xp_to_next_level;
            self.level += 1;
            self.xp_to_next_level = curve.xp_to_next(self.level);
            gained += 1;
        }

        if gained > 0 {
            self.rank = ranks.rank_for(self.level);
        }

        gained
    }

    /// Record practiced minutes and stamp activity
    pub fn add_practice_minutes(&mut self, minutes: f64, now: DateTime<Utc>) {
        debug_assert!(minutes >= 0.0, "negative practice time must be rejected upstream");
        self.practice_time_minutes += minutes;
        self.touch(now);
    }

    /// Record activity: stamp the clock and restore corrosion to `Fresh`
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity_at = Some(now);
        self.corrosion_state = CorrosionState::Fresh;
    }

    pub fn record_xp_source(&mut self, source: XpSource, amount: f64) {
        *self.xp_breakdown.entry(source).or_insert(0.0) += amount;
    }

    /// Advance corrosion by one stage per fully elapsed staleness window
    pub fn tick_corrosion(&mut self, now: DateTime<Utc>, staleness: Duration) -> bool {
        let Some(last) = self.last_activity_at else {
            return false;
        };
        if staleness <= Duration::zero() {
            return false;
        }

        let elapsed = now - last;
        let mut windows = elapsed.num_seconds() / staleness.num_seconds();
        let mut target = CorrosionState::Fresh;
        while windows > 0 && target != CorrosionState::Unrecovered {
            target = target.decayed();
            windows -= 1;
        }

        if target > self.corrosion_state {
            self.corrosion_state = target;
            true
        } else {
            false
        }
    }
}
