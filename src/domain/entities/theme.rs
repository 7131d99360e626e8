//! Theme entity - Broad life-domain progression node
//!
//! Themes represent major life categories (e.g., Physical Health,
//! Education) and carry the core XP/leveling loop: XP accumulates until the
//! threshold is crossed, overflow carries forward exactly, and the next
//! threshold grows exponentially.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::XpSource;
use crate::domain::value_objects::{CorrosionState, LevelCurve, ThemeId};

/// A theme progression node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub id: ThemeId,
    pub name: String,
    pub description: Option<String>,
    pub level: u32,
    /// XP toward the next level; always `< xp_to_next_level` after settling
    pub xp: f64,
    pub xp_to_next_level: f64,
    pub corrosion_state: CorrosionState,
    /// Parent theme for sub-theme hierarchies; cycle-checked by the aggregate
    pub parent_theme_id: Option<ThemeId>,
    /// None until the node sees its first activity
    pub last_activity_at: Option<DateTime<Utc>>,
    /// Lifetime XP per source, for analytics and display
    pub xp_breakdown: HashMap<XpSource, f64>,
}

impl Theme {
    pub fn new(name: impl Into<String>, curve: &LevelCurve) -> Self {
        Self {
            id: ThemeId::new(),
            name: name.into(),
            description: None,
            level: 0,
            xp: 0.0,
            xp_to_next_level: curve.xp_to_next(0),
            corrosion_state: CorrosionState::New,
            parent_theme_id: None,
            last_activity_at: None,
            xp_breakdown: HashMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_parent(mut self, parent: ThemeId) -> Self {
        self.parent_theme_id = Some(parent);
        self
    }

    /// Add XP and settle any level-ups, carrying overflow forward exactly.
    ///
    /// Returns the number of levels gained. The amount must already be
    /// validated non-negative by the caller (the ledger rejects negative
    /// amounts with `InvalidAmount`).
    pub fn add_xp(&mut self, amount: f64, curve: &LevelCurve) -> u32 {
        debug_assert!(amount >= 0.0, "negative XP must be rejected upstream");

        self.xp += amount;
        let mut gained = 0;

        while self.xp >= self.xp_to_next_level {
            self.xp -= self.xp_to_next_level;
            self.level += 1;
            self.xp_to_next_level = curve.xp_to_next(self.level);
            gained += 1;
        }

        gained
    }

    /// Record activity: stamp the clock and restore corrosion to `Fresh`
    ///
    /// `Fresh`, not `New` - `New` means unlocked-but-never-touched.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity_at = Some(now);
        self.corrosion_state = CorrosionState::Fresh;
    }

    pub fn record_xp_source(&mut self, source: XpSource, amount: f64) {
        *self.xp_breakdown.entry(source).or_insert(0.0) += amount;
    }

    /// Advance corrosion by one stage per fully elapsed staleness window.
    ///
    /// Idempotent for a given `now`: repeated ticks converge on the stage
    /// implied by the elapsed time instead of compounding. Returns true if
    /// the state changed.
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

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> LevelCurve {
        LevelCurve::theme_default()
    }

    #[test]
    fn test_add_xp_carries_overflow_exactly() {
        // 250 XP at level 0: consumes 100 then 115, carries 35 into level 2
        let mut theme = Theme::new("Education", &curve());
        let gained = theme.add_xp(250.0, &curve());

        assert_eq!(gained, 2);
        assert_eq!(theme.level, 2);
        assert!((theme.xp - 35.0).abs() < 1e-9);
        assert!((theme.xp_to_next_level - 132.25).abs() < 1e-6);
    }

    #[test]
    fn test_add_xp_invariant_holds() {
        let mut theme = Theme::new("Health", &curve());
        for amount in [0.0, 99.9, 0.2, 500.0, 12.5] {
            theme.add_xp(amount, &curve());
            assert!(theme.xp >= 0.0);
            assert!(theme.xp < theme.xp_to_next_level);
        }
    }

    #[test]
    fn test_touch_restores_fresh_not_new() {
        let mut theme = Theme::new("Health", &curve());
        assert_eq!(theme.corrosion_state, CorrosionState::New);

        theme.touch(Utc::now());
        assert_eq!(theme.corrosion_state, CorrosionState::Fresh);
    }

    #[test]
    fn test_corrosion_tick_advances_per_window() {
        let now = Utc::now();
        let mut theme = Theme::new("Health", &curve());
        theme.touch(now - Duration::days(30));

        let changed = theme.tick_corrosion(now, Duration::days(14));
        assert!(changed);
        // 30 days over a 14-day window: two full windows elapsed
        assert_eq!(theme.corrosion_state, CorrosionState::Patterned);

        // A second tick at the same instant is a no-op
        assert!(!theme.tick_corrosion(now, Duration::days(14)));
    }

    #[test]
    fn test_untouched_node_never_corrodes() {
        let mut theme = Theme::new("Health", &curve());
        assert!(!theme.tick_corrosion(Utc::now(), Duration::days(14)));
        assert_eq!(theme.corrosion_state, CorrosionState::New);
    }
}
