//! Engine configuration
//!
//! Every tunable carries a built-in default; the environment overrides
//! individual values under the `STATUSWINDOW_` prefix.

use std::env;

use anyhow::{Context, Result};

use crate::domain::value_objects::{LevelCurve, RankTable};

/// Tunables governing XP distribution, leveling, decay, and quest matching
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base XP one categorized entry distributes across its themes
    pub base_entry_xp: f64,
    /// Skill XP granted per practice minute, before multipliers
    pub xp_per_practice_minute: f64,
    /// Level curve for themes
    pub theme_curve: LevelCurve,
    /// Level curve for skills
    pub skill_curve: LevelCurve,
    /// Skill level thresholds for each rank
    pub rank_thresholds: RankTable,
    /// Days without activity before a theme corrodes one stage
    pub theme_staleness_days: i64,
    /// Days without activity before a skill corrodes one stage
    pub skill_staleness_days: i64,
    /// Minimum token-overlap ratio for a quest match
    pub match_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_entry_xp: 50.0,
            xp_per_practice_minute: 1.0,
            theme_curve: LevelCurve::theme_default(),
            skill_curve: LevelCurve::skill_default(),
            rank_thresholds: RankTable::default(),
            theme_staleness_days: 14,
            skill_staleness_days: 14,
            match_threshold: 0.5,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to the
    /// built-in defaults for anything unset
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            base_entry_xp: env_or("STATUSWINDOW_BASE_ENTRY_XP", defaults.base_entry_xp)?,
            xp_per_practice_minute: env_or(
                "STATUSWINDOW_XP_PER_PRACTICE_MINUTE",
                defaults.xp_per_practice_minute,
            )?,
            theme_curve: LevelCurve::new(
                env_or("STATUSWINDOW_THEME_CURVE_BASE", defaults.theme_curve.base)?,
                env_or("STATUSWINDOW_THEME_CURVE_GROWTH", defaults.theme_curve.growth)?,
            ),
            skill_curve: LevelCurve::new(
                env_or("STATUSWINDOW_SKILL_CURVE_BASE", defaults.skill_curve.base)?,
                env_or("STATUSWINDOW_SKILL_CURVE_GROWTH", defaults.skill_curve.growth)?,
            ),
            rank_thresholds: RankTable {
                amateur: env_or("STATUSWINDOW_RANK_AMATEUR", defaults.rank_thresholds.amateur)?,
                intermediate: env_or(
                    "STATUSWINDOW_RANK_INTERMEDIATE",
                    defaults.rank_thresholds.intermediate,
                )?,
                advanced: env_or("STATUSWINDOW_RANK_ADVANCED", defaults.rank_thresholds.advanced)?,
                expert: env_or("STATUSWINDOW_RANK_EXPERT", defaults.rank_thresholds.expert)?,
                master: env_or("STATUSWINDOW_RANK_MASTER", defaults.rank_thresholds.master)?,
            },
            theme_staleness_days: env_or(
                "STATUSWINDOW_THEME_STALENESS_DAYS",
                defaults.theme_staleness_days,
            )?,
            skill_staleness_days: env_or(
                "STATUSWINDOW_SKILL_STALENESS_DAYS",
                defaults.skill_staleness_days,
            )?,
            match_threshold: env_or("STATUSWINDOW_MATCH_THRESHOLD", defaults.match_threshold)?,
        })
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} must be a valid number")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.base_entry_xp, 50.0);
        assert_eq!(config.theme_staleness_days, 14);
        assert_eq!(config.match_threshold, 0.5);
        assert_eq!(config.theme_curve.xp_to_next(0), 100.0);
        assert_eq!(config.skill_curve.xp_to_next(0), 50.0);
    }

    // Tests below mutate process-wide env vars and must not interleave
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn test_env_overrides_curve_and_rank_thresholds() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("STATUSWINDOW_THEME_CURVE_BASE", "200");
        env::set_var("STATUSWINDOW_RANK_AMATEUR", "3");
        let config = EngineConfig::from_env().unwrap();
        env::remove_var("STATUSWINDOW_THEME_CURVE_BASE");
        env::remove_var("STATUSWINDOW_RANK_AMATEUR");

        assert_eq!(config.theme_curve.base, 200.0);
        // Unset values keep their defaults
        assert_eq!(config.theme_curve.growth, 1.15);
        assert_eq!(config.rank_thresholds.amateur, 3);
        assert_eq!(config.rank_thresholds.master, 80);
    }

    #[test]
    fn test_unparseable_env_value_is_an_error() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("STATUSWINDOW_SKILL_CURVE_GROWTH", "fast");
        let result = EngineConfig::from_env();
        env::remove_var("STATUSWINDOW_SKILL_CURVE_GROWTH");
        assert!(result.is_err());
    }
}
