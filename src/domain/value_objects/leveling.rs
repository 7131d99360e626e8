//! Exponential leveling curve

use serde::{Deserialize, Serialize};

/// Parameters of the exponential XP curve: `next = base * growth^level`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LevelCurve {
    pub base: f64,
    /// Must be > 1 so each level costs more than the last
    pub growth: f64,
}

impl LevelCurve {
    pub fn new(base: f64, growth: f64) -> Self {
        Self { base, growth }
    }

    /// XP required to go from `level` to `level + 1`
    pub fn xp_to_next(&self, level: u32) -> f64 {
        self.base * self.growth.powi(level as i32)
    }

    /// Default curve for themes (100 * 1.15^level)
    pub fn theme_default() -> Self {
        Self::new(100.0, 1.15)
    }

    /// Default curve for skills (50 * 1.2^level)
    pub fn skill_default() -> Self {
        Self::new(50.0, 1.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_is_monotonically_increasing() {
        let curve = LevelCurve::theme_default();
        for level in 0..50 {
            assert!(curve.xp_to_next(level + 1) > curve.xp_to_next(level));
        }
    }

    #[test]
    fn test_theme_default_values() {
        let curve = LevelCurve::theme_default();
        assert!((curve.xp_to_next(0) - 100.0).abs() < 1e-9);
        assert!((curve.xp_to_next(1) - 115.0).abs() < 1e-9);
        assert!((curve.xp_to_next(2) - 132.25).abs() < 1e-9);
    }
}
