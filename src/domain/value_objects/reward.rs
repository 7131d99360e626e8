//! Quest rewards

use serde::{Deserialize, Serialize};

/// XP and coins granted when a quest completes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub xp: f64,
    pub coins: i64,
}

impl Reward {
    pub fn new(xp: f64, coins: i64) -> Self {
        Self { xp, coins }
    }

    pub fn is_empty(&self) -> bool {
        self.xp == 0.0 && self.coins == 0
    }

    pub fn add(&mut self, other: Reward) {
        self.xp += other.xp;
        self.coins += other.coins;
    }
}
