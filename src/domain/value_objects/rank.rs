//! Skill rank tiers and the level thresholds that produce them

use serde::{Deserialize, Serialize};

/// Skill rank, derived from level and never stored independently of it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Beginner,
    Amateur,
    Intermediate,
    Advanced,
    Expert,
    Master,
}

impl Default for Rank {
    fn default() -> Self {
        Self::Beginner
    }
}

impl Rank {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Amateur => "Amateur",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
            Self::Expert => "Expert",
            Self::Master => "Master",
        }
    }
}

/// Ordered level thresholds for rank computation
///
/// Each field is the inclusive lower bound for that rank; anything below
/// `amateur` is `Beginner`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankTable {
    pub amateur: u32,
    pub intermediate: u32,
    pub advanced: u32,
    pub expert: u32,
    pub master: u32,
}

impl Default for RankTable {
    fn default() -> Self {
        Self {
            amateur: 5,
            intermediate: 15,
            advanced: 30,
            expert: 50,
            master: 80,
        }
    }
}

impl RankTable {
    /// Compute the rank for a level. Pure and total.
    pub fn rank_for(&self, level: u32) -> Rank {
        if level >= self.master {
            Rank::Master
        } else if level >= self.expert {
            Rank::Expert
        } else if level >= self.advanced {
            Rank::Advanced
        } else if level >= self.intermediate {
            Rank::Intermediate
        } else if level >= self.amateur {
            Rank::Amateur
        } else {
            Rank::Beginner
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_boundaries_are_inclusive_lower_bounds() {
        let table = RankTable::default();
        assert_eq!(table.rank_for(0), Rank::Beginner);
        assert_eq!(table.rank_for(4), Rank::Beginner);
        assert_eq!(table.rank_for(5), Rank::Amateur);
        assert_eq!(table.rank_for(14), Rank::Amateur);
        assert_eq!(table.rank_for(15), Rank::Intermediate);
        assert_eq!(table.rank_for(30), Rank::Advanced);
        assert_eq!(table.rank_for(50), Rank::Expert);
        assert_eq!(table.rank_for(80), Rank::Master);
        assert_eq!(table.rank_for(200), Rank::Master);
    }

    #[test]
    fn test_rank_computation_is_idempotent() {
        let table = RankTable::default();
        for level in 0..120 {
            assert_eq!(table.rank_for(level), table.rank_for(level));
        }
    }

    #[test]
    fn test_rank_ordering() {
        assert!(Rank::Beginner < Rank::Amateur);
        assert!(Rank::Amateur < Rank::Intermediate);
        assert!(Rank::Expert < Rank::Master);
    }
}
