//! Time-of-day windows used by entry-time unlock conditions

use chrono::Timelike;
use serde::{Deserialize, Serialize};

/// Named time-of-day window an entry timestamp can fall into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDayWindow {
    /// 03:00 - 05:59
    PreDawn,
    /// 06:00 - 11:59
    Morning,
    /// 12:00 - 17:59
    Afternoon,
    /// 18:00 - 22:59
    Evening,
    /// 23:00 - 02:59
    Night,
}

impl TimeOfDayWindow {
    /// Whether a timestamp's local hour falls inside this window
    pub fn contains<T: Timelike>(&self, time: &T) -> bool {
        let hour = time.hour();
        match self {
            Self::PreDawn => (3..6).contains(&hour),
            Self::Morning => (6..12).contains(&hour),
            Self::Afternoon => (12..18).contains(&hour),
            Self::Evening => (18..23).contains(&hour),
            Self::Night => hour >= 23 || hour < 3,
        }
    }
}
