//! Value objects for the progression domain

pub mod corrosion;
pub mod ids;
pub mod leveling;
pub mod rank;
pub mod reward;
pub mod sentiment;
pub mod time_window;

pub use corrosion::CorrosionState;
pub use ids::{
    EntryId, QuestTemplateId, SkillId, ThemeId, TitleTemplateId, UserId, UserQuestId, UserTitleId,
};
pub use leveling::LevelCurve;
pub use rank::{Rank, RankTable};
pub use reward::Reward;
pub use sentiment::Sentiment;
pub use time_window::TimeOfDayWindow;
